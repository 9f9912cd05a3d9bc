//! Search history operations

use pawdentify_common::models::{DeviceType, SearchRecord};
use pawdentify_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, parse_json_list, parse_ts, to_json_list};

/// Engagement fields mutable after the initial search record is written.
/// Unknown keys are rejected at deserialization time.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchInteractionUpdate {
    pub time_spent_viewing: Option<i64>,
    pub sections_viewed: Option<Vec<String>>,
    pub is_bookmarked: Option<bool>,
    pub user_rating: Option<i64>,
}

/// One breed the user recently looked up, most recent lookup first
#[derive(Debug, Clone, Serialize)]
pub struct RecentBreed {
    pub breed: String,
    pub last_searched: String,
}

/// One globally popular breed with its search volume
#[derive(Debug, Clone, Serialize)]
pub struct PopularBreed {
    pub breed: String,
    pub search_count: i64,
    pub unique_users: i64,
}

pub async fn create_search(pool: &SqlitePool, search: &SearchRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO search_history (guid, user_id, breed_searched, search_query,
                                    search_timestamp, device_type, time_spent_viewing,
                                    sections_viewed, is_bookmarked, user_rating)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(search.guid.to_string())
    .bind(&search.user_id)
    .bind(&search.breed_searched)
    .bind(&search.search_query)
    .bind(search.search_timestamp.to_rfc3339())
    .bind(search.device_type.as_str())
    .bind(search.time_spent_viewing)
    .bind(to_json_list(&search.sections_viewed)?)
    .bind(search.is_bookmarked)
    .bind(search.user_rating)
    .execute(pool)
    .await?;

    Ok(())
}

/// Newest-first page of a user's search history
pub async fn list_searches(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    skip: i64,
) -> Result<Vec<SearchRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM search_history WHERE user_id = ?
         ORDER BY search_timestamp DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    rows.iter().map(search_from_row).collect()
}

/// Distinct breeds the user searched, ordered by most recent lookup
pub async fn recent_breeds(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<RecentBreed>> {
    let rows = sqlx::query(
        r#"
        SELECT breed_searched, MAX(search_timestamp) AS last_searched
        FROM search_history
        WHERE user_id = ?
        GROUP BY breed_searched
        ORDER BY last_searched DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| RecentBreed {
            breed: row.get("breed_searched"),
            last_searched: row.get("last_searched"),
        })
        .collect())
}

/// Most searched breeds across all users, descending by volume
pub async fn popular_breeds(pool: &SqlitePool, limit: i64) -> Result<Vec<PopularBreed>> {
    let rows = sqlx::query(
        r#"
        SELECT breed_searched,
               COUNT(*) AS search_count,
               COUNT(DISTINCT user_id) AS unique_users
        FROM search_history
        GROUP BY breed_searched
        ORDER BY search_count DESC, breed_searched ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PopularBreed {
            breed: row.get("breed_searched"),
            search_count: row.get("search_count"),
            unique_users: row.get("unique_users"),
        })
        .collect())
}

/// Apply engagement data to an existing search record.
/// Returns false for unknown ids or records not owned by the caller.
pub async fn update_interaction(
    pool: &SqlitePool,
    user_id: &str,
    search_id: Uuid,
    update: &SearchInteractionUpdate,
) -> Result<bool> {
    let sections = match &update.sections_viewed {
        Some(sections) => Some(to_json_list(sections)?),
        None => None,
    };

    let result = sqlx::query(
        r#"
        UPDATE search_history SET
            time_spent_viewing = COALESCE(?, time_spent_viewing),
            sections_viewed = COALESCE(?, sections_viewed),
            is_bookmarked = COALESCE(?, is_bookmarked),
            user_rating = COALESCE(?, user_rating)
        WHERE guid = ? AND user_id = ?
        "#,
    )
    .bind(update.time_spent_viewing)
    .bind(sections)
    .bind(update.is_bookmarked)
    .bind(update.user_rating)
    .bind(search_id.to_string())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn search_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<SearchRecord> {
    let guid: String = row.get("guid");
    let timestamp: String = row.get("search_timestamp");
    let device: String = row.get("device_type");
    let sections: String = row.get("sections_viewed");

    Ok(SearchRecord {
        guid: parse_guid(&guid)?,
        user_id: row.get("user_id"),
        breed_searched: row.get("breed_searched"),
        search_query: row.get("search_query"),
        search_timestamp: parse_ts(&timestamp)?,
        device_type: DeviceType::parse(&device),
        time_spent_viewing: row.get("time_spent_viewing"),
        sections_viewed: parse_json_list(&sections)?,
        is_bookmarked: row.get("is_bookmarked"),
        user_rating: row.get("user_rating"),
    })
}
