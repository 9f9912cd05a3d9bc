//! User profile operations

use chrono::Utc;
use pawdentify_common::models::UserProfile;
use pawdentify_common::Result;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};

use super::{parse_guid, parse_json_list, parse_ts, to_json_list};

/// Updatable profile fields. Unknown keys in the request body are rejected
/// at deserialization time rather than written through to the store.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub subscription_status: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.profile_image_url.is_none()
            && self.subscription_status.is_none()
    }
}

/// Insert a new user profile
pub async fn create_user(pool: &SqlitePool, user: &UserProfile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (guid, clerk_user_id, email, username, first_name, last_name,
                           profile_image_url, total_scans, favorite_breeds,
                           subscription_status, created_at, last_login)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.guid.to_string())
    .bind(&user.clerk_user_id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.profile_image_url)
    .bind(user.total_scans)
    .bind(to_json_list(&user.favorite_breeds)?)
    .bind(&user.subscription_status)
    .bind(user.created_at.to_rfc3339())
    .bind(user.last_login.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Point lookup by the opaque identity supplied in the header
pub async fn get_user_by_clerk_id(
    pool: &SqlitePool,
    clerk_user_id: &str,
) -> Result<Option<UserProfile>> {
    let row = sqlx::query("SELECT * FROM users WHERE clerk_user_id = ?")
        .bind(clerk_user_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(user_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Apply a typed partial update; refreshes `last_login`.
/// Returns false when no such user exists.
pub async fn update_user(
    pool: &SqlitePool,
    clerk_user_id: &str,
    update: &UserUpdate,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            email = COALESCE(?, email),
            username = COALESCE(?, username),
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            profile_image_url = COALESCE(?, profile_image_url),
            subscription_status = COALESCE(?, subscription_status),
            last_login = ?
        WHERE clerk_user_id = ?
        "#,
    )
    .bind(&update.email)
    .bind(&update.username)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.profile_image_url)
    .bind(&update.subscription_status)
    .bind(Utc::now().to_rfc3339())
    .bind(clerk_user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Add a breed to the favorites set. Returns false when it was already there
/// or the user does not exist.
pub async fn add_favorite_breed(
    pool: &SqlitePool,
    clerk_user_id: &str,
    breed: &str,
) -> Result<bool> {
    let Some(user) = get_user_by_clerk_id(pool, clerk_user_id).await? else {
        return Ok(false);
    };
    if user.favorite_breeds.iter().any(|b| b == breed) {
        return Ok(false);
    }

    let mut favorites = user.favorite_breeds;
    favorites.push(breed.to_string());
    write_favorites(pool, clerk_user_id, &favorites).await
}

/// Remove a breed from the favorites set. Returns false when it was absent.
pub async fn remove_favorite_breed(
    pool: &SqlitePool,
    clerk_user_id: &str,
    breed: &str,
) -> Result<bool> {
    let Some(user) = get_user_by_clerk_id(pool, clerk_user_id).await? else {
        return Ok(false);
    };
    let mut favorites = user.favorite_breeds;
    let before = favorites.len();
    favorites.retain(|b| b != breed);
    if favorites.len() == before {
        return Ok(false);
    }

    write_favorites(pool, clerk_user_id, &favorites).await
}

async fn write_favorites(
    pool: &SqlitePool,
    clerk_user_id: &str,
    favorites: &[String],
) -> Result<bool> {
    let result = sqlx::query("UPDATE users SET favorite_breeds = ? WHERE clerk_user_id = ?")
        .bind(to_json_list(favorites)?)
        .bind(clerk_user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile> {
    let guid: String = row.get("guid");
    let favorites: String = row.get("favorite_breeds");
    let created_at: String = row.get("created_at");
    let last_login: String = row.get("last_login");

    Ok(UserProfile {
        guid: parse_guid(&guid)?,
        clerk_user_id: row.get("clerk_user_id"),
        email: row.get("email"),
        username: row.get("username"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        profile_image_url: row.get("profile_image_url"),
        total_scans: row.get("total_scans"),
        favorite_breeds: parse_json_list(&favorites)?,
        subscription_status: row.get("subscription_status"),
        created_at: parse_ts(&created_at)?,
        last_login: parse_ts(&last_login)?,
    })
}
