//! User preference storage
//!
//! One row per user, created lazily with defaults on first read. The
//! `user_id` primary key makes duplicate rows impossible.

use chrono::Utc;
use pawdentify_common::models::UserPreferences;
use pawdentify_common::Result;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};

use super::{parse_json_list, parse_ts, to_json_list};

/// Updatable preference fields. Unknown keys are rejected at
/// deserialization time.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesUpdate {
    pub email_notifications: Option<bool>,
    pub scan_reminders: Option<bool>,
    pub breed_updates: Option<bool>,
    pub newsletter: Option<bool>,
    pub save_scan_history: Option<bool>,
    pub save_search_history: Option<bool>,
    pub allow_analytics: Option<bool>,
    pub public_profile: Option<bool>,
    pub preferred_language: Option<String>,
    pub measurement_units: Option<String>,
    pub theme: Option<String>,
    pub favorite_breeds: Option<Vec<String>>,
}

/// Fetch the user's preferences, inserting the default row first if none
/// exists yet.
pub async fn get_or_create_preferences(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<UserPreferences> {
    if let Some(prefs) = get_preferences(pool, user_id).await? {
        return Ok(prefs);
    }

    let defaults = UserPreferences::defaults_for(user_id);
    // INSERT OR IGNORE tolerates a concurrent first read racing us
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_preferences
            (user_id, email_notifications, scan_reminders, breed_updates, newsletter,
             save_scan_history, save_search_history, allow_analytics, public_profile,
             preferred_language, measurement_units, theme, favorite_breeds,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&defaults.user_id)
    .bind(defaults.email_notifications)
    .bind(defaults.scan_reminders)
    .bind(defaults.breed_updates)
    .bind(defaults.newsletter)
    .bind(defaults.save_scan_history)
    .bind(defaults.save_search_history)
    .bind(defaults.allow_analytics)
    .bind(defaults.public_profile)
    .bind(&defaults.preferred_language)
    .bind(&defaults.measurement_units)
    .bind(&defaults.theme)
    .bind(to_json_list(&defaults.favorite_breeds)?)
    .bind(defaults.created_at.to_rfc3339())
    .bind(defaults.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(defaults)
}

async fn get_preferences(pool: &SqlitePool, user_id: &str) -> Result<Option<UserPreferences>> {
    let row = sqlx::query("SELECT * FROM user_preferences WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(preferences_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Apply a typed partial update and return the resulting row. Creates the
/// default row first when the user has none.
pub async fn update_preferences(
    pool: &SqlitePool,
    user_id: &str,
    update: &PreferencesUpdate,
) -> Result<UserPreferences> {
    get_or_create_preferences(pool, user_id).await?;

    let favorites = match &update.favorite_breeds {
        Some(list) => Some(to_json_list(list)?),
        None => None,
    };

    sqlx::query(
        r#"
        UPDATE user_preferences SET
            email_notifications = COALESCE(?, email_notifications),
            scan_reminders = COALESCE(?, scan_reminders),
            breed_updates = COALESCE(?, breed_updates),
            newsletter = COALESCE(?, newsletter),
            save_scan_history = COALESCE(?, save_scan_history),
            save_search_history = COALESCE(?, save_search_history),
            allow_analytics = COALESCE(?, allow_analytics),
            public_profile = COALESCE(?, public_profile),
            preferred_language = COALESCE(?, preferred_language),
            measurement_units = COALESCE(?, measurement_units),
            theme = COALESCE(?, theme),
            favorite_breeds = COALESCE(?, favorite_breeds),
            updated_at = ?
        WHERE user_id = ?
        "#,
    )
    .bind(update.email_notifications)
    .bind(update.scan_reminders)
    .bind(update.breed_updates)
    .bind(update.newsletter)
    .bind(update.save_scan_history)
    .bind(update.save_search_history)
    .bind(update.allow_analytics)
    .bind(update.public_profile)
    .bind(&update.preferred_language)
    .bind(&update.measurement_units)
    .bind(&update.theme)
    .bind(favorites)
    .bind(Utc::now().to_rfc3339())
    .bind(user_id)
    .execute(pool)
    .await?;

    get_preferences(pool, user_id)
        .await?
        .ok_or_else(|| pawdentify_common::Error::Internal("preferences row vanished".into()))
}

fn preferences_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<UserPreferences> {
    let favorites: String = row.get("favorite_breeds");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(UserPreferences {
        user_id: row.get("user_id"),
        email_notifications: row.get("email_notifications"),
        scan_reminders: row.get("scan_reminders"),
        breed_updates: row.get("breed_updates"),
        newsletter: row.get("newsletter"),
        save_scan_history: row.get("save_scan_history"),
        save_search_history: row.get("save_search_history"),
        allow_analytics: row.get("allow_analytics"),
        public_profile: row.get("public_profile"),
        preferred_language: row.get("preferred_language"),
        measurement_units: row.get("measurement_units"),
        theme: row.get("theme"),
        favorite_breeds: parse_json_list(&favorites)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}
