//! Database initialization
//!
//! Creates the database on first run with the full collection schema and the
//! secondary indexes needed for newest-first pagination per user. All
//! statements are idempotent, so startup is safe against an existing database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Bounded pool; WAL allows concurrent readers with one writer
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_scan_history_table(pool).await?;
    create_search_history_table(pool).await?;
    create_user_preferences_table(pool).await?;
    create_pets_table(pool).await?;
    create_vaccinations_table(pool).await?;
    create_feedback_table(pool).await?;
    create_community_feedback_table(pool).await?;
    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            clerk_user_id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL,
            username TEXT,
            first_name TEXT,
            last_name TEXT,
            profile_image_url TEXT,
            total_scans INTEGER NOT NULL DEFAULT 0,
            favorite_breeds TEXT NOT NULL DEFAULT '[]',
            subscription_status TEXT NOT NULL DEFAULT 'free',
            created_at TEXT NOT NULL,
            last_login TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_scan_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scan_history (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            predicted_breed TEXT NOT NULL,
            confidence_score REAL NOT NULL,
            is_crossbreed INTEGER NOT NULL DEFAULT 0,
            secondary_breed TEXT,
            top_predictions TEXT NOT NULL DEFAULT '[]',
            image_hash TEXT,
            device_type TEXT NOT NULL DEFAULT 'unknown',
            timestamp TEXT NOT NULL,
            user_feedback TEXT,
            user_confirmed_breed TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_scan_history_user_ts
         ON scan_history (user_id, timestamp)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_search_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_history (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            breed_searched TEXT NOT NULL,
            search_query TEXT NOT NULL,
            search_timestamp TEXT NOT NULL,
            device_type TEXT NOT NULL DEFAULT 'unknown',
            time_spent_viewing INTEGER,
            sections_viewed TEXT NOT NULL DEFAULT '[]',
            is_bookmarked INTEGER NOT NULL DEFAULT 0,
            user_rating INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_search_history_user_ts
         ON search_history (user_id, search_timestamp)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_user_preferences_table(pool: &SqlitePool) -> Result<()> {
    // user_id is the primary key: the one-preferences-per-user invariant
    // is enforced by the store itself
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_preferences (
            user_id TEXT PRIMARY KEY,
            email_notifications INTEGER NOT NULL DEFAULT 1,
            scan_reminders INTEGER NOT NULL DEFAULT 0,
            breed_updates INTEGER NOT NULL DEFAULT 1,
            newsletter INTEGER NOT NULL DEFAULT 0,
            save_scan_history INTEGER NOT NULL DEFAULT 1,
            save_search_history INTEGER NOT NULL DEFAULT 1,
            allow_analytics INTEGER NOT NULL DEFAULT 1,
            public_profile INTEGER NOT NULL DEFAULT 0,
            preferred_language TEXT NOT NULL DEFAULT 'en',
            measurement_units TEXT NOT NULL DEFAULT 'imperial',
            theme TEXT NOT NULL DEFAULT 'light',
            favorite_breeds TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_pets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pets (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            breed TEXT NOT NULL,
            secondary_breed TEXT,
            age_years INTEGER,
            age_months INTEGER,
            weight_lbs REAL,
            color TEXT,
            microchip_id TEXT,
            veterinarian_name TEXT,
            veterinarian_contact TEXT,
            allergies TEXT NOT NULL DEFAULT '[]',
            medical_conditions TEXT NOT NULL DEFAULT '[]',
            special_notes TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pets_user ON pets (user_id)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn create_vaccinations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vaccinations (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            pet_id TEXT NOT NULL,
            vaccine_name TEXT NOT NULL,
            vaccine_type TEXT NOT NULL,
            manufacturer TEXT,
            lot_number TEXT,
            administered_date TEXT,
            due_date TEXT NOT NULL,
            next_due_date TEXT,
            status TEXT NOT NULL DEFAULT 'upcoming',
            is_core_vaccine INTEGER NOT NULL DEFAULT 1,
            frequency_months INTEGER NOT NULL DEFAULT 12,
            veterinarian_name TEXT,
            clinic_name TEXT,
            clinic_contact TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_vaccinations_user_due
         ON vaccinations (user_id, due_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS feedback (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            feedback_type TEXT NOT NULL DEFAULT 'general',
            subject TEXT NOT NULL,
            message TEXT NOT NULL,
            app_version TEXT,
            device_type TEXT NOT NULL DEFAULT 'unknown',
            page_url TEXT,
            scan_id TEXT,
            predicted_breed TEXT,
            corrected_breed TEXT,
            confidence_score REAL,
            priority TEXT NOT NULL DEFAULT 'medium',
            status TEXT NOT NULL DEFAULT 'pending',
            rating INTEGER,
            follow_up_requested INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_feedback_user_submitted
         ON feedback (user_id, submitted_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_community_feedback_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS community_feedback (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            display_name TEXT NOT NULL,
            user_location TEXT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            rating INTEGER NOT NULL,
            usage_duration TEXT,
            favorite_features TEXT NOT NULL DEFAULT '[]',
            scan_count INTEGER,
            is_approved INTEGER NOT NULL DEFAULT 0,
            is_featured INTEGER NOT NULL DEFAULT 0,
            moderated_by TEXT,
            helpful_votes INTEGER NOT NULL DEFAULT 0,
            total_votes INTEGER NOT NULL DEFAULT 0,
            submitted_at TEXT NOT NULL,
            approved_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_community_feedback_user_submitted
         ON community_feedback (user_id, submitted_at)",
    )
    .execute(pool)
    .await?;

    // Testimonial listings filter on approval and sort by approval time
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_community_feedback_approved
         ON community_feedback (is_approved, approved_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");

        create_schema(&pool).await.expect("first create");
        create_schema(&pool).await.expect("second create");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        for expected in [
            "community_feedback",
            "feedback",
            "pets",
            "scan_history",
            "search_history",
            "user_preferences",
            "users",
            "vaccinations",
        ] {
            assert!(names.contains(&expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn init_creates_and_reopens_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("pawdentify.db");

        let pool = init_database(&db_path).await.expect("first init");
        assert!(db_path.exists());
        pool.close().await;

        init_database(&db_path).await.expect("reopen");
    }

    #[tokio::test]
    async fn preferences_user_id_is_unique() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_schema(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO user_preferences (user_id, created_at, updated_at) VALUES (?, ?, ?)",
        )
        .bind("user_1")
        .bind("2026-01-01T00:00:00Z")
        .bind("2026-01-01T00:00:00Z")
        .execute(&pool)
        .await
        .unwrap();

        let dup = sqlx::query(
            "INSERT INTO user_preferences (user_id, created_at, updated_at) VALUES (?, ?, ?)",
        )
        .bind("user_1")
        .bind("2026-01-02T00:00:00Z")
        .bind("2026-01-02T00:00:00Z")
        .execute(&pool)
        .await;

        assert!(dup.is_err(), "duplicate preferences row should be rejected");
    }
}
