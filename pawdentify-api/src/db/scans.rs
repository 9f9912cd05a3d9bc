//! Scan history operations
//!
//! The scan insert and the profile `total_scans` increment run in a single
//! transaction so the counter and the history list cannot diverge.

use chrono::{DateTime, Utc};
use pawdentify_common::models::{DeviceType, ScanFeedback, ScanRecord};
use pawdentify_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, parse_json_list, parse_ts, to_json_list};

/// Aggregate over a user's whole scan history
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatistics {
    pub total_scans: i64,
    pub avg_confidence: f64,
    pub crossbreed_count: i64,
}

/// One row of the breed frequency aggregation
#[derive(Debug, Clone, Serialize)]
pub struct BreedFrequency {
    pub breed: String,
    pub count: i64,
    pub avg_confidence: f64,
}

/// Insert a scan and increment the owner's `total_scans`, atomically.
///
/// The increment touches zero rows when no profile exists for the user id;
/// the scan itself is still recorded.
pub async fn create_scan(pool: &SqlitePool, scan: &ScanRecord) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO scan_history (guid, user_id, predicted_breed, confidence_score,
                                  is_crossbreed, secondary_breed, top_predictions,
                                  image_hash, device_type, timestamp,
                                  user_feedback, user_confirmed_breed)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(scan.guid.to_string())
    .bind(&scan.user_id)
    .bind(&scan.predicted_breed)
    .bind(scan.confidence_score)
    .bind(scan.is_crossbreed)
    .bind(&scan.secondary_breed)
    .bind(to_json_list(&scan.top_predictions)?)
    .bind(&scan.image_hash)
    .bind(scan.device_type.as_str())
    .bind(scan.timestamp.to_rfc3339())
    .bind(scan.user_feedback.map(|f| f.as_str()))
    .bind(&scan.user_confirmed_breed)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET total_scans = total_scans + 1 WHERE clerk_user_id = ?")
        .bind(&scan.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Look up a single scan by id, scoped to its owner
pub async fn get_scan_by_id(
    pool: &SqlitePool,
    user_id: &str,
    scan_id: Uuid,
) -> Result<Option<ScanRecord>> {
    let row = sqlx::query("SELECT * FROM scan_history WHERE guid = ? AND user_id = ?")
        .bind(scan_id.to_string())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(scan_from_row).transpose()
}

/// Newest-first page of a user's scan history
pub async fn list_scans(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    skip: i64,
) -> Result<Vec<ScanRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM scan_history WHERE user_id = ?
         ORDER BY timestamp DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    rows.iter().map(scan_from_row).collect()
}

/// Newest-first list with an optional closed date range, bounded by `limit`
pub async fn list_scans_in_range(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<ScanRecord>> {
    // RFC3339 UTC text compares lexicographically in timestamp order
    let rows = sqlx::query(
        r#"
        SELECT * FROM scan_history
        WHERE user_id = ?
          AND (? IS NULL OR timestamp >= ?)
          AND (? IS NULL OR timestamp <= ?)
        ORDER BY timestamp DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(start.map(|t| t.to_rfc3339()))
    .bind(start.map(|t| t.to_rfc3339()))
    .bind(end.map(|t| t.to_rfc3339()))
    .bind(end.map(|t| t.to_rfc3339()))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(scan_from_row).collect()
}

/// Count scans in a closed date range
pub async fn count_scans_between(
    pool: &SqlitePool,
    user_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM scan_history
         WHERE user_id = ? AND timestamp >= ? AND timestamp <= ?",
    )
    .bind(user_id)
    .bind(start.to_rfc3339())
    .bind(end.to_rfc3339())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Whole-history aggregate: total, average confidence, crossbreed count
pub async fn get_scan_statistics(pool: &SqlitePool, user_id: &str) -> Result<ScanStatistics> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total_scans,
               COALESCE(AVG(confidence_score), 0.0) AS avg_confidence,
               COALESCE(SUM(is_crossbreed), 0) AS crossbreed_count
        FROM scan_history
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(ScanStatistics {
        total_scans: row.get("total_scans"),
        avg_confidence: row.get("avg_confidence"),
        crossbreed_count: row.get("crossbreed_count"),
    })
}

/// Most frequently scanned breeds, descending, with per-breed average confidence
pub async fn breed_frequency(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<BreedFrequency>> {
    let rows = sqlx::query(
        r#"
        SELECT predicted_breed, COUNT(*) AS count, AVG(confidence_score) AS avg_confidence
        FROM scan_history
        WHERE user_id = ?
        GROUP BY predicted_breed
        ORDER BY count DESC, predicted_breed ASC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| BreedFrequency {
            breed: row.get("predicted_breed"),
            count: row.get("count"),
            avg_confidence: row.get("avg_confidence"),
        })
        .collect())
}

/// All of a user's scans for one breed, newest first
pub async fn scans_by_breed(
    pool: &SqlitePool,
    user_id: &str,
    breed: &str,
) -> Result<Vec<ScanRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM scan_history WHERE user_id = ? AND predicted_breed = ?
         ORDER BY timestamp DESC",
    )
    .bind(user_id)
    .bind(breed)
    .fetch_all(pool)
    .await?;

    rows.iter().map(scan_from_row).collect()
}

/// Record user feedback on a scan. Last write wins; re-submitting the same
/// feedback is a no-op on the stored state. Returns false for unknown ids
/// or scans not owned by the caller.
pub async fn update_scan_feedback(
    pool: &SqlitePool,
    user_id: &str,
    scan_id: Uuid,
    feedback: ScanFeedback,
    confirmed_breed: Option<&str>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE scan_history
        SET user_feedback = ?,
            user_confirmed_breed = COALESCE(?, user_confirmed_breed)
        WHERE guid = ? AND user_id = ?
        "#,
    )
    .bind(feedback.as_str())
    .bind(confirmed_breed)
    .bind(scan_id.to_string())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) fn scan_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScanRecord> {
    let guid: String = row.get("guid");
    let predictions: String = row.get("top_predictions");
    let device: String = row.get("device_type");
    let timestamp: String = row.get("timestamp");
    let feedback: Option<String> = row.get("user_feedback");

    Ok(ScanRecord {
        guid: parse_guid(&guid)?,
        user_id: row.get("user_id"),
        predicted_breed: row.get("predicted_breed"),
        confidence_score: row.get("confidence_score"),
        is_crossbreed: row.get("is_crossbreed"),
        secondary_breed: row.get("secondary_breed"),
        top_predictions: parse_json_list(&predictions)?,
        image_hash: row.get("image_hash"),
        device_type: DeviceType::parse(&device),
        timestamp: parse_ts(&timestamp)?,
        user_feedback: feedback.as_deref().and_then(ScanFeedback::parse),
        user_confirmed_breed: row.get("user_confirmed_breed"),
    })
}
