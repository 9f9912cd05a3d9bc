//! Feedback submission operations

use pawdentify_common::models::{DeviceType, FeedbackRecord, FeedbackStatus, FeedbackType};
use pawdentify_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use super::{parse_guid, parse_ts};

/// Counts per processing status plus the average app-review rating
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackStatistics {
    pub total: i64,
    pub pending: i64,
    pub reviewed: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub closed: i64,
    pub average_rating: Option<f64>,
}

pub async fn create_feedback(pool: &SqlitePool, record: &FeedbackRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO feedback (guid, user_id, feedback_type, subject, message,
                              app_version, device_type, page_url, scan_id,
                              predicted_breed, corrected_breed, confidence_score,
                              priority, status, rating, follow_up_requested,
                              submitted_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.guid.to_string())
    .bind(&record.user_id)
    .bind(record.feedback_type.as_str())
    .bind(&record.subject)
    .bind(&record.message)
    .bind(&record.app_version)
    .bind(record.device_type.as_str())
    .bind(&record.page_url)
    .bind(&record.scan_id)
    .bind(&record.predicted_breed)
    .bind(&record.corrected_breed)
    .bind(record.confidence_score)
    .bind(&record.priority)
    .bind(record.status.as_str())
    .bind(record.rating)
    .bind(record.follow_up_requested)
    .bind(record.submitted_at.to_rfc3339())
    .bind(record.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Newest-first page of a user's submissions
pub async fn list_feedback(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
    skip: i64,
) -> Result<Vec<FeedbackRecord>> {
    let rows = sqlx::query(
        "SELECT * FROM feedback WHERE user_id = ?
         ORDER BY submitted_at DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    rows.iter().map(feedback_from_row).collect()
}

pub async fn feedback_statistics(pool: &SqlitePool, user_id: &str) -> Result<FeedbackStatistics> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(status = 'pending'), 0) AS pending,
               COALESCE(SUM(status = 'reviewed'), 0) AS reviewed,
               COALESCE(SUM(status = 'in_progress'), 0) AS in_progress,
               COALESCE(SUM(status = 'resolved'), 0) AS resolved,
               COALESCE(SUM(status = 'closed'), 0) AS closed,
               AVG(rating) AS average_rating
        FROM feedback
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(FeedbackStatistics {
        total: row.get("total"),
        pending: row.get("pending"),
        reviewed: row.get("reviewed"),
        in_progress: row.get("in_progress"),
        resolved: row.get("resolved"),
        closed: row.get("closed"),
        average_rating: row.get("average_rating"),
    })
}

fn feedback_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<FeedbackRecord> {
    let guid: String = row.get("guid");
    let feedback_type: String = row.get("feedback_type");
    let device: String = row.get("device_type");
    let status: String = row.get("status");
    let submitted_at: String = row.get("submitted_at");
    let updated_at: String = row.get("updated_at");

    Ok(FeedbackRecord {
        guid: parse_guid(&guid)?,
        user_id: row.get("user_id"),
        feedback_type: FeedbackType::parse(&feedback_type).unwrap_or_default(),
        subject: row.get("subject"),
        message: row.get("message"),
        app_version: row.get("app_version"),
        device_type: DeviceType::parse(&device),
        page_url: row.get("page_url"),
        scan_id: row.get("scan_id"),
        predicted_breed: row.get("predicted_breed"),
        corrected_breed: row.get("corrected_breed"),
        confidence_score: row.get("confidence_score"),
        priority: row.get("priority"),
        status: FeedbackStatus::parse(&status).unwrap_or_default(),
        rating: row.get("rating"),
        follow_up_requested: row.get("follow_up_requested"),
        submitted_at: parse_ts(&submitted_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}
