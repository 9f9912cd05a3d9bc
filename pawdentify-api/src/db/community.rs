//! Community testimonial operations
//!
//! Submissions start unapproved and only surface in the public testimonial
//! listing once a moderator flips `is_approved`. Helpful votes are tallied
//! with a single conditional UPDATE so concurrent voters cannot lose counts.

use pawdentify_common::models::CommunityFeedback;
use pawdentify_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, parse_json_list, parse_ts, to_json_list};

pub async fn create_community_feedback(
    pool: &SqlitePool,
    feedback: &CommunityFeedback,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO community_feedback (guid, user_id, display_name, user_location,
                                        title, content, rating, usage_duration,
                                        favorite_features, scan_count, is_approved,
                                        is_featured, moderated_by, helpful_votes,
                                        total_votes, submitted_at, approved_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(feedback.guid.to_string())
    .bind(&feedback.user_id)
    .bind(&feedback.display_name)
    .bind(&feedback.user_location)
    .bind(&feedback.title)
    .bind(&feedback.content)
    .bind(feedback.rating)
    .bind(&feedback.usage_duration)
    .bind(to_json_list(&feedback.favorite_features)?)
    .bind(feedback.scan_count)
    .bind(feedback.is_approved)
    .bind(feedback.is_featured)
    .bind(&feedback.moderated_by)
    .bind(feedback.helpful_votes)
    .bind(feedback.total_votes)
    .bind(feedback.submitted_at.to_rfc3339())
    .bind(feedback.approved_at.map(|t| t.to_rfc3339()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Approved testimonials for the public listing, most recently approved first
pub async fn approved_testimonials(
    pool: &SqlitePool,
    limit: i64,
    featured_only: bool,
) -> Result<Vec<CommunityFeedback>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM community_feedback
        WHERE is_approved = 1
          AND (? = 0 OR is_featured = 1)
        ORDER BY approved_at DESC
        LIMIT ?
        "#,
    )
    .bind(featured_only)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(community_feedback_from_row).collect()
}

/// All of a user's own submissions, newest first, approved or not
pub async fn list_user_feedback(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<CommunityFeedback>> {
    let rows = sqlx::query(
        "SELECT * FROM community_feedback WHERE user_id = ?
         ORDER BY submitted_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(community_feedback_from_row).collect()
}

/// Record one helpfulness vote. Every vote bumps `total_votes`; only helpful
/// votes bump `helpful_votes`. Returns false for unknown ids.
pub async fn vote_on_feedback(
    pool: &SqlitePool,
    feedback_id: Uuid,
    is_helpful: bool,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE community_feedback
        SET total_votes = total_votes + 1,
            helpful_votes = helpful_votes + CASE WHEN ? THEN 1 ELSE 0 END
        WHERE guid = ?
        "#,
    )
    .bind(is_helpful)
    .bind(feedback_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn community_feedback_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CommunityFeedback> {
    let guid: String = row.get("guid");
    let features: String = row.get("favorite_features");
    let submitted_at: String = row.get("submitted_at");
    let approved_at: Option<String> = row.get("approved_at");

    Ok(CommunityFeedback {
        guid: parse_guid(&guid)?,
        user_id: row.get("user_id"),
        display_name: row.get("display_name"),
        user_location: row.get("user_location"),
        title: row.get("title"),
        content: row.get("content"),
        rating: row.get("rating"),
        usage_duration: row.get("usage_duration"),
        favorite_features: parse_json_list(&features)?,
        scan_count: row.get("scan_count"),
        is_approved: row.get("is_approved"),
        is_featured: row.get("is_featured"),
        moderated_by: row.get("moderated_by"),
        helpful_votes: row.get("helpful_votes"),
        total_votes: row.get("total_votes"),
        submitted_at: parse_ts(&submitted_at)?,
        approved_at: approved_at.as_deref().map(parse_ts).transpose()?,
    })
}
