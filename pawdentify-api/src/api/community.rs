//! Community testimonial endpoints
//!
//! Submissions go through moderation before appearing in the public
//! testimonial listing, so the create endpoint never echoes into
//! `/testimonials` directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pawdentify_common::models::CommunityFeedback;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCommunityFeedbackRequest {
    pub display_name: String,
    pub user_location: Option<String>,
    pub title: String,
    pub content: String,
    pub rating: i64,
    pub usage_duration: Option<String>,
    #[serde(default)]
    pub favorite_features: Vec<String>,
    pub scan_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TestimonialsQuery {
    #[serde(default = "default_testimonial_limit")]
    pub limit: i64,
    #[serde(default)]
    pub featured_only: bool,
}

fn default_testimonial_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct VoteQuery {
    pub is_helpful: bool,
}

/// POST /api/community-feedback
pub async fn create_community_feedback(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<CreateCommunityFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<CommunityFeedback>)> {
    if body.display_name.trim().is_empty()
        || body.title.trim().is_empty()
        || body.content.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "display_name, title and content are required".to_string(),
        ));
    }
    if !(1..=5).contains(&body.rating) {
        return Err(ApiError::BadRequest("rating must be 1-5".to_string()));
    }

    let mut feedback = CommunityFeedback::new(
        user.0.clone(),
        body.display_name,
        body.title,
        body.content,
        body.rating,
    );
    feedback.user_location = body.user_location;
    feedback.usage_duration = body.usage_duration;
    feedback.favorite_features = body.favorite_features;
    feedback.scan_count = body.scan_count;

    db::community::create_community_feedback(&state.db, &feedback).await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// GET /api/community-feedback/testimonials (public)
pub async fn testimonials(
    State(state): State<AppState>,
    Query(query): Query<TestimonialsQuery>,
) -> ApiResult<Json<Vec<CommunityFeedback>>> {
    let limit = query.limit.clamp(1, 50);
    let listed =
        db::community::approved_testimonials(&state.db, limit, query.featured_only).await?;
    Ok(Json(listed))
}

/// GET /api/community-feedback/user
pub async fn list_user_feedback(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<Vec<CommunityFeedback>>> {
    let own = db::community::list_user_feedback(&state.db, user.as_str()).await?;
    Ok(Json(own))
}

/// POST /api/community-feedback/:id/vote
pub async fn vote(
    State(state): State<AppState>,
    Path(feedback_id): Path<Uuid>,
    Query(query): Query<VoteQuery>,
) -> ApiResult<Json<Value>> {
    let voted = db::community::vote_on_feedback(&state.db, feedback_id, query.is_helpful).await?;

    if !voted {
        return Err(ApiError::NotFound(format!(
            "community feedback {feedback_id} not found"
        )));
    }

    Ok(Json(json!({ "status": "ok" })))
}
