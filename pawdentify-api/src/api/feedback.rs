//! Feedback endpoints
//!
//! General feedback submissions plus the scan-feedback shortcut, which both
//! records the user's verdict on the scan and files a breed-correction
//! feedback entry so misclassifications are reviewable in one place.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use pawdentify_common::models::{
    DeviceType, FeedbackRecord, FeedbackStatus, FeedbackType, ScanFeedback,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    #[serde(default)]
    pub feedback_type: FeedbackType,
    pub subject: String,
    pub message: String,
    pub app_version: Option<String>,
    #[serde(default)]
    pub device_type: DeviceType,
    pub page_url: Option<String>,
    pub rating: Option<i64>,
    #[serde(default)]
    pub follow_up_requested: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScanFeedbackRequest {
    pub scan_id: Uuid,
    pub feedback: ScanFeedback,
    pub correct_breed: Option<String>,
}

/// POST /api/feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<CreateFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<FeedbackRecord>)> {
    if body.subject.trim().is_empty() || body.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "subject and message are required".to_string(),
        ));
    }
    if let Some(rating) = body.rating {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::BadRequest("rating must be 1-5".to_string()));
        }
    }

    let now = Utc::now();
    let record = FeedbackRecord {
        guid: Uuid::new_v4(),
        user_id: user.0.clone(),
        feedback_type: body.feedback_type,
        subject: body.subject,
        message: body.message,
        app_version: body.app_version,
        device_type: body.device_type,
        page_url: body.page_url,
        scan_id: None,
        predicted_breed: None,
        corrected_breed: None,
        confidence_score: None,
        priority: "medium".to_string(),
        status: FeedbackStatus::Pending,
        rating: body.rating,
        follow_up_requested: body.follow_up_requested,
        submitted_at: now,
        updated_at: now,
    };

    db::feedback::create_feedback(&state.db, &record).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<FeedbackRecord>>> {
    let records =
        db::feedback::list_feedback(&state.db, user.as_str(), query.limit, query.skip).await?;
    Ok(Json(records))
}

/// GET /api/feedback/statistics
pub async fn feedback_statistics(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<db::feedback::FeedbackStatistics>> {
    let stats = db::feedback::feedback_statistics(&state.db, user.as_str()).await?;
    Ok(Json(stats))
}

/// POST /api/scan-feedback
pub async fn scan_feedback(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<ScanFeedbackRequest>,
) -> ApiResult<Json<Value>> {
    let updated = db::scans::update_scan_feedback(
        &state.db,
        user.as_str(),
        body.scan_id,
        body.feedback,
        body.correct_breed.as_deref(),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("scan {} not found", body.scan_id)));
    }

    // Incorrect verdicts also land in the feedback queue for review
    if body.feedback != ScanFeedback::Correct {
        let scan = db::scans::get_scan_by_id(&state.db, user.as_str(), body.scan_id).await?;

        let now = Utc::now();
        let record = FeedbackRecord {
            guid: Uuid::new_v4(),
            user_id: user.0.clone(),
            feedback_type: FeedbackType::BreedCorrection,
            subject: "Scan result correction".to_string(),
            message: match &body.correct_breed {
                Some(breed) => format!("User identified the breed as {breed}"),
                None => "User flagged the prediction as wrong".to_string(),
            },
            app_version: None,
            device_type: DeviceType::Unknown,
            page_url: None,
            scan_id: Some(body.scan_id.to_string()),
            predicted_breed: scan.as_ref().map(|s| s.predicted_breed.clone()),
            corrected_breed: body.correct_breed.clone(),
            confidence_score: scan.as_ref().map(|s| s.confidence_score),
            priority: "medium".to_string(),
            status: FeedbackStatus::Pending,
            rating: None,
            follow_up_requested: false,
            submitted_at: now,
            updated_at: now,
        };
        db::feedback::create_feedback(&state.db, &record).await?;
    }

    Ok(Json(json!({ "status": "ok" })))
}
