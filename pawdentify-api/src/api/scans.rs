//! Scan history endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pawdentify_common::models::{BreedPrediction, DeviceType, ScanFeedback, ScanRecord};
use serde::{Deserialize, Serialize};
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
    /// Restrict to the last N days
    pub days: Option<i64>,
}

fn default_limit() -> i64 {
    50
}

/// Client-supplied scan creation body. The server owns the id and timestamp.
#[derive(Debug, Deserialize)]
pub struct CreateScanRequest {
    pub predicted_breed: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub is_crossbreed: bool,
    pub secondary_breed: Option<String>,
    #[serde(default)]
    pub top_predictions: Vec<BreedPrediction>,
    pub image_hash: Option<String>,
    #[serde(default)]
    pub device_type: DeviceType,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: ScanFeedback,
    pub confirmed_breed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateScanResponse {
    pub scan_id: Uuid,
}

/// POST /api/scans
pub async fn create_scan(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<CreateScanRequest>,
) -> ApiResult<(StatusCode, Json<CreateScanResponse>)> {
    if !(0.0..=1.0).contains(&body.confidence_score) {
        return Err(ApiError::BadRequest(
            "confidence_score must be between 0 and 1".to_string(),
        ));
    }
    if body
        .top_predictions
        .iter()
        .any(|p| !(0.0..=1.0).contains(&p.confidence))
    {
        return Err(ApiError::BadRequest(
            "top_predictions confidences must be between 0 and 1".to_string(),
        ));
    }
    if body
        .top_predictions
        .windows(2)
        .any(|pair| pair[0].confidence < pair[1].confidence)
    {
        return Err(ApiError::BadRequest(
            "top_predictions must be sorted by descending confidence".to_string(),
        ));
    }

    let mut scan = ScanRecord::new(
        user.0.clone(),
        body.predicted_breed,
        body.confidence_score,
        body.top_predictions,
    );
    scan.is_crossbreed = body.is_crossbreed;
    scan.secondary_breed = body.secondary_breed;
    scan.image_hash = body.image_hash;
    scan.device_type = body.device_type;

    db::scans::create_scan(&state.db, &scan).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateScanResponse { scan_id: scan.guid }),
    ))
}

/// GET /api/scans
pub async fn list_scans(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ScanRecord>>> {
    let scans = match query.days {
        Some(days) => {
            let start = chrono::Utc::now() - chrono::Duration::days(days.clamp(1, 3650));
            db::scans::list_scans_in_range(
                &state.db,
                user.as_str(),
                query.limit,
                Some(start),
                None,
            )
            .await?
        }
        None => db::scans::list_scans(&state.db, user.as_str(), query.limit, query.skip).await?,
    };
    Ok(Json(scans))
}

/// GET /api/scans/statistics
pub async fn scan_statistics(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<db::scans::ScanStatistics>> {
    let stats = db::scans::get_scan_statistics(&state.db, user.as_str()).await?;
    Ok(Json(stats))
}

/// PUT /api/scans/:id/feedback
pub async fn scan_feedback(
    State(state): State<AppState>,
    user: UserId,
    Path(scan_id): Path<Uuid>,
    Json(body): Json<FeedbackRequest>,
) -> ApiResult<Json<Value>> {
    let updated = db::scans::update_scan_feedback(
        &state.db,
        user.as_str(),
        scan_id,
        body.feedback,
        body.confirmed_breed.as_deref(),
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound(format!("scan {scan_id} not found")));
    }

    Ok(Json(json!({ "status": "ok" })))
}
