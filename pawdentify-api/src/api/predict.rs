//! Breed prediction endpoint
//!
//! Accepts a multipart image upload, runs one inference pass, applies the
//! crossbreed heuristic, and answers with the top predictions. When a
//! `user_id` query parameter is present the scan is persisted best-effort:
//! a storage failure is logged and swallowed, the prediction still succeeds.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use pawdentify_common::models::{BreedPrediction, ScanRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::ClassifierError;
use crate::crossbreed::{self, CrossbreedAnalysis};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Number of ranked predictions included in the response
const TOP_PREDICTIONS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// When present, the scan is recorded against this user
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_breed: String,
    pub confidence: f64,
    pub is_crossbreed: bool,
    pub top_predictions: Vec<BreedPrediction>,
    pub crossbreed_analysis: Option<CrossbreedAnalysis>,
    pub timestamp: DateTime<Utc>,
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<PredictResponse>> {
    let image_bytes = read_image_field(&mut multipart).await?;

    let predictions = state
        .classifier
        .classify(&image_bytes)
        .await
        .map_err(|e| match e {
            ClassifierError::InvalidImage(msg) => ApiError::BadRequest(msg),
            ClassifierError::ModelUnavailable => {
                ApiError::Unavailable("Classification model unavailable".to_string())
            }
            ClassifierError::Inference(msg) => ApiError::Internal(msg),
        })?;

    let top = predictions
        .first()
        .ok_or_else(|| ApiError::Internal("empty prediction list".to_string()))?
        .clone();

    let analysis = crossbreed::analyze(&predictions);

    let response = PredictResponse {
        predicted_breed: top.breed.clone(),
        confidence: top.confidence,
        is_crossbreed: analysis.is_some(),
        top_predictions: predictions.iter().take(TOP_PREDICTIONS).cloned().collect(),
        crossbreed_analysis: analysis.clone(),
        timestamp: Utc::now(),
    };

    if let Some(user_id) = query.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        let mut scan = ScanRecord::new(
            user_id.to_string(),
            top.breed.clone(),
            top.confidence,
            response.top_predictions.clone(),
        );
        if let Some(analysis) = &analysis {
            scan.is_crossbreed = true;
            scan.secondary_breed = Some(analysis.secondary_breed.clone());
        }

        // Persistence is best-effort; the prediction already happened
        match db::scans::create_scan(&state.db, &scan).await {
            Ok(()) => info!(user_id, breed = %top.breed, "scan recorded"),
            Err(e) => warn!(user_id, error = %e, "failed to record scan"),
        }
    }

    Ok(Json(response))
}

/// Pull the first file field out of the multipart body
async fn read_image_field(multipart: &mut Multipart) -> ApiResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let is_file = field.file_name().is_some() || field.name() == Some("file");
        if is_file {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
            if bytes.is_empty() {
                return Err(ApiError::BadRequest("empty image upload".to_string()));
            }
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::BadRequest("missing image file field".to_string()))
}
