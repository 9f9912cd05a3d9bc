//! Health check endpoints
//!
//! `/health` is a bare liveness probe; `/api/health` additionally reports
//! database and inference-backend readiness. Neither requires authentication.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// Readiness response with per-dependency status
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub database: String,
    pub model: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "pawdentify-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health
///
/// Degrades rather than fails: a down dependency is reported in the body,
/// the endpoint itself still answers 200.
pub async fn readiness_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };

    let model = if state.classifier.is_available() {
        "ok"
    } else {
        "unavailable"
    };

    let status = if database == "ok" && model == "ok" {
        "ok"
    } else {
        "degraded"
    };

    Json(ReadinessResponse {
        status: status.to_string(),
        database: database.to_string(),
        model: model.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
