//! Combined dashboard endpoint
//!
//! One call bundling the caller's profile, scan statistics, and recent
//! activity so the home screen needs a single round trip.

use axum::{extract::State, Json};
use pawdentify_common::models::{ScanRecord, SearchRecord, UserProfile};
use serde::Serialize;

use crate::auth::UserId;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

const RECENT_SCANS: i64 = 5;
const RECENT_SEARCHES: i64 = 5;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: UserProfile,
    pub statistics: db::scans::ScanStatistics,
    pub recent_scans: Vec<ScanRecord>,
    pub recent_searches: Vec<SearchRecord>,
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<DashboardResponse>> {
    let profile = db::users::get_user_by_clerk_id(&state.db, user.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    let statistics = db::scans::get_scan_statistics(&state.db, user.as_str()).await?;
    let recent_scans = db::scans::list_scans(&state.db, user.as_str(), RECENT_SCANS, 0).await?;
    let recent_searches =
        db::searches::list_searches(&state.db, user.as_str(), RECENT_SEARCHES, 0).await?;

    Ok(Json(DashboardResponse {
        profile,
        statistics,
        recent_scans,
        recent_searches,
    }))
}
