//! Search history endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use pawdentify_common::models::{DeviceType, SearchRecord};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::{self, searches::SearchInteractionUpdate};
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
pub struct CreateSearchRequest {
    pub breed_searched: String,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub device_type: DeviceType,
}

#[derive(Debug, Serialize)]
pub struct CreateSearchResponse {
    pub search_id: Uuid,
}

/// POST /api/search-history
pub async fn create_search(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<CreateSearchRequest>,
) -> ApiResult<(StatusCode, Json<CreateSearchResponse>)> {
    if body.breed_searched.trim().is_empty() {
        return Err(ApiError::BadRequest("breed_searched is required".to_string()));
    }

    let mut search = SearchRecord::new(user.0.clone(), body.breed_searched, body.search_query);
    search.device_type = body.device_type;

    db::searches::create_search(&state.db, &search).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSearchResponse { search_id: search.guid }),
    ))
}

/// GET /api/search-history
pub async fn list_searches(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<SearchRecord>>> {
    let searches =
        db::searches::list_searches(&state.db, user.as_str(), query.limit, query.skip).await?;
    Ok(Json(searches))
}

/// GET /api/search-history/recent
pub async fn recent_breeds(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<Vec<db::searches::RecentBreed>>> {
    let breeds = db::searches::recent_breeds(&state.db, user.as_str(), 10).await?;
    Ok(Json(breeds))
}

/// GET /api/search-history/popular
///
/// Global aggregation, no identity required.
pub async fn popular_breeds(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<db::searches::PopularBreed>>> {
    let breeds = db::searches::popular_breeds(&state.db, 10).await?;
    Ok(Json(breeds))
}

/// PUT /api/search-history/:id/interaction
pub async fn update_interaction(
    State(state): State<AppState>,
    user: UserId,
    Path(search_id): Path<Uuid>,
    Json(body): Json<SearchInteractionUpdate>,
) -> ApiResult<Json<Value>> {
    let updated =
        db::searches::update_interaction(&state.db, user.as_str(), search_id, &body).await?;

    if !updated {
        return Err(ApiError::NotFound(format!("search {search_id} not found")));
    }

    Ok(Json(json!({ "status": "ok" })))
}
