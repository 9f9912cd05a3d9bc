//! User profile endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pawdentify_common::models::UserProfile;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::UserId;
use crate::db::{self, users::UserUpdate};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// POST /api/users
///
/// Idempotent signup: an existing profile for the same identity is returned
/// as-is with 200; a fresh one is created with 201 along with its default
/// preference row.
pub async fn signup(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    if body.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }

    if let Some(existing) = db::users::get_user_by_clerk_id(&state.db, user.as_str()).await? {
        return Ok((StatusCode::OK, Json(existing)));
    }

    let mut profile = UserProfile::new(user.0.clone(), body.email);
    profile.username = body.username;
    profile.first_name = body.first_name;
    profile.last_name = body.last_name;
    profile.profile_image_url = body.profile_image_url;

    db::users::create_user(&state.db, &profile).await?;
    db::preferences::get_or_create_preferences(&state.db, user.as_str()).await?;
    info!(user_id = %user.as_str(), "user created");

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<UserProfile>> {
    let profile = db::users::get_user_by_clerk_id(&state.db, user.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(profile))
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<UserUpdate>,
) -> ApiResult<Json<UserProfile>> {
    if !db::users::update_user(&state.db, user.as_str(), &body).await? {
        return Err(ApiError::NotFound("user not found".to_string()));
    }

    let profile = db::users::get_user_by_clerk_id(&state.db, user.as_str())
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    Ok(Json(profile))
}

/// POST /api/users/favorites/:breed
pub async fn add_favorite(
    State(state): State<AppState>,
    user: UserId,
    Path(breed): Path<String>,
) -> ApiResult<Json<Value>> {
    let added = db::users::add_favorite_breed(&state.db, user.as_str(), &breed).await?;
    Ok(Json(json!({ "added": added })))
}

/// DELETE /api/users/favorites/:breed
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: UserId,
    Path(breed): Path<String>,
) -> ApiResult<Json<Value>> {
    let removed = db::users::remove_favorite_breed(&state.db, user.as_str(), &breed).await?;
    Ok(Json(json!({ "removed": removed })))
}
