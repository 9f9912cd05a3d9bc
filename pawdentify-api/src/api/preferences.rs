//! User preference endpoints

use axum::{extract::State, Json};
use pawdentify_common::models::UserPreferences;

use crate::auth::UserId;
use crate::db::{self, preferences::PreferencesUpdate};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/preferences
///
/// Creates the default row on first read.
pub async fn get_preferences(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<UserPreferences>> {
    let prefs = db::preferences::get_or_create_preferences(&state.db, user.as_str()).await?;
    Ok(Json(prefs))
}

/// PUT /api/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<PreferencesUpdate>,
) -> ApiResult<Json<UserPreferences>> {
    let prefs = db::preferences::update_preferences(&state.db, user.as_str(), &body).await?;
    Ok(Json(prefs))
}
