//! Pet profile endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pawdentify_common::models::Pet;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db::{self, pets::PetUpdate};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePetRequest {
    pub name: String,
    pub breed: String,
    pub secondary_breed: Option<String>,
    pub age_years: Option<i64>,
    pub age_months: Option<i64>,
    pub weight_lbs: Option<f64>,
    pub color: Option<String>,
}

/// POST /api/pets
pub async fn create_pet(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<CreatePetRequest>,
) -> ApiResult<(StatusCode, Json<Pet>)> {
    if body.name.trim().is_empty() || body.breed.trim().is_empty() {
        return Err(ApiError::BadRequest("name and breed are required".to_string()));
    }

    let mut pet = Pet::new(user.0.clone(), body.name, body.breed);
    pet.secondary_breed = body.secondary_breed;
    pet.age_years = body.age_years;
    pet.age_months = body.age_months;
    pet.weight_lbs = body.weight_lbs;
    pet.color = body.color;

    db::pets::create_pet(&state.db, &pet).await?;

    Ok((StatusCode::CREATED, Json(pet)))
}

/// GET /api/pets
pub async fn list_pets(State(state): State<AppState>, user: UserId) -> ApiResult<Json<Vec<Pet>>> {
    let pets = db::pets::list_pets(&state.db, user.as_str()).await?;
    Ok(Json(pets))
}

/// GET /api/pets/:id
pub async fn get_pet(
    State(state): State<AppState>,
    user: UserId,
    Path(pet_id): Path<Uuid>,
) -> ApiResult<Json<Pet>> {
    let pet = db::pets::get_pet(&state.db, user.as_str(), pet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("pet {pet_id} not found")))?;
    Ok(Json(pet))
}

/// PUT /api/pets/:id
pub async fn update_pet(
    State(state): State<AppState>,
    user: UserId,
    Path(pet_id): Path<Uuid>,
    Json(body): Json<PetUpdate>,
) -> ApiResult<Json<Pet>> {
    if !db::pets::update_pet(&state.db, user.as_str(), pet_id, &body).await? {
        return Err(ApiError::NotFound(format!("pet {pet_id} not found")));
    }

    let pet = db::pets::get_pet(&state.db, user.as_str(), pet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("pet {pet_id} not found")))?;
    Ok(Json(pet))
}

/// DELETE /api/pets/:id
pub async fn delete_pet(
    State(state): State<AppState>,
    user: UserId,
    Path(pet_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !db::pets::deactivate_pet(&state.db, user.as_str(), pet_id).await? {
        return Err(ApiError::NotFound(format!("pet {pet_id} not found")));
    }
    Ok(Json(json!({ "status": "deleted" })))
}
