//! Vaccination schedule endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use pawdentify_common::models::{VaccinationRecord, VaccinationStatus};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::UserId;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVaccinationRequest {
    pub pet_id: Uuid,
    pub vaccine_name: String,
    #[serde(default = "default_vaccine_type")]
    pub vaccine_type: String,
    pub due_date: DateTime<Utc>,
    pub administered_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_core_vaccine: bool,
    #[serde(default = "default_frequency")]
    pub frequency_months: i64,
    pub veterinarian_name: Option<String>,
    pub clinic_name: Option<String>,
    pub notes: Option<String>,
}

fn default_vaccine_type() -> String {
    "core".to_string()
}

fn default_true() -> bool {
    true
}

fn default_frequency() -> i64 {
    12
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub pet_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
}

fn default_days_ahead() -> i64 {
    30
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: VaccinationStatus,
}

/// POST /api/vaccinations
pub async fn create_vaccination(
    State(state): State<AppState>,
    user: UserId,
    Json(body): Json<CreateVaccinationRequest>,
) -> ApiResult<(StatusCode, Json<VaccinationRecord>)> {
    if body.vaccine_name.trim().is_empty() {
        return Err(ApiError::BadRequest("vaccine_name is required".to_string()));
    }

    // Records must hang off a pet the caller owns
    db::pets::get_pet(&state.db, user.as_str(), body.pet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("pet {} not found", body.pet_id)))?;

    let now = Utc::now();
    let record = VaccinationRecord {
        guid: Uuid::new_v4(),
        user_id: user.0.clone(),
        pet_id: body.pet_id,
        vaccine_name: body.vaccine_name,
        vaccine_type: body.vaccine_type,
        manufacturer: None,
        lot_number: None,
        administered_date: body.administered_date,
        due_date: body.due_date,
        next_due_date: None,
        status: if body.administered_date.is_some() {
            VaccinationStatus::Completed
        } else {
            VaccinationStatus::Upcoming
        },
        is_core_vaccine: body.is_core_vaccine,
        frequency_months: body.frequency_months,
        veterinarian_name: body.veterinarian_name,
        clinic_name: body.clinic_name,
        clinic_contact: None,
        notes: body.notes,
        created_at: now,
        updated_at: now,
    };

    db::vaccinations::create_vaccination(&state.db, &record).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/vaccinations
pub async fn list_vaccinations(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<VaccinationRecord>>> {
    let records =
        db::vaccinations::list_vaccinations(&state.db, user.as_str(), query.pet_id).await?;
    Ok(Json(records))
}

/// GET /api/vaccinations/upcoming
pub async fn upcoming(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<UpcomingQuery>,
) -> ApiResult<Json<Vec<VaccinationRecord>>> {
    let days = query.days_ahead.clamp(1, 365);
    let records = db::vaccinations::upcoming_vaccinations(&state.db, user.as_str(), days).await?;
    Ok(Json(records))
}

/// GET /api/vaccinations/overdue
pub async fn overdue(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<Vec<VaccinationRecord>>> {
    let records = db::vaccinations::overdue_vaccinations(&state.db, user.as_str()).await?;
    Ok(Json(records))
}

/// GET /api/vaccinations/statistics
pub async fn statistics(
    State(state): State<AppState>,
    user: UserId,
) -> ApiResult<Json<db::vaccinations::VaccinationStatistics>> {
    let stats = db::vaccinations::vaccination_statistics(&state.db, user.as_str()).await?;
    Ok(Json(stats))
}

/// PUT /api/vaccinations/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    user: UserId,
    Path(vaccination_id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> ApiResult<Json<Value>> {
    let updated = db::vaccinations::update_vaccination_status(
        &state.db,
        user.as_str(),
        vaccination_id,
        body.status,
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound(format!(
            "vaccination {vaccination_id} not found"
        )));
    }

    Ok(Json(json!({ "status": "ok" })))
}
