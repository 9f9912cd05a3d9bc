//! Pet profile operations
//!
//! Pets are soft-deleted: `is_active` flips to false and the row stays so
//! vaccination history keeps resolving.

use chrono::Utc;
use pawdentify_common::models::Pet;
use pawdentify_common::Result;
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, parse_json_list, parse_ts, to_json_list};

/// Updatable pet fields. Unknown keys are rejected at deserialization time.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PetUpdate {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub secondary_breed: Option<String>,
    pub age_years: Option<i64>,
    pub age_months: Option<i64>,
    pub weight_lbs: Option<f64>,
    pub color: Option<String>,
    pub microchip_id: Option<String>,
    pub veterinarian_name: Option<String>,
    pub veterinarian_contact: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<String>>,
    pub special_notes: Option<String>,
}

pub async fn create_pet(pool: &SqlitePool, pet: &Pet) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO pets (guid, user_id, name, breed, secondary_breed,
                          age_years, age_months, weight_lbs, color, microchip_id,
                          veterinarian_name, veterinarian_contact,
                          allergies, medical_conditions, special_notes,
                          is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(pet.guid.to_string())
    .bind(&pet.user_id)
    .bind(&pet.name)
    .bind(&pet.breed)
    .bind(&pet.secondary_breed)
    .bind(pet.age_years)
    .bind(pet.age_months)
    .bind(pet.weight_lbs)
    .bind(&pet.color)
    .bind(&pet.microchip_id)
    .bind(&pet.veterinarian_name)
    .bind(&pet.veterinarian_contact)
    .bind(to_json_list(&pet.allergies)?)
    .bind(to_json_list(&pet.medical_conditions)?)
    .bind(&pet.special_notes)
    .bind(pet.is_active)
    .bind(pet.created_at.to_rfc3339())
    .bind(pet.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Active pets for a user, newest first
pub async fn list_pets(pool: &SqlitePool, user_id: &str) -> Result<Vec<Pet>> {
    let rows = sqlx::query(
        "SELECT * FROM pets WHERE user_id = ? AND is_active = 1
         ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(pet_from_row).collect()
}

pub async fn get_pet(pool: &SqlitePool, user_id: &str, pet_id: Uuid) -> Result<Option<Pet>> {
    let row = sqlx::query("SELECT * FROM pets WHERE guid = ? AND user_id = ?")
        .bind(pet_id.to_string())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(pet_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Apply a typed partial update; refreshes `updated_at`.
/// Returns false for unknown ids or pets not owned by the caller.
pub async fn update_pet(
    pool: &SqlitePool,
    user_id: &str,
    pet_id: Uuid,
    update: &PetUpdate,
) -> Result<bool> {
    let allergies = match &update.allergies {
        Some(list) => Some(to_json_list(list)?),
        None => None,
    };
    let conditions = match &update.medical_conditions {
        Some(list) => Some(to_json_list(list)?),
        None => None,
    };

    let result = sqlx::query(
        r#"
        UPDATE pets SET
            name = COALESCE(?, name),
            breed = COALESCE(?, breed),
            secondary_breed = COALESCE(?, secondary_breed),
            age_years = COALESCE(?, age_years),
            age_months = COALESCE(?, age_months),
            weight_lbs = COALESCE(?, weight_lbs),
            color = COALESCE(?, color),
            microchip_id = COALESCE(?, microchip_id),
            veterinarian_name = COALESCE(?, veterinarian_name),
            veterinarian_contact = COALESCE(?, veterinarian_contact),
            allergies = COALESCE(?, allergies),
            medical_conditions = COALESCE(?, medical_conditions),
            special_notes = COALESCE(?, special_notes),
            updated_at = ?
        WHERE guid = ? AND user_id = ? AND is_active = 1
        "#,
    )
    .bind(&update.name)
    .bind(&update.breed)
    .bind(&update.secondary_breed)
    .bind(update.age_years)
    .bind(update.age_months)
    .bind(update.weight_lbs)
    .bind(&update.color)
    .bind(&update.microchip_id)
    .bind(&update.veterinarian_name)
    .bind(&update.veterinarian_contact)
    .bind(allergies)
    .bind(conditions)
    .bind(&update.special_notes)
    .bind(Utc::now().to_rfc3339())
    .bind(pet_id.to_string())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Soft-delete. Returns false for unknown ids, foreign pets, or pets
/// already deactivated.
pub async fn deactivate_pet(pool: &SqlitePool, user_id: &str, pet_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE pets SET is_active = 0, updated_at = ?
         WHERE guid = ? AND user_id = ? AND is_active = 1",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(pet_id.to_string())
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn pet_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Pet> {
    let guid: String = row.get("guid");
    let allergies: String = row.get("allergies");
    let conditions: String = row.get("medical_conditions");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Pet {
        guid: parse_guid(&guid)?,
        user_id: row.get("user_id"),
        name: row.get("name"),
        breed: row.get("breed"),
        secondary_breed: row.get("secondary_breed"),
        age_years: row.get("age_years"),
        age_months: row.get("age_months"),
        weight_lbs: row.get("weight_lbs"),
        color: row.get("color"),
        microchip_id: row.get("microchip_id"),
        veterinarian_name: row.get("veterinarian_name"),
        veterinarian_contact: row.get("veterinarian_contact"),
        allergies: parse_json_list(&allergies)?,
        medical_conditions: parse_json_list(&conditions)?,
        special_notes: row.get("special_notes"),
        is_active: row.get("is_active"),
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}
