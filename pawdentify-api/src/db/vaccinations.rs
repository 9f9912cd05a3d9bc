//! Vaccination record operations

use chrono::{DateTime, Duration, Utc};
use pawdentify_common::models::{VaccinationRecord, VaccinationStatus};
use pawdentify_common::Result;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_guid, parse_ts};

/// Per-user counts across the vaccination schedule
#[derive(Debug, Clone, Serialize)]
pub struct VaccinationStatistics {
    pub total: i64,
    pub completed: i64,
    pub overdue: i64,
    pub upcoming: i64,
    pub core_vaccines: i64,
}

pub async fn create_vaccination(pool: &SqlitePool, record: &VaccinationRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO vaccinations (guid, user_id, pet_id, vaccine_name, vaccine_type,
                                  manufacturer, lot_number, administered_date, due_date,
                                  next_due_date, status, is_core_vaccine, frequency_months,
                                  veterinarian_name, clinic_name, clinic_contact, notes,
                                  created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.guid.to_string())
    .bind(&record.user_id)
    .bind(record.pet_id.to_string())
    .bind(&record.vaccine_name)
    .bind(&record.vaccine_type)
    .bind(&record.manufacturer)
    .bind(&record.lot_number)
    .bind(record.administered_date.map(|d| d.to_rfc3339()))
    .bind(record.due_date.to_rfc3339())
    .bind(record.next_due_date.map(|d| d.to_rfc3339()))
    .bind(record.status.as_str())
    .bind(record.is_core_vaccine)
    .bind(record.frequency_months)
    .bind(&record.veterinarian_name)
    .bind(&record.clinic_name)
    .bind(&record.clinic_contact)
    .bind(&record.notes)
    .bind(record.created_at.to_rfc3339())
    .bind(record.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// A user's vaccination records, soonest due first, optionally scoped to
/// one pet
pub async fn list_vaccinations(
    pool: &SqlitePool,
    user_id: &str,
    pet_id: Option<Uuid>,
) -> Result<Vec<VaccinationRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM vaccinations
        WHERE user_id = ? AND (? IS NULL OR pet_id = ?)
        ORDER BY due_date ASC
        "#,
    )
    .bind(user_id)
    .bind(pet_id.map(|id| id.to_string()))
    .bind(pet_id.map(|id| id.to_string()))
    .fetch_all(pool)
    .await?;

    rows.iter().map(vaccination_from_row).collect()
}

/// Non-completed records due within the next `days_ahead` days
pub async fn upcoming_vaccinations(
    pool: &SqlitePool,
    user_id: &str,
    days_ahead: i64,
) -> Result<Vec<VaccinationRecord>> {
    let now = Utc::now();
    let horizon = now + Duration::days(days_ahead);

    let rows = sqlx::query(
        r#"
        SELECT * FROM vaccinations
        WHERE user_id = ? AND status != 'completed'
          AND due_date >= ? AND due_date <= ?
        ORDER BY due_date ASC
        "#,
    )
    .bind(user_id)
    .bind(now.to_rfc3339())
    .bind(horizon.to_rfc3339())
    .fetch_all(pool)
    .await?;

    rows.iter().map(vaccination_from_row).collect()
}

/// Non-completed records whose due date has passed, most overdue first
pub async fn overdue_vaccinations(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<VaccinationRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM vaccinations
        WHERE user_id = ? AND status != 'completed' AND due_date < ?
        ORDER BY due_date ASC
        "#,
    )
    .bind(user_id)
    .bind(Utc::now().to_rfc3339())
    .fetch_all(pool)
    .await?;

    rows.iter().map(vaccination_from_row).collect()
}

/// Move a record to a new status. Completing sets `administered_date` to now
/// and schedules `next_due_date` one frequency interval out.
/// Returns false for unknown ids or records not owned by the caller.
pub async fn update_vaccination_status(
    pool: &SqlitePool,
    user_id: &str,
    vaccination_id: Uuid,
    status: VaccinationStatus,
) -> Result<bool> {
    let now = Utc::now();

    let result = if status == VaccinationStatus::Completed {
        sqlx::query(
            r#"
            UPDATE vaccinations SET
                status = 'completed',
                administered_date = ?,
                next_due_date = datetime(?, '+' || frequency_months || ' months'),
                updated_at = ?
            WHERE guid = ? AND user_id = ?
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(vaccination_id.to_string())
        .bind(user_id)
        .execute(pool)
        .await?
    } else {
        sqlx::query(
            "UPDATE vaccinations SET status = ?, updated_at = ?
             WHERE guid = ? AND user_id = ?",
        )
        .bind(status.as_str())
        .bind(now.to_rfc3339())
        .bind(vaccination_id.to_string())
        .bind(user_id)
        .execute(pool)
        .await?
    };

    Ok(result.rows_affected() > 0)
}

pub async fn vaccination_statistics(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<VaccinationStatistics> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(status = 'completed'), 0) AS completed,
               COALESCE(SUM(status != 'completed' AND due_date < ?), 0) AS overdue,
               COALESCE(SUM(status != 'completed' AND due_date >= ?), 0) AS upcoming,
               COALESCE(SUM(is_core_vaccine), 0) AS core_vaccines
        FROM vaccinations
        WHERE user_id = ?
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(Utc::now().to_rfc3339())
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(VaccinationStatistics {
        total: row.get("total"),
        completed: row.get("completed"),
        overdue: row.get("overdue"),
        upcoming: row.get("upcoming"),
        core_vaccines: row.get("core_vaccines"),
    })
}

fn vaccination_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<VaccinationRecord> {
    let guid: String = row.get("guid");
    let pet_id: String = row.get("pet_id");
    let administered: Option<String> = row.get("administered_date");
    let due_date: String = row.get("due_date");
    let next_due: Option<String> = row.get("next_due_date");
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(VaccinationRecord {
        guid: parse_guid(&guid)?,
        user_id: row.get("user_id"),
        pet_id: parse_guid(&pet_id)?,
        vaccine_name: row.get("vaccine_name"),
        vaccine_type: row.get("vaccine_type"),
        manufacturer: row.get("manufacturer"),
        lot_number: row.get("lot_number"),
        administered_date: administered.as_deref().map(parse_ts).transpose()?,
        due_date: parse_ts(&due_date)?,
        next_due_date: next_due.as_deref().map(parse_loose_ts).transpose()?,
        status: VaccinationStatus::parse(&status).unwrap_or_default(),
        is_core_vaccine: row.get("is_core_vaccine"),
        frequency_months: row.get("frequency_months"),
        veterinarian_name: row.get("veterinarian_name"),
        clinic_name: row.get("clinic_name"),
        clinic_contact: row.get("clinic_contact"),
        notes: row.get("notes"),
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

/// `next_due_date` may come back from sqlite's datetime() without an offset
fn parse_loose_ts(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = parse_ts(s) {
        return Ok(ts);
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| pawdentify_common::Error::Internal(format!("bad timestamp {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        pawdentify_common::db::init::create_schema(&pool).await.unwrap();
        pool
    }

    fn sample(user_id: &str, pet_id: Uuid, name: &str, due_in_days: i64) -> VaccinationRecord {
        let now = Utc::now();
        VaccinationRecord {
            guid: Uuid::new_v4(),
            user_id: user_id.to_string(),
            pet_id,
            vaccine_name: name.to_string(),
            vaccine_type: "core".to_string(),
            manufacturer: None,
            lot_number: None,
            administered_date: None,
            due_date: now + Duration::days(due_in_days),
            next_due_date: None,
            status: VaccinationStatus::Upcoming,
            is_core_vaccine: true,
            frequency_months: 12,
            veterinarian_name: None,
            clinic_name: None,
            clinic_contact: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_orders_by_due_date() {
        let pool = test_pool().await;
        let pet = Uuid::new_v4();
        create_vaccination(&pool, &sample("user_1", pet, "Rabies", 60)).await.unwrap();
        create_vaccination(&pool, &sample("user_1", pet, "DHPP", 10)).await.unwrap();

        let list = list_vaccinations(&pool, "user_1", None).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].vaccine_name, "DHPP");

        let scoped = list_vaccinations(&pool, "user_1", Some(Uuid::new_v4())).await.unwrap();
        assert!(scoped.is_empty());
    }

    #[tokio::test]
    async fn upcoming_and_overdue_split_on_due_date() {
        let pool = test_pool().await;
        let pet = Uuid::new_v4();
        create_vaccination(&pool, &sample("user_1", pet, "Rabies", 10)).await.unwrap();
        create_vaccination(&pool, &sample("user_1", pet, "DHPP", -5)).await.unwrap();
        create_vaccination(&pool, &sample("user_1", pet, "Lepto", 90)).await.unwrap();

        let upcoming = upcoming_vaccinations(&pool, "user_1", 30).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].vaccine_name, "Rabies");

        let overdue = overdue_vaccinations(&pool, "user_1").await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].vaccine_name, "DHPP");
    }

    #[tokio::test]
    async fn completing_schedules_next_dose() {
        let pool = test_pool().await;
        let record = sample("user_1", Uuid::new_v4(), "Rabies", -5);
        create_vaccination(&pool, &record).await.unwrap();

        let updated = update_vaccination_status(
            &pool,
            "user_1",
            record.guid,
            VaccinationStatus::Completed,
        )
        .await
        .unwrap();
        assert!(updated);

        let list = list_vaccinations(&pool, "user_1", None).await.unwrap();
        assert_eq!(list[0].status, VaccinationStatus::Completed);
        assert!(list[0].administered_date.is_some());
        let next = list[0].next_due_date.expect("next dose scheduled");
        assert!(next > Utc::now() + Duration::days(300));
    }

    #[tokio::test]
    async fn statistics_count_by_status() {
        let pool = test_pool().await;
        let pet = Uuid::new_v4();
        create_vaccination(&pool, &sample("user_1", pet, "Rabies", -5)).await.unwrap();
        create_vaccination(&pool, &sample("user_1", pet, "DHPP", 10)).await.unwrap();
        let done = sample("user_1", pet, "Lepto", -30);
        create_vaccination(&pool, &done).await.unwrap();
        update_vaccination_status(&pool, "user_1", done.guid, VaccinationStatus::Completed)
            .await
            .unwrap();

        let stats = vaccination_statistics(&pool, "user_1").await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.core_vaccines, 3);
    }
}
