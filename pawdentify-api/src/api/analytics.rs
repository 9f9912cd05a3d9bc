//! Analytics endpoints
//!
//! Each handler fetches a bounded snapshot of the caller's scan history and
//! runs the pure analytics functions over it with today's date.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pawdentify_common::models::ScanRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analytics::{
    self, export, AccuracyPoint, BreedShare, HistogramBin, TrendDirection, TrendPeriod,
    TrendPoint, SNAPSHOT_LIMIT,
};
use crate::auth::UserId;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
pub struct BreedsQuery {
    pub breed_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "daily".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

fn default_format() -> String {
    "json".to_string()
}

fn default_data_type() -> String {
    "all".to_string()
}

#[derive(Debug, Serialize)]
pub struct DashboardInsights {
    pub most_active_hour: Option<usize>,
    pub favorite_breed: Option<String>,
    pub average_confidence: f64,
    /// Scans per day over the requested window, one decimal
    pub scan_frequency: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsDashboard {
    pub total_scans: i64,
    pub daily_trends: Vec<TrendPoint>,
    pub breed_distribution: Vec<BreedShare>,
    pub confidence_histogram: Vec<HistogramBin>,
    pub scan_streak: i64,
    pub current_month_scans: i64,
    pub previous_month_scans: i64,
    pub growth_rate: f64,
    pub trend_direction: TrendDirection,
    pub hourly_usage: [i64; 24],
    pub daily_accuracy: Vec<AccuracyPoint>,
    pub insights: DashboardInsights,
}

/// Bounded snapshot of the caller's history covering at least `days` back
async fn fetch_snapshot(
    state: &AppState,
    user_id: &str,
    days: i64,
) -> ApiResult<Vec<ScanRecord>> {
    let start = Utc::now() - Duration::days(days);
    let scans = db::scans::list_scans_in_range(
        &state.db,
        user_id,
        SNAPSHOT_LIMIT,
        Some(start),
        None,
    )
    .await?;
    Ok(scans)
}

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<AnalyticsDashboard>> {
    let days = query.days.clamp(1, 365);
    let today = Utc::now().date_naive();

    // Month-over-month needs history beyond the requested window
    let lookback = (days as i64).max(62);
    let scans = fetch_snapshot(&state, user.as_str(), lookback).await?;

    let daily = analytics::daily_trends(&scans, days, today);
    let direction = analytics::trend_direction(&daily);

    let current_month = count_since(&state, user.as_str(), analytics::month_start_back(today, 0)).await?;
    let previous_start = analytics::month_start_back(today, 1);
    let previous_end = analytics::month_start_back(today, 0) - Duration::days(1);
    let previous_month =
        count_between(&state, user.as_str(), previous_start, previous_end).await?;

    let confidences: Vec<f64> = scans.iter().map(|s| s.confidence_score).collect();
    let distribution = analytics::breed_distribution(&scans);

    let hours = analytics::hourly_usage(&scans);
    let most_active_hour = hours
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .max_by_key(|(_, &count)| count)
        .map(|(hour, _)| hour);

    let average_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    let window_scans: i64 = daily.iter().map(|p| p.count).sum();

    let stats = db::scans::get_scan_statistics(&state.db, user.as_str()).await?;

    Ok(Json(AnalyticsDashboard {
        total_scans: stats.total_scans,
        scan_streak: analytics::scan_streak(&scans, today),
        current_month_scans: current_month,
        previous_month_scans: previous_month,
        growth_rate: analytics::growth_rate(current_month, previous_month),
        trend_direction: direction,
        confidence_histogram: analytics::confidence_histogram(&confidences),
        hourly_usage: hours,
        daily_accuracy: analytics::daily_accuracy(&scans),
        insights: DashboardInsights {
            most_active_hour,
            favorite_breed: distribution.first().map(|s| s.breed.clone()),
            average_confidence: (average_confidence * 1000.0).round() / 1000.0,
            scan_frequency: ((window_scans as f64 / days as f64) * 10.0).round() / 10.0,
        },
        breed_distribution: distribution,
        daily_trends: daily,
    }))
}

async fn count_since(state: &AppState, user_id: &str, start: NaiveDate) -> ApiResult<i64> {
    count_between(state, user_id, start, Utc::now().date_naive()).await
}

async fn count_between(
    state: &AppState,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> ApiResult<i64> {
    let start = Utc
        .from_utc_datetime(&start.and_hms_opt(0, 0, 0).expect("valid midnight"));
    let end = Utc
        .from_utc_datetime(&end.and_hms_opt(23, 59, 59).expect("valid end of day"));
    let count = db::scans::count_scans_between(&state.db, user_id, start, end).await?;
    Ok(count)
}

/// GET /api/analytics/breeds
///
/// Without `breed_name`: frequency table over the caller's history. With it:
/// that breed's scans.
pub async fn breeds(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<BreedsQuery>,
) -> ApiResult<Response> {
    match query.breed_name {
        Some(breed) => {
            let scans = db::scans::scans_by_breed(&state.db, user.as_str(), &breed).await?;
            if scans.is_empty() {
                return Err(ApiError::NotFound(format!("no scans for breed {breed}")));
            }
            Ok(Json(scans).into_response())
        }
        None => {
            let freq = db::scans::breed_frequency(&state.db, user.as_str(), 50).await?;
            Ok(Json(freq).into_response())
        }
    }
}

/// GET /api/analytics/trends
pub async fn trends(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<TrendsQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let period = TrendPeriod::parse(&query.period).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown period {:?}; expected daily, weekly, or monthly",
            query.period
        ))
    })?;

    // Longest window is 12 months
    let scans = fetch_snapshot(&state, user.as_str(), 366).await?;
    let today = Utc::now().date_naive();
    let points = analytics::trends_for_period(&scans, period, today);
    let direction = analytics::trend_direction(&points);

    Ok(Json(json!({
        "period": period.as_str(),
        "trends": points,
        "trend_direction": direction,
    })))
}

/// POST /api/analytics/export
pub async fn export_data(
    State(state): State<AppState>,
    user: UserId,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let scans = fetch_snapshot(&state, user.as_str(), 366).await?;
    let freq = db::scans::breed_frequency(&state.db, user.as_str(), 50).await?;
    let today = Utc::now().date_naive();
    let trend_points = analytics::monthly_trends(&scans, 12, today);

    match query.format.as_str() {
        "json" => {
            let body = match query.data_type.as_str() {
                "scans" => json!({ "scans": scans }),
                "breeds" => json!({ "breeds": freq }),
                "trends" => json!({ "trends": trend_points }),
                "all" => json!({
                    "scans": scans,
                    "breeds": freq,
                    "trends": trend_points,
                }),
                other => {
                    return Err(ApiError::BadRequest(format!("unknown data_type {other:?}")))
                }
            };
            Ok(Json(body).into_response())
        }
        "csv" => {
            let body = match query.data_type.as_str() {
                "scans" => export::scans_csv(&scans),
                "breeds" => export::breeds_csv(&freq),
                "trends" => export::trends_csv(&trend_points),
                "all" => format!(
                    "{}\n{}\n{}",
                    export::scans_csv(&scans),
                    export::breeds_csv(&freq),
                    export::trends_csv(&trend_points),
                ),
                other => {
                    return Err(ApiError::BadRequest(format!("unknown data_type {other:?}")))
                }
            };
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/csv")],
                body,
            )
                .into_response())
        }
        other => Err(ApiError::BadRequest(format!(
            "unknown format {other:?}; expected csv or json"
        ))),
    }
}
