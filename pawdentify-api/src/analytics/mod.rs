//! Analytics engine
//!
//! Derived aggregates over a materialized snapshot of scan records fetched
//! from the store (bounded at 1000 records per call): time-bucketed trends,
//! breed distribution, confidence histogram, streaks, growth and trend
//! direction. Every function here is pure and deterministic; "today" is
//! passed in explicitly so the handlers supply `Utc::now()` and the tests
//! supply fixed dates. No streaming, no caching across calls.

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use pawdentify_common::models::ScanRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub mod export;

/// Upper bound on records fetched per analytics call
pub const SNAPSHOT_LIMIT: i64 = 1000;

/// Supported trend bucket sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl TrendPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(TrendPeriod::Daily),
            "weekly" => Some(TrendPeriod::Weekly),
            "monthly" => Some(TrendPeriod::Monthly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Daily => "daily",
            TrendPeriod::Weekly => "weekly",
            TrendPeriod::Monthly => "monthly",
        }
    }
}

/// One trend bucket: period start key and the number of scans in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Daily: `YYYY-MM-DD`; weekly: Monday of the week (`YYYY-MM-DD`);
    /// monthly: `YYYY-MM`
    pub period: String,
    pub count: i64,
}

/// One slice of the breed distribution chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedShare {
    pub breed: String,
    pub count: i64,
    /// `count / total_fetched * 100`, one decimal
    pub percentage: f64,
}

/// One confidence histogram bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub range: String,
    pub count: i64,
}

/// Direction of the scan trend over the last three periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Histogram bin edges: [0.0,0.5), [0.5,0.6), ..., [0.9,1.0] with the last
/// bin closed on both ends so a perfect 1.0 confidence lands in it.
const HISTOGRAM_EDGES: [f64; 7] = [0.0, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Monday-aligned start of the week containing `date`
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// `YYYY-MM` key for the month `months_back` before `today`'s month
fn month_key_back(today: NaiveDate, months_back: u32) -> String {
    let mut year = today.year();
    let mut month = today.month() as i32 - months_back as i32;
    while month <= 0 {
        month += 12;
        year -= 1;
    }
    format!("{:04}-{:02}", year, month)
}

/// First day of the month `months_back` before `today`'s month
pub fn month_start_back(today: NaiveDate, months_back: u32) -> NaiveDate {
    let mut year = today.year();
    let mut month = today.month() as i32 - months_back as i32;
    while month <= 0 {
        month += 12;
        year -= 1;
    }
    NaiveDate::from_ymd_opt(year, month as u32, 1).expect("valid month start")
}

/// Daily trend buckets for the last `days` calendar days ending today.
///
/// Every bucket in the window is initialized to zero before the single pass
/// over the snapshot, so gap days appear explicitly.
pub fn daily_trends(scans: &[ScanRecord], days: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for i in 0..days {
        buckets.insert(today - Duration::days(i as i64), 0);
    }

    for scan in scans {
        let date = scan.timestamp.date_naive();
        if let Some(count) = buckets.get_mut(&date) {
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, count)| TrendPoint {
            period: date.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

/// Weekly trend buckets (Monday-aligned) for the last `weeks` weeks
pub fn weekly_trends(scans: &[ScanRecord], weeks: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let current_week = week_start(today);
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for i in 0..weeks {
        buckets.insert(current_week - Duration::weeks(i as i64), 0);
    }

    for scan in scans {
        let week = week_start(scan.timestamp.date_naive());
        if let Some(count) = buckets.get_mut(&week) {
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, count)| TrendPoint {
            period: date.format("%Y-%m-%d").to_string(),
            count,
        })
        .collect()
}

/// Monthly trend buckets (`YYYY-MM`) for the last `months` months
pub fn monthly_trends(scans: &[ScanRecord], months: u32, today: NaiveDate) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<String, i64> = BTreeMap::new();
    for i in 0..months {
        buckets.insert(month_key_back(today, i), 0);
    }

    for scan in scans {
        let key = scan.timestamp.format("%Y-%m").to_string();
        if let Some(count) = buckets.get_mut(&key) {
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(period, count)| TrendPoint { period, count })
        .collect()
}

/// Trend buckets for the requested period with the original window sizes:
/// 30 days, 12 weeks, or 12 months.
pub fn trends_for_period(
    scans: &[ScanRecord],
    period: TrendPeriod,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    match period {
        TrendPeriod::Daily => daily_trends(scans, 30, today),
        TrendPeriod::Weekly => weekly_trends(scans, 12, today),
        TrendPeriod::Monthly => monthly_trends(scans, 12, today),
    }
}

/// Frequency count per breed over the snapshot, descending by count,
/// truncated to the top 10 for display.
pub fn breed_distribution(scans: &[ScanRecord]) -> Vec<BreedShare> {
    if scans.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&str, i64> = HashMap::new();
    for scan in scans {
        *counts.entry(scan.predicted_breed.as_str()).or_insert(0) += 1;
    }

    let total = scans.len() as f64;
    let mut shares: Vec<BreedShare> = counts
        .into_iter()
        .map(|(breed, count)| BreedShare {
            breed: breed.to_string(),
            count,
            percentage: round1(count as f64 / total * 100.0),
        })
        .collect();

    // Secondary key keeps ordering deterministic across runs
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.breed.cmp(&b.breed)));
    shares.truncate(10);
    shares
}

/// Confidence histogram over fixed bins. Every value lands in exactly one
/// bin, so the bin counts always sum to the input length.
pub fn confidence_histogram(confidences: &[f64]) -> Vec<HistogramBin> {
    let mut counts = [0i64; HISTOGRAM_EDGES.len() - 1];

    for &confidence in confidences {
        for i in 0..counts.len() {
            let last = i == counts.len() - 1;
            let lower = HISTOGRAM_EDGES[i];
            let upper = HISTOGRAM_EDGES[i + 1];
            if (confidence >= lower && confidence < upper) || (last && confidence == upper) {
                counts[i] += 1;
                break;
            }
        }
    }

    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBin {
            range: format!("{:.1}-{:.1}", HISTOGRAM_EDGES[i], HISTOGRAM_EDGES[i + 1]),
            count,
        })
        .collect()
}

/// Count of consecutive calendar days with at least one scan, walking
/// backward from today and stopping at the first gap day.
pub fn scan_streak(scans: &[ScanRecord], today: NaiveDate) -> i64 {
    let scan_dates: HashSet<NaiveDate> = scans.iter().map(|s| s.timestamp.date_naive()).collect();

    let mut streak = 0;
    let mut current = today;
    while scan_dates.contains(&current) {
        streak += 1;
        current -= Duration::days(1);
    }
    streak
}

/// Month-over-month growth percentage, one decimal.
///
/// A previous count of zero yields 100.0 when anything happened this period
/// and 0.0 when nothing did.
pub fn growth_rate(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    round1((current - previous) as f64 / previous as f64 * 100.0)
}

/// Majority vote over the consecutive-pair deltas of the last three periods
pub fn trend_direction(trends: &[TrendPoint]) -> TrendDirection {
    if trends.len() < 2 {
        return TrendDirection::Stable;
    }

    let recent = &trends[trends.len().saturating_sub(3)..];
    let mut increases = 0;
    let mut decreases = 0;
    for pair in recent.windows(2) {
        if pair[1].count > pair[0].count {
            increases += 1;
        } else if pair[1].count < pair[0].count {
            decreases += 1;
        }
    }

    if increases > decreases {
        TrendDirection::Increasing
    } else if decreases > increases {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Scans per hour of day over the snapshot (24 buckets)
pub fn hourly_usage(scans: &[ScanRecord]) -> [i64; 24] {
    let mut hours = [0i64; 24];
    for scan in scans {
        hours[scan.timestamp.hour() as usize] += 1;
    }
    hours
}

/// Daily accuracy proxy: share of scans per day with confidence above 0.8
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyPoint {
    pub date: String,
    pub accuracy: f64,
}

pub fn daily_accuracy(scans: &[ScanRecord]) -> Vec<AccuracyPoint> {
    let mut per_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for scan in scans {
        let entry = per_day.entry(scan.timestamp.date_naive()).or_insert((0, 0));
        entry.0 += 1;
        if scan.confidence_score > 0.8 {
            entry.1 += 1;
        }
    }

    per_day
        .into_iter()
        .map(|(date, (total, accurate))| AccuracyPoint {
            date: date.format("%Y-%m-%d").to_string(),
            accuracy: round1(accurate as f64 / total as f64 * 100.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use pawdentify_common::models::{BreedPrediction, ScanRecord};

    fn scan_at(breed: &str, confidence: f64, ts: &str) -> ScanRecord {
        let mut scan = ScanRecord::new(
            "user_1".to_string(),
            breed.to_string(),
            confidence,
            vec![BreedPrediction {
                breed: breed.to_string(),
                confidence,
            }],
        );
        scan.timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc();
        scan
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn daily_trends_zero_fill_gap_days() {
        let scans = vec![
            scan_at("Beagle", 0.9, "2026-08-27 10:00:00"),
            scan_at("Beagle", 0.8, "2026-08-27 11:00:00"),
            scan_at("Collie", 0.7, "2026-08-25 09:00:00"),
        ];
        let trends = daily_trends(&scans, 4, date("2026-08-27"));

        assert_eq!(trends.len(), 4);
        assert_eq!(trends[0], TrendPoint { period: "2026-08-24".into(), count: 0 });
        assert_eq!(trends[1], TrendPoint { period: "2026-08-25".into(), count: 1 });
        assert_eq!(trends[2], TrendPoint { period: "2026-08-26".into(), count: 0 });
        assert_eq!(trends[3], TrendPoint { period: "2026-08-27".into(), count: 2 });
    }

    #[test]
    fn weekly_trends_are_monday_aligned() {
        // 2026-08-27 is a Thursday; its week starts Monday 2026-08-24
        let scans = vec![
            scan_at("Beagle", 0.9, "2026-08-27 10:00:00"),
            scan_at("Beagle", 0.9, "2026-08-24 00:30:00"),
            scan_at("Beagle", 0.9, "2026-08-23 23:30:00"), // previous week (Sunday)
        ];
        let trends = weekly_trends(&scans, 2, date("2026-08-27"));

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0], TrendPoint { period: "2026-08-17".into(), count: 1 });
        assert_eq!(trends[1], TrendPoint { period: "2026-08-24".into(), count: 2 });
    }

    #[test]
    fn monthly_trends_cross_year_boundary() {
        let scans = vec![
            scan_at("Beagle", 0.9, "2026-01-15 10:00:00"),
            scan_at("Beagle", 0.9, "2025-12-31 23:00:00"),
        ];
        let trends = monthly_trends(&scans, 3, date("2026-02-10"));

        assert_eq!(trends.len(), 3);
        assert_eq!(trends[0], TrendPoint { period: "2025-12".into(), count: 1 });
        assert_eq!(trends[1], TrendPoint { period: "2026-01".into(), count: 1 });
        assert_eq!(trends[2], TrendPoint { period: "2026-02".into(), count: 0 });
    }

    #[test]
    fn breed_distribution_percentages_and_top_10() {
        let mut scans = Vec::new();
        for i in 0..12 {
            scans.push(scan_at(&format!("Breed_{i}"), 0.9, "2026-08-27 10:00:00"));
        }
        scans.push(scan_at("Breed_0", 0.9, "2026-08-27 11:00:00"));

        let shares = breed_distribution(&scans);
        assert_eq!(shares.len(), 10);
        assert_eq!(shares[0].breed, "Breed_0");
        assert_eq!(shares[0].count, 2);

        // percentages of the returned entries never exceed 100
        let total: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!(total <= 100.0 + 1e-9);

        // each entry's count matches a direct recount
        for share in &shares {
            let recount = scans.iter().filter(|s| s.predicted_breed == share.breed).count();
            assert_eq!(share.count, recount as i64);
        }
    }

    #[test]
    fn histogram_counts_sum_to_input_length() {
        let confidences = [0.0, 0.1, 0.49, 0.5, 0.55, 0.69, 0.7, 0.85, 0.95, 1.0];
        let bins = confidence_histogram(&confidences);

        assert_eq!(bins.len(), 6);
        let total: i64 = bins.iter().map(|b| b.count).sum();
        assert_eq!(total, confidences.len() as i64);
    }

    #[test]
    fn histogram_last_bin_is_closed() {
        let bins = confidence_histogram(&[1.0]);
        assert_eq!(bins[5].range, "0.9-1.0");
        assert_eq!(bins[5].count, 1);
    }

    #[test]
    fn histogram_bin_boundaries() {
        let bins = confidence_histogram(&[0.49, 0.5]);
        assert_eq!(bins[0].count, 1); // 0.49 in [0.0, 0.5)
        assert_eq!(bins[1].count, 1); // 0.50 in [0.5, 0.6)
    }

    #[test]
    fn streak_zero_when_today_empty() {
        let scans = vec![scan_at("Beagle", 0.9, "2026-08-26 10:00:00")];
        assert_eq!(scan_streak(&scans, date("2026-08-27")), 0);
    }

    #[test]
    fn streak_equals_window_when_every_day_covered() {
        let scans = vec![
            scan_at("Beagle", 0.9, "2026-08-27 10:00:00"),
            scan_at("Beagle", 0.9, "2026-08-26 10:00:00"),
            scan_at("Beagle", 0.9, "2026-08-25 10:00:00"),
        ];
        assert_eq!(scan_streak(&scans, date("2026-08-27")), 3);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let scans = vec![
            scan_at("Beagle", 0.9, "2026-08-27 10:00:00"),
            scan_at("Beagle", 0.9, "2026-08-25 10:00:00"),
        ];
        assert_eq!(scan_streak(&scans, date("2026-08-27")), 1);
    }

    #[test]
    fn growth_rate_special_cases() {
        assert_eq!(growth_rate(10, 0), 100.0);
        assert_eq!(growth_rate(0, 0), 0.0);
        assert_eq!(growth_rate(15, 10), 50.0);
        assert_eq!(growth_rate(5, 10), -50.0);
    }

    fn points(counts: &[i64]) -> Vec<TrendPoint> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &count)| TrendPoint { period: format!("p{i}"), count })
            .collect()
    }

    #[test]
    fn trend_direction_majority_vote() {
        assert_eq!(trend_direction(&points(&[5, 8, 12])), TrendDirection::Increasing);
        assert_eq!(trend_direction(&points(&[12, 8, 5])), TrendDirection::Decreasing);
        assert_eq!(trend_direction(&points(&[7, 7, 7])), TrendDirection::Stable);
    }

    #[test]
    fn trend_direction_only_considers_last_three() {
        // Earlier periods rise; last three fall
        assert_eq!(
            trend_direction(&points(&[1, 2, 3, 12, 8, 5])),
            TrendDirection::Decreasing
        );
    }

    #[test]
    fn trend_direction_insufficient_data_is_stable() {
        assert_eq!(trend_direction(&points(&[4])), TrendDirection::Stable);
        assert_eq!(trend_direction(&[]), TrendDirection::Stable);
    }

    #[test]
    fn hourly_usage_buckets() {
        let scans = vec![
            scan_at("Beagle", 0.9, "2026-08-27 09:15:00"),
            scan_at("Beagle", 0.9, "2026-08-27 09:45:00"),
            scan_at("Beagle", 0.9, "2026-08-27 23:05:00"),
        ];
        let hours = hourly_usage(&scans);
        assert_eq!(hours[9], 2);
        assert_eq!(hours[23], 1);
        assert_eq!(hours.iter().sum::<i64>(), 3);
    }

    #[test]
    fn daily_accuracy_uses_confidence_proxy() {
        let scans = vec![
            scan_at("Beagle", 0.95, "2026-08-27 09:00:00"),
            scan_at("Beagle", 0.60, "2026-08-27 10:00:00"),
        ];
        let accuracy = daily_accuracy(&scans);
        assert_eq!(accuracy.len(), 1);
        assert_eq!(accuracy[0].accuracy, 50.0);
    }

    #[test]
    fn month_start_back_crosses_years() {
        assert_eq!(month_start_back(date("2026-02-10"), 0), date("2026-02-01"));
        assert_eq!(month_start_back(date("2026-02-10"), 1), date("2026-01-01"));
        assert_eq!(month_start_back(date("2026-02-10"), 2), date("2025-12-01"));
    }
}
