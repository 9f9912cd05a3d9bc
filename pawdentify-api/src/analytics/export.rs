//! Export rendering for analytics data
//!
//! Renders scan, breed-frequency, and trend snapshots as CSV or JSON text
//! for the export endpoint. Columns are fixed per data set.

use pawdentify_common::models::ScanRecord;

use super::TrendPoint;
use crate::db::scans::BreedFrequency;

/// Quote a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `timestamp,breed,confidence,is_crossbreed` rows, newest first as fetched
pub fn scans_csv(scans: &[ScanRecord]) -> String {
    let mut out = String::from("timestamp,breed,confidence,is_crossbreed\n");
    for scan in scans {
        out.push_str(&format!(
            "{},{},{},{}\n",
            scan.timestamp.to_rfc3339(),
            csv_field(&scan.predicted_breed),
            scan.confidence_score,
            scan.is_crossbreed,
        ));
    }
    out
}

/// `breed,count,avg_confidence` rows, descending by count as fetched
pub fn breeds_csv(breeds: &[BreedFrequency]) -> String {
    let mut out = String::from("breed,count,avg_confidence\n");
    for b in breeds {
        out.push_str(&format!(
            "{},{},{}\n",
            csv_field(&b.breed),
            b.count,
            b.avg_confidence
        ));
    }
    out
}

/// `period,count` rows, ascending by period start
pub fn trends_csv(trends: &[TrendPoint]) -> String {
    let mut out = String::from("period,count\n");
    for t in trends {
        out.push_str(&format!("{},{}\n", csv_field(&t.period), t.count));
    }
    out
}
