//! Data models for the persisted collections
//!
//! All records are keyed by a uuid v4 `guid` (stored as TEXT) plus the opaque
//! user identifier supplied by the authentication layer. Timestamps are UTC
//! and stored as RFC3339 text. List-valued fields are stored as JSON text
//! columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Device type recorded with scans and searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    #[default]
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Unknown => "unknown",
        }
    }

    /// Parse from stored text; anything unrecognized maps to Unknown
    pub fn parse(s: &str) -> Self {
        match s {
            "mobile" => DeviceType::Mobile,
            "tablet" => DeviceType::Tablet,
            "desktop" => DeviceType::Desktop,
            _ => DeviceType::Unknown,
        }
    }
}

/// User verdict on a scan prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanFeedback {
    Correct,
    Incorrect,
    PartiallyCorrect,
}

impl ScanFeedback {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFeedback::Correct => "correct",
            ScanFeedback::Incorrect => "incorrect",
            ScanFeedback::PartiallyCorrect => "partially_correct",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "correct" => Some(ScanFeedback::Correct),
            "incorrect" => Some(ScanFeedback::Incorrect),
            "partially_correct" => Some(ScanFeedback::PartiallyCorrect),
            _ => None,
        }
    }
}

/// Vaccination scheduling status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VaccinationStatus {
    Completed,
    Overdue,
    #[default]
    Upcoming,
    Scheduled,
}

impl VaccinationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VaccinationStatus::Completed => "completed",
            VaccinationStatus::Overdue => "overdue",
            VaccinationStatus::Upcoming => "upcoming",
            VaccinationStatus::Scheduled => "scheduled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(VaccinationStatus::Completed),
            "overdue" => Some(VaccinationStatus::Overdue),
            "upcoming" => Some(VaccinationStatus::Upcoming),
            "scheduled" => Some(VaccinationStatus::Scheduled),
            _ => None,
        }
    }
}

/// Category of a user feedback submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    #[default]
    General,
    BugReport,
    FeatureRequest,
    BreedCorrection,
    AppReview,
}

impl FeedbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::General => "general",
            FeedbackType::BugReport => "bug_report",
            FeedbackType::FeatureRequest => "feature_request",
            FeedbackType::BreedCorrection => "breed_correction",
            FeedbackType::AppReview => "app_review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(FeedbackType::General),
            "bug_report" => Some(FeedbackType::BugReport),
            "feature_request" => Some(FeedbackType::FeatureRequest),
            "breed_correction" => Some(FeedbackType::BreedCorrection),
            "app_review" => Some(FeedbackType::AppReview),
            _ => None,
        }
    }
}

/// Processing status of a feedback submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    Pending,
    Reviewed,
    InProgress,
    Resolved,
    Closed,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Reviewed => "reviewed",
            FeedbackStatus::InProgress => "in_progress",
            FeedbackStatus::Resolved => "resolved",
            FeedbackStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FeedbackStatus::Pending),
            "reviewed" => Some(FeedbackStatus::Reviewed),
            "in_progress" => Some(FeedbackStatus::InProgress),
            "resolved" => Some(FeedbackStatus::Resolved),
            "closed" => Some(FeedbackStatus::Closed),
            _ => None,
        }
    }
}

/// One (breed, confidence) entry of a ranked prediction list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedPrediction {
    pub breed: String,
    pub confidence: f64,
}

/// User profile, created at signup. `total_scans` is a monotonic counter
/// incremented in the same transaction as each scan insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub guid: Uuid,
    pub clerk_user_id: String,
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub total_scans: i64,
    pub favorite_breeds: Vec<String>,
    pub subscription_status: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(clerk_user_id: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            guid: Uuid::new_v4(),
            clerk_user_id,
            email,
            username: None,
            first_name: None,
            last_name: None,
            profile_image_url: None,
            total_scans: 0,
            favorite_breeds: Vec::new(),
            subscription_status: "free".to_string(),
            created_at: now,
            last_login: now,
        }
    }
}

/// Record of one image-classification scan. Created on prediction, mutated
/// once later when the user submits feedback, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub guid: Uuid,
    pub user_id: String,
    pub predicted_breed: String,
    pub confidence_score: f64,
    pub is_crossbreed: bool,
    pub secondary_breed: Option<String>,
    /// Ranked descending by confidence; non-empty when present
    pub top_predictions: Vec<BreedPrediction>,
    pub image_hash: Option<String>,
    pub device_type: DeviceType,
    pub timestamp: DateTime<Utc>,
    pub user_feedback: Option<ScanFeedback>,
    pub user_confirmed_breed: Option<String>,
}

impl ScanRecord {
    pub fn new(
        user_id: String,
        predicted_breed: String,
        confidence_score: f64,
        top_predictions: Vec<BreedPrediction>,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            user_id,
            predicted_breed,
            confidence_score,
            is_crossbreed: false,
            secondary_breed: None,
            top_predictions,
            image_hash: None,
            device_type: DeviceType::Unknown,
            timestamp: Utc::now(),
            user_feedback: None,
            user_confirmed_breed: None,
        }
    }
}

/// Record of one breed search in the care guides section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRecord {
    pub guid: Uuid,
    pub user_id: String,
    pub breed_searched: String,
    pub search_query: String,
    pub search_timestamp: DateTime<Utc>,
    pub device_type: DeviceType,
    pub time_spent_viewing: Option<i64>,
    pub sections_viewed: Vec<String>,
    pub is_bookmarked: bool,
    pub user_rating: Option<i64>,
}

impl SearchRecord {
    pub fn new(user_id: String, breed_searched: String, search_query: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            user_id,
            breed_searched,
            search_query,
            search_timestamp: Utc::now(),
            device_type: DeviceType::Unknown,
            time_spent_viewing: None,
            sections_viewed: Vec::new(),
            is_bookmarked: false,
            user_rating: None,
        }
    }
}

/// Per-user preferences. Exactly one row per user (UNIQUE user_id);
/// created lazily with these defaults on first read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub email_notifications: bool,
    pub scan_reminders: bool,
    pub breed_updates: bool,
    pub newsletter: bool,
    pub save_scan_history: bool,
    pub save_search_history: bool,
    pub allow_analytics: bool,
    pub public_profile: bool,
    pub preferred_language: String,
    pub measurement_units: String,
    pub theme: String,
    pub favorite_breeds: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    pub fn defaults_for(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.to_string(),
            email_notifications: true,
            scan_reminders: false,
            breed_updates: true,
            newsletter: false,
            save_scan_history: true,
            save_search_history: true,
            allow_analytics: true,
            public_profile: false,
            preferred_language: "en".to_string(),
            measurement_units: "imperial".to_string(),
            theme: "light".to_string(),
            favorite_breeds: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Pet profile for vaccination tracking and care management
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub guid: Uuid,
    pub user_id: String,
    pub name: String,
    pub breed: String,
    pub secondary_breed: Option<String>,
    pub age_years: Option<i64>,
    pub age_months: Option<i64>,
    pub weight_lbs: Option<f64>,
    pub color: Option<String>,
    pub microchip_id: Option<String>,
    pub veterinarian_name: Option<String>,
    pub veterinarian_contact: Option<String>,
    pub allergies: Vec<String>,
    pub medical_conditions: Vec<String>,
    pub special_notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    pub fn new(user_id: String, name: String, breed: String) -> Self {
        let now = Utc::now();
        Self {
            guid: Uuid::new_v4(),
            user_id,
            name,
            breed,
            secondary_breed: None,
            age_years: None,
            age_months: None,
            weight_lbs: None,
            color: None,
            microchip_id: None,
            veterinarian_name: None,
            veterinarian_contact: None,
            allergies: Vec::new(),
            medical_conditions: Vec::new(),
            special_notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Individual vaccination record for a pet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub guid: Uuid,
    pub user_id: String,
    pub pet_id: Uuid,
    pub vaccine_name: String,
    pub vaccine_type: String,
    pub manufacturer: Option<String>,
    pub lot_number: Option<String>,
    pub administered_date: Option<DateTime<Utc>>,
    pub due_date: DateTime<Utc>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub status: VaccinationStatus,
    pub is_core_vaccine: bool,
    pub frequency_months: i64,
    pub veterinarian_name: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_contact: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User feedback / support request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub guid: Uuid,
    pub user_id: String,
    pub feedback_type: FeedbackType,
    pub subject: String,
    pub message: String,
    pub app_version: Option<String>,
    pub device_type: DeviceType,
    pub page_url: Option<String>,
    pub scan_id: Option<String>,
    pub predicted_breed: Option<String>,
    pub corrected_breed: Option<String>,
    pub confidence_score: Option<f64>,
    pub priority: String,
    pub status: FeedbackStatus,
    pub rating: Option<i64>,
    pub follow_up_requested: bool,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Community testimonial. Submitted by users, hidden until a moderator sets
/// `is_approved`; helpful-vote tallies are server-owned counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityFeedback {
    pub guid: Uuid,
    pub user_id: String,
    pub display_name: String,
    pub user_location: Option<String>,
    pub title: String,
    pub content: String,
    /// Star rating, 1-5
    pub rating: i64,
    pub usage_duration: Option<String>,
    pub favorite_features: Vec<String>,
    pub scan_count: Option<i64>,
    pub is_approved: bool,
    pub is_featured: bool,
    pub moderated_by: Option<String>,
    pub helpful_votes: i64,
    pub total_votes: i64,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl CommunityFeedback {
    pub fn new(
        user_id: String,
        display_name: String,
        title: String,
        content: String,
        rating: i64,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            user_id,
            display_name,
            user_location: None,
            title,
            content,
            rating,
            usage_duration: None,
            favorite_features: Vec::new(),
            scan_count: None,
            is_approved: false,
            is_featured: false,
            moderated_by: None,
            helpful_votes: 0,
            total_votes: 0,
            submitted_at: Utc::now(),
            approved_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_round_trips_through_text() {
        for dt in [
            DeviceType::Mobile,
            DeviceType::Tablet,
            DeviceType::Desktop,
            DeviceType::Unknown,
        ] {
            assert_eq!(DeviceType::parse(dt.as_str()), dt);
        }
        assert_eq!(DeviceType::parse("toaster"), DeviceType::Unknown);
    }

    #[test]
    fn scan_feedback_rejects_unknown_values() {
        assert_eq!(
            ScanFeedback::parse("partially_correct"),
            Some(ScanFeedback::PartiallyCorrect)
        );
        assert_eq!(ScanFeedback::parse("maybe"), None);
    }

    #[test]
    fn preferences_defaults_match_signup_contract() {
        let prefs = UserPreferences::defaults_for("user_2abc123");
        assert!(prefs.email_notifications);
        assert!(!prefs.scan_reminders);
        assert!(prefs.save_scan_history);
        assert_eq!(prefs.preferred_language, "en");
        assert_eq!(prefs.theme, "light");
        assert!(prefs.favorite_breeds.is_empty());
    }

    #[test]
    fn community_feedback_starts_unapproved_with_zero_votes() {
        let fb = CommunityFeedback::new(
            "user_1".to_string(),
            "Sam".to_string(),
            "Great app".to_string(),
            "Identified my rescue in seconds".to_string(),
            5,
        );
        assert!(!fb.is_approved);
        assert!(!fb.is_featured);
        assert_eq!(fb.helpful_votes, 0);
        assert_eq!(fb.total_votes, 0);
        assert!(fb.approved_at.is_none());
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&FeedbackType::BugReport).unwrap(),
            "\"bug_report\""
        );
        assert_eq!(
            serde_json::to_string(&ScanFeedback::PartiallyCorrect).unwrap(),
            "\"partially_correct\""
        );
    }
}
