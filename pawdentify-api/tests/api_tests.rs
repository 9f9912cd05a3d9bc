//! Integration tests for the pawdentify-api HTTP surface
//!
//! Tests cover:
//! - Health and readiness endpoints (no auth required)
//! - Identity header enforcement (401 without X-User-ID)
//! - Scan history creation, listing, feedback idempotence, statistics
//! - Lazy preference creation and typed updates
//! - Idempotent user signup and favorites
//! - Prediction flow with a stubbed classifier, including best-effort persist
//! - Analytics trends and export
//! - Community testimonial moderation gate and vote tallies

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pawdentify_api::classifier::{Classifier, ClassifierError};
use pawdentify_api::{build_router, AppState};
use pawdentify_common::models::BreedPrediction;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Deterministic classifier stub; `available: false` simulates a down model
struct StubClassifier {
    predictions: Vec<BreedPrediction>,
    available: bool,
}

impl StubClassifier {
    fn confident() -> Self {
        Self {
            predictions: vec![
                BreedPrediction { breed: "Golden_retriever".to_string(), confidence: 0.92 },
                BreedPrediction { breed: "Labrador".to_string(), confidence: 0.04 },
                BreedPrediction { breed: "Beagle".to_string(), confidence: 0.02 },
            ],
            available: true,
        }
    }

    fn ambiguous() -> Self {
        Self {
            predictions: vec![
                BreedPrediction { breed: "Beagle".to_string(), confidence: 0.55 },
                BreedPrediction { breed: "Basset_hound".to_string(), confidence: 0.40 },
            ],
            available: true,
        }
    }

    fn down() -> Self {
        Self {
            predictions: Vec::new(),
            available: false,
        }
    }
}

#[async_trait::async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, _image_bytes: &[u8]) -> Result<Vec<BreedPrediction>, ClassifierError> {
        if !self.available {
            return Err(ClassifierError::ModelUnavailable);
        }
        Ok(self.predictions.clone())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

async fn setup_app_with(classifier: StubClassifier) -> axum::Router {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    pawdentify_common::db::init::create_schema(&pool).await.unwrap();
    let state = AppState::new(pool, Arc::new(classifier));
    build_router(state)
}

async fn setup_app() -> axum::Router {
    setup_app_with(StubClassifier::confident()).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-User-ID", "user_test")
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-User-ID", "user_test")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// 1x1 white PNG for multipart uploads
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
    0xFF, 0xFF, 0x3F, 0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC, 0xCC, 0x59, 0xE7, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

fn multipart_image_request(uri: &str) -> Request<Body> {
    let boundary = "pawtestboundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; \
             filename=\"dog.png\"\r\ncontent-type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(TINY_PNG);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn signup(app: &axum::Router) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({ "email": "test@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

// =============================================================================
// Health endpoints
// =============================================================================

#[tokio::test]
async fn health_endpoint_no_auth_required() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "pawdentify-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn readiness_reports_degraded_model() {
    let app = setup_app_with(StubClassifier::down()).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["model"], "unavailable");
}

// =============================================================================
// Identity enforcement
// =============================================================================

#[tokio::test]
async fn missing_identity_header_is_401() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/scans")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn popular_breeds_is_public() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/search-history/popular")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Scan history
// =============================================================================

#[tokio::test]
async fn scan_create_list_and_statistics() {
    let app = setup_app().await;
    signup(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({
                "predicted_breed": "Beagle",
                "confidence_score": 0.9,
                "top_predictions": [
                    { "breed": "Beagle", "confidence": 0.9 },
                    { "breed": "Basset_hound", "confidence": 0.05 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get("/api/scans")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["predicted_breed"], "Beagle");

    // counter incremented in the same transaction
    let response = app.clone().oneshot(get("/api/users/me")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_scans"], 1);

    let response = app.oneshot(get("/api/scans/statistics")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_scans"], 1);
    assert!((body["avg_confidence"].as_f64().unwrap() - 0.9).abs() < 1e-9);
}

#[tokio::test]
async fn scan_confidence_out_of_range_is_400() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({ "predicted_breed": "Beagle", "confidence_score": 1.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_top_predictions_must_be_sorted_descending() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({
                "predicted_breed": "Beagle",
                "confidence_score": 0.9,
                "top_predictions": [
                    { "breed": "Basset_hound", "confidence": 0.05 },
                    { "breed": "Beagle", "confidence": 0.9 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // per-entry confidences are range-checked too
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({
                "predicted_breed": "Beagle",
                "confidence_score": 0.9,
                "top_predictions": [
                    { "breed": "Beagle", "confidence": 1.9 }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_feedback_is_idempotent() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({ "predicted_breed": "Beagle", "confidence_score": 0.9 }),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let scan_id = body["scan_id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/scans/{scan_id}/feedback"),
                json!({ "feedback": "incorrect", "confirmed_breed": "Basset_hound" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/api/scans")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["user_feedback"], "incorrect");
    assert_eq!(body[0]["user_confirmed_breed"], "Basset_hound");
}

#[tokio::test]
async fn feedback_on_unknown_scan_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/scans/00000000-0000-0000-0000-000000000000/feedback",
            json!({ "feedback": "correct" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Preferences
// =============================================================================

#[tokio::test]
async fn preferences_created_lazily_with_defaults() {
    let app = setup_app().await;

    let response = app.clone().oneshot(get("/api/preferences")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["email_notifications"], true);
    assert_eq!(body["theme"], "light");
    assert_eq!(body["preferred_language"], "en");
}

#[tokio::test]
async fn preferences_typed_update_rejects_unknown_keys() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/preferences",
            json!({ "theme": "dark" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["theme"], "dark");
    assert_eq!(body["email_notifications"], true);

    // unknown key rejected by the typed update struct
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/preferences",
            json!({ "theme": "dark", "is_admin": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn signup_is_idempotent() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({ "email": "a@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({ "email": "other@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["email"], "a@example.com");
}

#[tokio::test]
async fn favorites_add_and_remove() {
    let app = setup_app().await;
    signup(&app).await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/users/favorites/Beagle", json!({})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["added"], true);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/users/favorites/Beagle", json!({})))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["added"], false);

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/users/favorites/Beagle")
        .header("X-User-ID", "user_test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["removed"], true);
}

// =============================================================================
// Prediction
// =============================================================================

#[tokio::test]
async fn predict_returns_ranked_predictions() {
    let app = setup_app().await;

    let response = app
        .oneshot(multipart_image_request("/predict"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["predicted_breed"], "Golden_retriever");
    assert_eq!(body["is_crossbreed"], false);
    assert!(body["crossbreed_analysis"].is_null());
    assert_eq!(body["top_predictions"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn predict_flags_crossbreed_and_persists_scan() {
    let app = setup_app_with(StubClassifier::ambiguous()).await;
    signup(&app).await;

    let response = app
        .clone()
        .oneshot(multipart_image_request("/predict?user_id=user_test"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["is_crossbreed"], true);
    assert_eq!(
        body["crossbreed_analysis"]["suggested_mix"],
        "Beagle x Basset_hound Mix"
    );

    // scan landed in history
    let response = app.oneshot(get("/api/scans")).await.unwrap();
    let scans = extract_json(response.into_body()).await;
    assert_eq!(scans.as_array().unwrap().len(), 1);
    assert_eq!(scans[0]["predicted_breed"], "Beagle");
    assert_eq!(scans[0]["is_crossbreed"], true);
}

#[tokio::test]
async fn predict_with_model_down_is_503() {
    let app = setup_app_with(StubClassifier::down()).await;

    let response = app
        .oneshot(multipart_image_request("/predict"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}

// =============================================================================
// Analytics
// =============================================================================

#[tokio::test]
async fn trends_rejects_unknown_period() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/analytics/trends?period=hourly"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/analytics/trends?period=weekly"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["period"], "weekly");
    assert_eq!(body["trends"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn dashboard_includes_histogram_and_insights() {
    let app = setup_app().await;
    signup(&app).await;

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({ "predicted_breed": "Beagle", "confidence_score": 0.95 }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/api/analytics/dashboard?days=30"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_scans"], 1);
    assert_eq!(body["scan_streak"], 1);
    assert_eq!(body["confidence_histogram"].as_array().unwrap().len(), 6);
    assert_eq!(body["daily_trends"].as_array().unwrap().len(), 30);
    assert_eq!(body["insights"]["favorite_breed"], "Beagle");
}

#[tokio::test]
async fn export_csv_has_expected_header() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/analytics/export?format=csv&data_type=scans",
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("timestamp,breed,confidence,is_crossbreed"));
}

// =============================================================================
// Scan feedback shortcut
// =============================================================================

#[tokio::test]
async fn scan_feedback_endpoint_files_breed_correction() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scans",
            json!({ "predicted_breed": "Beagle", "confidence_score": 0.9 }),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let scan_id = body["scan_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/scan-feedback",
            json!({
                "scan_id": scan_id,
                "feedback": "incorrect",
                "correct_breed": "Basset_hound"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // verdict recorded on the scan
    let response = app.clone().oneshot(get("/api/scans")).await.unwrap();
    let scans = extract_json(response.into_body()).await;
    assert_eq!(scans[0]["user_feedback"], "incorrect");

    // correction filed in the feedback queue
    let response = app.oneshot(get("/api/feedback")).await.unwrap();
    let feedback = extract_json(response.into_body()).await;
    assert_eq!(feedback.as_array().unwrap().len(), 1);
    assert_eq!(feedback[0]["feedback_type"], "breed_correction");
    assert_eq!(feedback[0]["corrected_breed"], "Basset_hound");
    // original prediction looked up from the scan itself
    assert_eq!(feedback[0]["predicted_breed"], "Beagle");
    assert!((feedback[0]["confidence_score"].as_f64().unwrap() - 0.9).abs() < 1e-9);
}

// =============================================================================
// Community testimonials
// =============================================================================

#[tokio::test]
async fn community_feedback_submission_awaits_moderation() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/community-feedback",
            json!({
                "display_name": "Sam",
                "title": "Great app",
                "content": "Identified my rescue in seconds",
                "rating": 5,
                "favorite_features": ["breed scanner"]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    assert_eq!(created["is_approved"], false);
    assert_eq!(created["total_votes"], 0);

    // visible to its author
    let response = app
        .clone()
        .oneshot(get("/api/community-feedback/user"))
        .await
        .unwrap();
    let own = extract_json(response.into_body()).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    assert_eq!(own[0]["title"], "Great app");

    // not yet in the public testimonial listing
    let request = Request::builder()
        .method("GET")
        .uri("/api/community-feedback/testimonials")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = extract_json(response.into_body()).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn community_feedback_rejects_bad_rating() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/community-feedback",
            json!({
                "display_name": "Sam",
                "title": "Meh",
                "content": "Six stars",
                "rating": 6
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn community_feedback_vote_tallies() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/community-feedback",
            json!({
                "display_name": "Sam",
                "title": "Great app",
                "content": "Identified my rescue in seconds",
                "rating": 5
            }),
        ))
        .await
        .unwrap();
    let created = extract_json(response.into_body()).await;
    let feedback_id = created["guid"].as_str().unwrap().to_string();

    for is_helpful in ["true", "true", "false"] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/community-feedback/{feedback_id}/vote?is_helpful={is_helpful}"),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/community-feedback/user"))
        .await
        .unwrap();
    let own = extract_json(response.into_body()).await;
    assert_eq!(own[0]["helpful_votes"], 2);
    assert_eq!(own[0]["total_votes"], 3);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/community-feedback/00000000-0000-0000-0000-000000000000/vote?is_helpful=true",
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Pets and vaccinations
// =============================================================================

#[tokio::test]
async fn pet_lifecycle_with_soft_delete() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/pets",
            json!({ "name": "Rex", "breed": "Beagle" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let pet = extract_json(response.into_body()).await;
    let pet_id = pet["guid"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/pets/{pet_id}"),
            json!({ "weight_lbs": 24.5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pet = extract_json(response.into_body()).await;
    assert_eq!(pet["weight_lbs"], 24.5);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/pets/{pet_id}"))
        .header("X-User-ID", "user_test")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/pets")).await.unwrap();
    let pets = extract_json(response.into_body()).await;
    assert!(pets.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn vaccination_requires_owned_pet() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/vaccinations",
            json!({
                "pet_id": "00000000-0000-0000-0000-000000000000",
                "vaccine_name": "Rabies",
                "due_date": "2026-10-01T00:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vaccination_statistics_roll_up() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/pets",
            json!({ "name": "Rex", "breed": "Beagle" }),
        ))
        .await
        .unwrap();
    let pet = extract_json(response.into_body()).await;
    let pet_id = pet["guid"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/vaccinations",
            json!({
                "pet_id": pet_id,
                "vaccine_name": "Rabies",
                "due_date": "2030-01-01T00:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/api/vaccinations/statistics")).await.unwrap();
    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["upcoming"], 1);
    assert_eq!(stats["completed"], 0);
}
