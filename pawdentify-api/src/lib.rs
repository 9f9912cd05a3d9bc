//! pawdentify-api library - dog breed identification backend
//!
//! Axum HTTP service over a SQLite store: breed prediction via an external
//! inference backend, scan and search history, user profiles and preferences,
//! pet vaccination tracking, feedback, and derived analytics.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod analytics;
pub mod api;
pub mod auth;
pub mod classifier;
pub mod crossbreed;
pub mod db;
pub mod error;

use classifier::Classifier;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Breed classifier seam; injected so tests can stub it
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, classifier: Arc<dyn Classifier>) -> Self {
        Self { db, classifier }
    }
}

/// Build application router
///
/// All `/api` routes require the `X-User-ID` identity header via the
/// [`auth::UserId`] extractor, except the public ones: `/api/health`,
/// `/api/search-history/popular`, `/api/community-feedback/testimonials`,
/// and the testimonial vote endpoint. CORS is permissive; the header is the
/// only gate.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/health", get(api::health::readiness_check))
        .route("/predict", post(api::predict::predict))
        .route(
            "/api/scans",
            post(api::scans::create_scan).get(api::scans::list_scans),
        )
        .route("/api/scans/statistics", get(api::scans::scan_statistics))
        .route("/api/scans/:id/feedback", put(api::scans::scan_feedback))
        .route(
            "/api/search-history",
            post(api::searches::create_search).get(api::searches::list_searches),
        )
        .route("/api/search-history/recent", get(api::searches::recent_breeds))
        .route("/api/search-history/popular", get(api::searches::popular_breeds))
        .route(
            "/api/search-history/:id/interaction",
            put(api::searches::update_interaction),
        )
        .route(
            "/api/preferences",
            get(api::preferences::get_preferences).put(api::preferences::update_preferences),
        )
        .route("/api/users", post(api::users::signup))
        .route(
            "/api/users/me",
            get(api::users::get_me).put(api::users::update_me),
        )
        .route(
            "/api/users/favorites/:breed",
            post(api::users::add_favorite).delete(api::users::remove_favorite),
        )
        .route("/api/analytics/dashboard", get(api::analytics::dashboard))
        .route("/api/analytics/breeds", get(api::analytics::breeds))
        .route("/api/analytics/trends", get(api::analytics::trends))
        .route("/api/analytics/export", post(api::analytics::export_data))
        .route("/api/dashboard", get(api::dashboard::dashboard))
        .route(
            "/api/pets",
            post(api::pets::create_pet).get(api::pets::list_pets),
        )
        .route(
            "/api/pets/:id",
            get(api::pets::get_pet)
                .put(api::pets::update_pet)
                .delete(api::pets::delete_pet),
        )
        .route(
            "/api/vaccinations",
            post(api::vaccinations::create_vaccination).get(api::vaccinations::list_vaccinations),
        )
        .route("/api/vaccinations/upcoming", get(api::vaccinations::upcoming))
        .route("/api/vaccinations/overdue", get(api::vaccinations::overdue))
        .route("/api/vaccinations/statistics", get(api::vaccinations::statistics))
        .route(
            "/api/vaccinations/:id/status",
            put(api::vaccinations::update_status),
        )
        .route(
            "/api/feedback",
            post(api::feedback::create_feedback).get(api::feedback::list_feedback),
        )
        .route("/api/feedback/statistics", get(api::feedback::feedback_statistics))
        .route("/api/scan-feedback", post(api::feedback::scan_feedback))
        .route(
            "/api/community-feedback",
            post(api::community::create_community_feedback),
        )
        .route(
            "/api/community-feedback/testimonials",
            get(api::community::testimonials),
        )
        .route(
            "/api/community-feedback/user",
            get(api::community::list_user_feedback),
        )
        .route("/api/community-feedback/:id/vote", post(api::community::vote))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
