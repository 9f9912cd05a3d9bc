//! pawdentify-api - dog breed identification backend service
//!
//! Startup order: tracing, version banner, config resolution, data folder,
//! database pool + schema, classifier construction + availability probe,
//! router, serve. A down model backend does not prevent startup; prediction
//! endpoints answer 503 until it comes back.

use std::sync::Arc;

use anyhow::Result;
use pawdentify_api::{build_router, AppState};
use pawdentify_common::config::Config;
use pawdentify_common::db::init_database;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Pawdentify API (pawdentify-api) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::resolve(std::env::args().nth(1).as_deref())?;
    config.ensure_data_folder()?;
    info!("Data folder: {}", config.data_folder.display());

    let db_path = config.database_path();
    let pool = init_database(&db_path).await?;
    info!("Database ready at {}", db_path.display());

    let classifier =
        pawdentify_api::classifier::RemoteClassifier::new(&config.model_url, &config.labels_path)?;
    info!("Loaded {} breed labels", classifier.num_classes());

    classifier.probe().await;
    if !pawdentify_api::classifier::Classifier::is_available(&classifier) {
        warn!("Model service not answering; prediction endpoints will return 503");
    }

    let state = AppState::new(pool, Arc::new(classifier));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("pawdentify-api listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
