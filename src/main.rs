// SPDX-License-Identifier: MIT

//! Vidshare API Server
//!
//! User-account backend for a media-sharing platform: registration, login,
//! refresh-token rotation, profile updates and channel/watch-history queries.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidshare::{
    config::Config,
    db::FirestoreDb,
    services::{ChannelService, MediaHost, ProfileService, SessionService, TokenService},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Vidshare API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize services
    let media = MediaHost::new(&config.media_host_url);
    tracing::info!(url = %config.media_host_url, "Media host client initialized");

    let tokens = TokenService::new(&config, db.clone());
    let sessions = SessionService::new(db.clone(), tokens.clone(), media.clone(), config.bcrypt_cost);
    let profiles = ProfileService::new(db.clone(), media);
    let channels = ChannelService::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        tokens,
        sessions,
        profiles,
        channels,
    });

    // Build router
    let app = vidshare::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vidshare=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
