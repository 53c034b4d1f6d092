// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Socialcast API Server
//!
//! Publishes text posts to LinkedIn and Twitter on behalf of registered
//! users, with per-user platform credentials stored encrypted at rest.

use socialcast::{
    config::Config,
    db::FirestoreDb,
    services::{
        twitter::TwitterApiCredentials, CredentialCipher, CredentialStore, LinkedInClient,
        PublishService, TwitterClient,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Socialcast API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Credential store with encryption at rest
    let cipher = CredentialCipher::new(&config.credential_key);
    let credential_store = CredentialStore::new(db.clone(), cipher);
    tracing::info!("Credential store initialized");

    // Platform clients
    let linkedin = LinkedInClient::new();
    let twitter = TwitterClient::new();

    let twitter_fallback = config.twitter_fallback.as_ref().map(|f| {
        tracing::info!("Legacy single-tenant Twitter credentials present");
        TwitterApiCredentials {
            api_key: f.api_key.clone(),
            api_secret: f.api_secret.clone(),
            access_token: f.access_token.clone(),
            access_secret: f.access_secret.clone(),
        }
    });

    let publisher = PublishService::new(
        db.clone(),
        credential_store.clone(),
        linkedin.clone(),
        twitter,
        format!("{}/auth/linkedin/login", config.base_url),
        twitter_fallback,
    );

    // Process-scoped connection cache (debug visibility, not authoritative)
    let connection_cache = Arc::new(dashmap::DashMap::new());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        credential_store,
        linkedin,
        publisher,
        connection_cache,
    });

    // Build router
    let app = socialcast::routes::create_router(state);

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
                .add_directive("socialcast=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
