// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use socialcast::config::Config;
use socialcast::db::FirestoreDb;
use socialcast::routes::create_router;
use socialcast::services::{
    CredentialCipher, CredentialStore, LinkedInClient, PublishService, TwitterClient,
};
use socialcast::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app over a given database (mock or emulator).
///
/// Platform clients point at a closed local port, so any unexpected
/// outbound call fails immediately instead of reaching a real API.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let linkedin =
        LinkedInClient::new().with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
    let twitter = TwitterClient::new().with_base_url("http://127.0.0.1:9");
    create_test_app_with_clients(db, linkedin, twitter)
}

/// Create a test app with explicit platform clients (e.g. pointed at a
/// local stub server).
#[allow(dead_code)]
pub fn create_test_app_with_clients(
    db: FirestoreDb,
    linkedin: LinkedInClient,
    twitter: TwitterClient,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();

    let cipher = CredentialCipher::new(&config.credential_key);
    let credential_store = CredentialStore::new(db.clone(), cipher);

    let publisher = PublishService::new(
        db.clone(),
        credential_store.clone(),
        linkedin.clone(),
        twitter,
        format!("{}/auth/linkedin/login", config.base_url),
        None,
    );

    let state = Arc::new(AppState {
        config,
        db,
        credential_store,
        linkedin,
        publisher,
        connection_cache: Arc::new(dashmap::DashMap::new()),
    });

    (create_router(state.clone()), state)
}

/// Test helper to create a JWT token (mirrors middleware/auth.rs logic).
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    socialcast::middleware::auth::create_jwt(user_id, signing_key).expect("Failed to create JWT")
}
