// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Platform credential routes. All require authentication.
//!
//! Responses never carry secret material; reads return the redacted
//! projection only.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Platform, RedactedCredentials};
use crate::services::credentials::{LinkedInInput, TwitterInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/credentials", get(get_credentials))
        .route("/api/credentials/linkedin", post(save_linkedin))
        .route("/api/credentials/twitter", post(save_twitter))
        .route("/api/credentials/{platform}", delete(disable_platform))
}

#[derive(Serialize)]
struct CredentialsResponse {
    success: bool,
    credentials: RedactedCredentials,
}

#[derive(Serialize)]
struct SavedResponse {
    success: bool,
    message: String,
    platform: Platform,
}

/// Get the caller's platform credentials (redacted view). Creates the
/// empty credential document lazily for new users.
async fn get_credentials(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CredentialsResponse>> {
    let creds = state.credential_store.get_or_create(&auth.user_id).await?;

    Ok(Json(CredentialsResponse {
        success: true,
        credentials: RedactedCredentials::from_stored(&creds),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveLinkedInRequest {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    profile_id: String,
    #[serde(default)]
    profile_name: String,
}

/// Save LinkedIn credentials.
async fn save_linkedin(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SaveLinkedInRequest>,
) -> Result<Json<SavedResponse>> {
    if body.client_id.is_empty() {
        return Err(AppError::BadRequest(
            "LinkedIn Client ID is required".to_string(),
        ));
    }

    state
        .credential_store
        .set_linkedin(
            &auth.user_id,
            LinkedInInput {
                client_id: body.client_id,
                client_secret: body.client_secret,
                access_token: body.access_token,
                refresh_token: body.refresh_token,
                expires_at: body.expires_at,
                profile_id: body.profile_id,
                profile_name: body.profile_name,
            },
        )
        .await?;

    Ok(Json(SavedResponse {
        success: true,
        message: "LinkedIn credentials saved successfully".to_string(),
        platform: Platform::LinkedIn,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveTwitterRequest {
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    api_secret: String,
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    access_secret: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    twitter_user_id: String,
}

/// Save Twitter credentials. All four API credential fields are required.
async fn save_twitter(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SaveTwitterRequest>,
) -> Result<Json<SavedResponse>> {
    if body.api_key.is_empty()
        || body.api_secret.is_empty()
        || body.access_token.is_empty()
        || body.access_secret.is_empty()
    {
        return Err(AppError::BadRequest(
            "All Twitter API credentials are required (API Key, API Secret, Access Token, Access Secret)"
                .to_string(),
        ));
    }

    state
        .credential_store
        .set_twitter(
            &auth.user_id,
            TwitterInput {
                api_key: body.api_key,
                api_secret: body.api_secret,
                access_token: body.access_token,
                access_secret: body.access_secret,
                username: body.username,
                user_id: body.twitter_user_id,
            },
        )
        .await?;

    Ok(Json(SavedResponse {
        success: true,
        message: "Twitter credentials saved successfully".to_string(),
        platform: Platform::Twitter,
    }))
}

/// Disable a platform: flips `enabled` off and clears token-class secrets,
/// keeping API keys and profile metadata.
async fn disable_platform(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(platform): Path<String>,
) -> Result<Json<SavedResponse>> {
    let platform: Platform = platform
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid platform".to_string()))?;

    state.credential_store.disable(&auth.user_id, platform).await?;

    Ok(Json(SavedResponse {
        success: true,
        message: format!("{} disabled successfully", platform),
        platform,
    }))
}
