// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account routes: registration, login, profile, legacy token storage.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{Platform, PublicUser, User};
use crate::services::crypto::random_hex_id;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Public user routes (no auth).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/register", post(register))
        .route("/api/user/login", post(login))
        .route("/api/user/auth", post(legacy_auth))
}

/// Protected user routes (auth middleware applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user/profile", get(profile))
        .route("/api/user/tokens", put(update_tokens))
}

// ─── Request/response shapes ─────────────────────────────────

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
struct LegacyAuthRequest {
    #[serde(default)]
    email: String,
}

#[derive(Deserialize)]
struct UpdateTokensRequest {
    platform: String,
    token: String,
}

#[derive(Serialize)]
struct SessionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    user: PublicUser,
    token: String,
}

#[derive(Serialize)]
struct UserResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    user: PublicUser,
}

// ─── Handlers ────────────────────────────────────────────────

/// Register a new account.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    if body.name.is_empty() || body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Please add all fields (name, email, password)".to_string(),
        ));
    }

    if state.db.get_user_by_email(&body.email).await?.is_some() {
        return Err(AppError::BadRequest(
            "User already exists with this email".to_string(),
        ));
    }

    let now = now_rfc3339();
    let user = User {
        id: random_hex_id(),
        name: Some(body.name),
        email: body.email,
        password_hash: Some(hash_password(&body.password)?),
        twitter_token: None,
        linkedin_token: None,
        linkedin_token_expiry: None,
        linkedin_person_urn: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            success: true,
            message: Some("User registered successfully".to_string()),
            user: user.to_public(),
            token,
        }),
    ))
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    }

    // Unknown email and wrong password produce the same response.
    let user = state
        .db
        .get_user_by_email(&body.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;
    Ok(Json(SessionResponse {
        success: true,
        message: Some("Login successful".to_string()),
        user: user.to_public(),
        token,
    }))
}

/// Legacy authenticate-by-email: find or create. Kept for backward
/// compatibility with early clients.
async fn legacy_auth(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LegacyAuthRequest>,
) -> Result<Json<SessionResponse>> {
    if body.email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    let user = match state.db.get_user_by_email(&body.email).await? {
        Some(user) => user,
        None => {
            let now = now_rfc3339();
            let user = User {
                id: random_hex_id(),
                name: None,
                email: body.email,
                password_hash: None,
                twitter_token: None,
                linkedin_token: None,
                linkedin_token_expiry: None,
                linkedin_person_urn: None,
                created_at: now.clone(),
                updated_at: now,
            };
            state.db.upsert_user(&user).await?;
            user
        }
    };

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;
    Ok(Json(SessionResponse {
        success: true,
        message: None,
        user: user.to_public(),
        token,
    }))
}

/// Get the current user's profile.
async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        success: true,
        message: None,
        user: user.to_public(),
    }))
}

/// Store a platform token on the legacy user fields.
async fn update_tokens(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateTokensRequest>,
) -> Result<Json<UserResponse>> {
    let platform: Platform = body
        .platform
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid platform".to_string()))?;

    let mut user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    match platform {
        Platform::Twitter => user.twitter_token = Some(body.token),
        Platform::LinkedIn => user.linkedin_token = Some(body.token),
    }
    user.updated_at = now_rfc3339();
    state.db.upsert_user(&user).await?;

    Ok(Json(UserResponse {
        success: true,
        message: Some(format!("{} token updated successfully", platform)),
        user: user.to_public(),
    }))
}

// ─── Password hashing ────────────────────────────────────────

/// Hash a password with Argon2id using OWASP-recommended parameters.
fn hash_password(password: &str) -> Result<String> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("argon2 params error: {}", e)))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hash error: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(anyhow::anyhow!("verify error: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
