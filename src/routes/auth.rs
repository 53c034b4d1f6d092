// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn OAuth authentication routes.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{PublicUser, User};
use crate::services::connections::{self, ConnectionInfo};
use crate::services::crypto::random_hex_id;
use crate::services::linkedin::token_expired;
use crate::time_utils::{format_utc_rfc3339, now_rfc3339};
use crate::AppState;

use hmac::{Hmac, Mac};
use sha2::Sha256;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Public OAuth routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/linkedin/login", get(auth_start))
        .route("/auth/linkedin/callback", get(auth_callback))
        .route("/auth/linkedin/tokens", get(debug_tokens))
}

/// OAuth routes that require a session (auth middleware applied in
/// routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/linkedin/token-status", get(token_status))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to redirect back to after OAuth completes.
    /// If not provided, uses FRONTEND_URL env var.
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Start OAuth flow - redirect to LinkedIn authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let oauth_state = sign_state(&frontend_url, &state.config.oauth_state_key)?;

    let auth_url = state.linkedin.authorization_url(
        &state.config.linkedin_client_id,
        &state.config.linkedin_redirect_uri(),
        &oauth_state,
    )?;

    tracing::info!(
        client_id = %state.config.linkedin_client_id,
        frontend_url = %frontend_url,
        "Starting OAuth flow, redirecting to LinkedIn"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Error body for OAuth failures, carrying the upstream code verbatim.
#[derive(Serialize)]
struct OAuthErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    message: String,
}

#[derive(Serialize)]
struct CallbackResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<PublicUser>,
    /// Session JWT for the linked account
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(rename = "expiresAt")]
    expires_at: String,
}

/// OAuth callback - exchange code for a token, link the user, store it.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    // OAuth errors are terminal for this attempt; surface them verbatim.
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from LinkedIn");
        let body = OAuthErrorResponse {
            success: false,
            error,
            description: params.error_description,
            message: "LinkedIn authentication failed".to_string(),
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }

    let Some(code) = params.code else {
        return Err(AppError::BadRequest(
            "Authorization code is missing".to_string(),
        ));
    };

    // State verification failure is logged but non-fatal: the state only
    // carries the frontend URL, and the code exchange is the real gate.
    if let Some(raw_state) = &params.state {
        if verify_and_decode_state(raw_state, &state.config.oauth_state_key).is_none() {
            tracing::warn!("Invalid or tampered OAuth state parameter");
        }
    }

    tracing::info!("Exchanging authorization code for tokens");

    let exchange = state
        .linkedin
        .exchange_code(
            &code,
            &state.config.linkedin_client_id,
            &state.config.linkedin_client_secret,
            &state.config.linkedin_redirect_uri(),
        )
        .await?;

    let expires_at = format_utc_rfc3339(exchange.expires_at);

    // Profile resolution is best-effort; without an email there is no
    // account to link the token to.
    let profile = match state.linkedin.resolve_profile(&exchange.access_token).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(error = %e, "Could not retrieve LinkedIn user info");
            None
        }
    };

    let linked = match profile.as_ref().and_then(|p| p.email.clone()) {
        Some(email) => {
            let profile = profile.as_ref().unwrap();
            let user = upsert_linked_user(&state, &email, &exchange.access_token, &expires_at, &profile.urn)
                .await?;

            state
                .credential_store
                .mirror_linkedin_token(
                    &user.id,
                    &exchange.access_token,
                    &expires_at,
                    &profile.id,
                    &profile.name,
                )
                .await?;

            connections::record_connection(
                &state.connection_cache,
                ConnectionInfo {
                    user_id: user.id.clone(),
                    user_name: profile.name.clone(),
                    has_token: true,
                    created_at: now_rfc3339(),
                },
            );

            let jwt = create_jwt(&user.id, &state.config.jwt_signing_key)?;
            Some((user, jwt))
        }
        None => {
            tracing::warn!("No email in LinkedIn user info, cannot link to an account");
            None
        }
    };

    let (user, token) = match linked {
        Some((user, jwt)) => (Some(user.to_public()), Some(jwt)),
        None => (None, None),
    };

    let body = CallbackResponse {
        success: true,
        message: "LinkedIn authentication successful".to_string(),
        user,
        token,
        expires_at,
    };
    Ok(Json(body).into_response())
}

/// Find or create the user for a LinkedIn email and store the token on the
/// legacy user fields.
async fn upsert_linked_user(
    state: &AppState,
    email: &str,
    access_token: &str,
    expires_at: &str,
    person_urn: &str,
) -> Result<User> {
    let now = now_rfc3339();

    let mut user = match state.db.get_user_by_email(email).await? {
        Some(user) => user,
        None => User {
            id: random_hex_id(),
            name: None,
            email: email.to_string(),
            password_hash: None,
            twitter_token: None,
            linkedin_token: None,
            linkedin_token_expiry: None,
            linkedin_person_urn: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        },
    };

    user.linkedin_token = Some(access_token.to_string());
    user.linkedin_token_expiry = Some(expires_at.to_string());
    user.linkedin_person_urn = Some(person_urn.to_string());
    user.updated_at = now;

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "LinkedIn token stored for user");
    Ok(user)
}

// ─── Token status ────────────────────────────────────────────

#[derive(Serialize)]
struct TokenStatusResponse {
    success: bool,
    #[serde(rename = "hasToken")]
    has_token: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid: Option<bool>,
    #[serde(rename = "needsReauth")]
    needs_reauth: bool,
    message: String,
    #[serde(rename = "expiryDate", skip_serializing_if = "Option::is_none")]
    expiry_date: Option<String>,
    #[serde(rename = "reAuthUrl", skip_serializing_if = "Option::is_none")]
    reauth_url: Option<String>,
}

/// Check the caller's LinkedIn token: local expiry first (no network),
/// then the remote validity probe.
async fn token_status(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth): axum::Extension<AuthUser>,
) -> Result<Json<TokenStatusResponse>> {
    let reauth_url = format!("{}/auth/linkedin/login", state.config.base_url);

    let user = state.db.get_user(&auth.user_id).await?;
    let Some(token) = user.as_ref().and_then(|u| u.linkedin_token.clone()) else {
        return Ok(Json(TokenStatusResponse {
            success: true,
            has_token: false,
            expired: None,
            valid: None,
            needs_reauth: true,
            message: "No LinkedIn token found".to_string(),
            expiry_date: None,
            reauth_url: Some(reauth_url),
        }));
    };

    let expiry = user.and_then(|u| u.linkedin_token_expiry);

    // Local check: a missing or unparseable expiry counts as expired.
    let expired = expiry
        .as_deref()
        .map(|e| token_expired(e, chrono::Utc::now()))
        .unwrap_or(true);

    if expired {
        return Ok(Json(TokenStatusResponse {
            success: true,
            has_token: true,
            expired: Some(true),
            valid: None,
            needs_reauth: true,
            message: "LinkedIn token has expired".to_string(),
            expiry_date: expiry,
            reauth_url: Some(reauth_url),
        }));
    }

    let valid = state.linkedin.token_valid(&token).await;

    Ok(Json(TokenStatusResponse {
        success: true,
        has_token: true,
        expired: Some(false),
        valid: Some(valid),
        needs_reauth: !valid,
        message: if valid {
            "LinkedIn token is valid and ready to use".to_string()
        } else {
            "LinkedIn token is invalid".to_string()
        },
        expiry_date: expiry,
        reauth_url: (!valid).then_some(reauth_url),
    }))
}

// ─── Debug token view ────────────────────────────────────────

#[derive(Serialize)]
struct DebugTokensResponse {
    success: bool,
    tokens: Vec<ConnectionInfo>,
    count: usize,
}

/// Recent OAuth connections from the process-scoped cache. Not
/// authoritative and holds no secret material.
async fn debug_tokens(State(state): State<Arc<AppState>>) -> Json<DebugTokensResponse> {
    let tokens = connections::list_connections(&state.connection_cache);
    let count = tokens.len();
    Json(DebugTokensResponse {
        success: true,
        tokens,
        count,
    })
}

// ─── Signed state parameter ──────────────────────────────────

/// Sign the frontend URL + timestamp into the OAuth state parameter.
fn sign_state(frontend_url: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    // Data payload: "frontend_url|timestamp_hex"
    let state_payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(state_payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    // "payload|signature_hex", base64 encoded for the URL
    let signed_state = format!("{}|{}", state_payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify HMAC signature and decode the frontend URL from the OAuth state
/// parameter.
pub fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let frontend_url = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    // Reconstruct payload and verify signature
    let payload = format!("{}|{}", frontend_url, timestamp_hex);

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());

    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected_signature {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_state_roundtrip() {
        let secret = b"secret_key";
        let signed = sign_state("https://example.com", secret).unwrap();
        let decoded = verify_and_decode_state(&signed, secret);
        assert_eq!(decoded, Some("https://example.com".to_string()));
    }

    #[test]
    fn test_verify_and_decode_state_invalid_signature() {
        let secret = b"secret_key";
        let payload = format!("{}|{:x}", "https://example.com", 1234567890u128);
        let state_data = format!("{}|{}", payload, "invalid_signature");
        let encoded_state = URL_SAFE_NO_PAD.encode(state_data.as_bytes());

        assert_eq!(verify_and_decode_state(&encoded_state, secret), None);
    }

    #[test]
    fn test_verify_and_decode_state_wrong_secret() {
        let secret = b"secret_key";
        let signed = sign_state("https://example.com", secret).unwrap();
        assert_eq!(verify_and_decode_state(&signed, b"wrong_key"), None);
    }

    #[test]
    fn test_verify_and_decode_state_malformed() {
        let secret = b"secret_key";
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_and_decode_state(&encoded_state, secret), None);
    }
}
