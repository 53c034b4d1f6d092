// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    /// Login failure. One generic message for unknown email and wrong
    /// password alike, so responses don't oracle user existence.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{message}")]
    PlatformAuth {
        platform: &'static str,
        message: String,
        /// Where the user can re-authorize, when the platform supports it.
        reauth_url: Option<String>,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("{platform} API error: {message}")]
    PlatformApi {
        platform: &'static str,
        /// Upstream HTTP status, when the failure came from a response.
        status: Option<u16>,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Canonical message for an invalid/expired platform token.
    pub const PLATFORM_TOKEN_ERROR: &'static str = "access token is invalid or expired";

    /// Whether this error means the platform token is invalid or expired,
    /// i.e. the caller needs to re-authenticate with the platform.
    pub fn is_platform_token_error(&self) -> bool {
        match self {
            AppError::PlatformAuth { .. } => true,
            AppError::PlatformApi {
                status, message, ..
            } => {
                let msg = message.to_lowercase();
                *status == Some(401)
                    || (msg.contains("token")
                        && (msg.contains("invalid") || msg.contains("expired")))
            }
            _ => false,
        }
    }

    /// Convenience constructor for upstream platform failures.
    pub fn platform_api(platform: &'static str, status: Option<u16>, message: String) -> Self {
        AppError::PlatformApi {
            platform,
            status,
            message,
        }
    }
}

/// JSON error response envelope: `{success:false, message, error?}`.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(rename = "needsReauth", skip_serializing_if = "Option::is_none")]
    needs_reauth: Option<bool>,
    #[serde(rename = "reAuthUrl", skip_serializing_if = "Option::is_none")]
    reauth_url: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error, needs_reauth, reauth_url) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                None,
                None,
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
                None,
                None,
                None,
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
                None,
                None,
                None,
            ),
            AppError::PlatformAuth {
                message,
                reauth_url,
                ..
            } => (
                StatusCode::UNAUTHORIZED,
                message.clone(),
                None,
                Some(true),
                reauth_url.clone(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None, None, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None, None, None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), None, None, None)
            }
            AppError::PlatformApi {
                platform,
                status,
                message,
            } => {
                // Upstream 401/403 pass through; everything else surfaces
                // as a 500 carrying the upstream body.
                let code = match status {
                    Some(401) => StatusCode::UNAUTHORIZED,
                    Some(403) => StatusCode::FORBIDDEN,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    code,
                    format!("Failed to post to {}: {}", platform, message),
                    Some(message.clone()),
                    None,
                    None,
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(msg.clone()),
                    None,
                    None,
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    None,
                    None,
                    None,
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
            error,
            needs_reauth,
            reauth_url,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
