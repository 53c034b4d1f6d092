// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error taxonomy tests: status mapping and the token-error helper.

use axum::response::IntoResponse;
use socialcast::error::AppError;

#[test]
fn test_is_platform_token_error_matches() {
    let err = AppError::PlatformApi {
        platform: "linkedin",
        status: Some(401),
        message: "whatever".to_string(),
    };
    assert!(err.is_platform_token_error());

    let err = AppError::PlatformApi {
        platform: "linkedin",
        status: None,
        message: format!("LinkedIn {}", AppError::PLATFORM_TOKEN_ERROR),
    };
    assert!(err.is_platform_token_error());

    let err = AppError::PlatformAuth {
        platform: "linkedin",
        message: "expired".to_string(),
        reauth_url: None,
    };
    assert!(err.is_platform_token_error());
}

#[test]
fn test_is_platform_token_error_no_match() {
    let err = AppError::PlatformApi {
        platform: "twitter",
        status: Some(429),
        message: "Rate limit exceeded".to_string(),
    };
    assert!(!err.is_platform_token_error());

    let err = AppError::BadRequest("Bad Request".to_string());
    assert!(!err.is_platform_token_error());
}

#[test]
fn test_status_mapping() {
    let cases: Vec<(AppError, u16)> = vec![
        (AppError::Unauthorized, 401),
        (AppError::InvalidCredentials, 401),
        (AppError::BadRequest("x".to_string()), 400),
        (AppError::Forbidden("x".to_string()), 403),
        (AppError::NotFound("x".to_string()), 404),
        (AppError::Database("boom".to_string()), 500),
        (
            AppError::PlatformAuth {
                platform: "linkedin",
                message: "expired".to_string(),
                reauth_url: Some("http://localhost/auth/linkedin/login".to_string()),
            },
            401,
        ),
        // Upstream platform statuses pass through for 401/403, else 500
        (
            AppError::platform_api("linkedin", Some(403), "denied".to_string()),
            403,
        ),
        (
            AppError::platform_api("linkedin", Some(426), "version".to_string()),
            500,
        ),
        (
            AppError::platform_api("twitter", None, "conn refused".to_string()),
            500,
        ),
    ];

    for (err, expected) in cases {
        let label = format!("{:?}", err);
        assert_eq!(
            err.into_response().status().as_u16(),
            expected,
            "{}",
            label
        );
    }
}

#[tokio::test]
async fn test_platform_auth_envelope_carries_reauth() {
    let err = AppError::PlatformAuth {
        platform: "linkedin",
        message: "LinkedIn token has expired".to_string(),
        reauth_url: Some("http://localhost:8080/auth/linkedin/login".to_string()),
    };

    let response = err.into_response();
    assert_eq!(response.status().as_u16(), 401);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["needsReauth"], true);
    assert_eq!(
        json["reAuthUrl"],
        "http://localhost:8080/auth/linkedin/login"
    );
}

#[tokio::test]
async fn test_validation_envelope_has_no_reauth() {
    let err = AppError::BadRequest("Content is required".to_string());
    let response = err.into_response();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Content is required");
    assert!(json.get("needsReauth").is_none());
}
