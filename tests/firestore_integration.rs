// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end flows against the Firestore emulator.
//!
//! Run with `FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test`; each test
//! skips itself when the emulator is absent. Outbound platform calls go to
//! a closed local port (or a local stub for the publish-success path), so
//! no test ever reaches a real API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;

mod common;

async fn json_call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or_default();
    (status, json)
}

/// Unique email per call so re-runs against a warm emulator don't collide.
fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}@example.com", prefix, nanos)
}

/// Register a user and return their session token.
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = json_call(
        app,
        "POST",
        "/api/user/register",
        None,
        Some(serde_json::json!({
            "name": "Test User",
            "email": email,
            "password": "correct horse battery staple",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Stub Twitter API answering `POST /2/tweets` with a fixed tweet id.
async fn spawn_twitter_stub() -> String {
    use axum::routing::post;

    let app = Router::new().route(
        "/2/tweets",
        post(|| async {
            axum::Json(serde_json::json!({
                "data": {"id": "1234567890", "text": "hello"}
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    require_emulator!();
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);

    let email = unique_email("dup");
    register(&app, &email).await;

    let (status, body) = json_call(
        &app,
        "POST",
        "/api/user/register",
        None,
        Some(serde_json::json!({
            "name": "Other",
            "email": email,
            "password": "another password",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists with this email");
}

#[tokio::test]
async fn test_login_gives_no_user_existence_oracle() {
    require_emulator!();
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);

    let email = unique_email("oracle");
    register(&app, &email).await;

    let (wrong_pw_status, wrong_pw_body) = json_call(
        &app,
        "POST",
        "/api/user/login",
        None,
        Some(serde_json::json!({"email": email, "password": "wrong"})),
    )
    .await;

    let (unknown_status, unknown_body) = json_call(
        &app,
        "POST",
        "/api/user/login",
        None,
        Some(serde_json::json!({"email": unique_email("nobody"), "password": "wrong"})),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Identical generic message for both failure modes
    assert_eq!(wrong_pw_body["message"], unknown_body["message"]);
    assert_eq!(wrong_pw_body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_credentials_roundtrip_and_disable_semantics() {
    require_emulator!();
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);
    let token = register(&app, &unique_email("creds")).await;

    // New user starts disconnected
    let (status, body) = json_call(&app, "GET", "/api/credentials", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"]["platforms"]["twitter"]["connected"], false);

    // Save Twitter credentials
    let (status, _body) = json_call(
        &app,
        "POST",
        "/api/credentials/twitter",
        Some(&token),
        Some(serde_json::json!({
            "apiKey": "k", "apiSecret": "s",
            "accessToken": "t", "accessSecret": "ts",
            "username": "someone",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_status, body) = json_call(&app, "GET", "/api/credentials", Some(&token), None).await;
    let twitter = &body["credentials"]["platforms"]["twitter"];
    assert_eq!(twitter["enabled"], true);
    assert_eq!(twitter["connected"], true);
    assert_eq!(twitter["username"], "someone");
    // Redacted view never carries secret material
    assert!(body.to_string().find("accessSecret").is_none());

    // Disable clears token-class secrets but keeps profile metadata
    let (status, _body) =
        json_call(&app, "DELETE", "/api/credentials/twitter", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_status, body) = json_call(&app, "GET", "/api/credentials", Some(&token), None).await;
    let twitter = &body["credentials"]["platforms"]["twitter"];
    assert_eq!(twitter["enabled"], false);
    assert_eq!(twitter["connected"], false);
    assert_eq!(twitter["username"], "someone");
}

#[tokio::test]
async fn test_disable_linkedin_keeps_profile_name() {
    require_emulator!();
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);
    let token = register(&app, &unique_email("li-disable")).await;

    let (status, _body) = json_call(
        &app,
        "POST",
        "/api/credentials/linkedin",
        Some(&token),
        Some(serde_json::json!({
            "clientId": "cid",
            "clientSecret": "csecret",
            "accessToken": "atoken",
            "profileId": "ABC123",
            "profileName": "Some Member",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) =
        json_call(&app, "DELETE", "/api/credentials/linkedin", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_status, body) = json_call(&app, "GET", "/api/credentials", Some(&token), None).await;
    let linkedin = &body["credentials"]["platforms"]["linkedin"];
    assert_eq!(linkedin["enabled"], false);
    assert_eq!(linkedin["connected"], false);
    // Non-secret profile fields survive the disable
    assert_eq!(linkedin["profileName"], "Some Member");
    assert_eq!(linkedin["profileId"], "ABC123");
}

#[tokio::test]
async fn test_post_crud_roundtrip() {
    require_emulator!();
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);
    let token = register(&app, &unique_email("crud")).await;

    // Create
    let (status, body) = json_call(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(serde_json::json!({"content": "draft text", "platforms": ["twitter"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["status"], "pending");
    let post_id = body["post"]["id"].as_str().unwrap().to_string();

    // Update content
    let (status, _body) = json_call(
        &app,
        "PUT",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        Some(serde_json::json!({"content": "revised text"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Read back: new content, unchanged id
    let (status, body) = json_call(
        &app,
        "GET",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["content"], "revised text");
    assert_eq!(body["post"]["id"], post_id.as_str());

    // Another user cannot touch it
    let other_token = register(&app, &unique_email("crud-other")).await;
    let (status, _body) = json_call(
        &app,
        "DELETE",
        &format!("/api/posts/{}", post_id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Delete
    let (status, _body) = json_call(
        &app,
        "DELETE",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = json_call(
        &app,
        "GET",
        &format!("/api/posts/{}", post_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_publish_unconfigured_platform_fails_before_network() {
    require_emulator!();
    // Platform clients point at a closed port: any attempted call would
    // surface as a connection error, not the message asserted below.
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);
    let token = register(&app, &unique_email("unconfigured")).await;

    let (status, body) = json_call(
        &app,
        "POST",
        "/api/post/linkedin",
        Some(&token),
        Some(serde_json::json!({"content": "hello", "postId": "does-not-exist"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("LinkedIn not configured"));

    // The nonexistent postId was not conjured into a record
    let (_status, body) = json_call(&app, "GET", "/api/posts", Some(&token), None).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_publish_expired_linkedin_token_needs_reauth() {
    require_emulator!();
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);
    let token = register(&app, &unique_email("expired")).await;

    let (status, _body) = json_call(
        &app,
        "POST",
        "/api/credentials/linkedin",
        Some(&token),
        Some(serde_json::json!({
            "clientId": "cid",
            "accessToken": "atoken",
            "expiresAt": "2020-01-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The local expiry check fires regardless of remote validity; no
    // network call is attempted.
    let (status, body) = json_call(
        &app,
        "POST",
        "/api/post/linkedin",
        Some(&token),
        Some(serde_json::json!({"content": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["needsReauth"], true);
    assert!(body["reAuthUrl"]
        .as_str()
        .unwrap()
        .ends_with("/auth/linkedin/login"));
}

#[tokio::test]
async fn test_publish_twitter_end_to_end() {
    require_emulator!();

    let stub_url = spawn_twitter_stub().await;
    let db = common::test_db().await;
    let linkedin = socialcast::services::LinkedInClient::new()
        .with_base_urls("http://127.0.0.1:9", "http://127.0.0.1:9");
    let twitter = socialcast::services::TwitterClient::new().with_base_url(&stub_url);
    let (app, _state) = common::create_test_app_with_clients(db, linkedin, twitter);

    let token = register(&app, &unique_email("e2e")).await;

    let (status, _body) = json_call(
        &app,
        "POST",
        "/api/credentials/twitter",
        Some(&token),
        Some(serde_json::json!({
            "apiKey": "k", "apiSecret": "s",
            "accessToken": "t", "accessSecret": "ts",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = json_call(
        &app,
        "POST",
        "/api/post/twitter",
        Some(&token),
        Some(serde_json::json!({"content": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "publish failed: {}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["tweetId"], "1234567890");

    // The outcome landed as a posted record
    let (_status, body) = json_call(&app, "GET", "/api/posts", Some(&token), None).await;
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["status"], "posted");
    assert_eq!(posts[0]["platform_status"]["twitter"], "success");
    assert_eq!(posts[0]["platform_data"]["twitter"]["remote_id"], "1234567890");
}

#[tokio::test]
async fn test_publish_failure_writes_failed_record() {
    require_emulator!();
    // Closed port: the publish call itself fails after preconditions pass.
    let (app, _state) = common::create_test_app_with_db(common::test_db().await);
    let token = register(&app, &unique_email("failrec")).await;

    let (status, _body) = json_call(
        &app,
        "POST",
        "/api/credentials/twitter",
        Some(&token),
        Some(serde_json::json!({
            "apiKey": "k", "apiSecret": "s",
            "accessToken": "t", "accessSecret": "ts",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _body) = json_call(
        &app,
        "POST",
        "/api/post/twitter",
        Some(&token),
        Some(serde_json::json!({"content": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // Best-effort failure record was still written
    let (_status, body) = json_call(&app, "GET", "/api/posts", Some(&token), None).await;
    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["status"], "failed");
    assert_eq!(posts[0]["platform_status"]["twitter"], "failed");
    assert!(posts[0]["error"].is_string());
}
