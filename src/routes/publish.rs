// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Publishing routes: one immediate publish call per request.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Platform;
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/post/twitter", post(publish_twitter))
        .route("/api/post/linkedin", post(publish_linkedin))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest {
    #[serde(default)]
    content: String,
    /// Existing pending record to mark with the outcome
    #[serde(default)]
    post_id: Option<String>,
}

#[derive(Serialize)]
struct PublishResponse {
    success: bool,
    platform: Platform,
    message: String,
    #[serde(rename = "tweetId", skip_serializing_if = "Option::is_none")]
    tweet_id: Option<String>,
    #[serde(rename = "postId", skip_serializing_if = "Option::is_none")]
    post_id: Option<String>,
}

/// Publish to Twitter with the caller's stored credentials.
async fn publish_twitter(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<PublishResponse>> {
    let report = state
        .publisher
        .publish(
            &auth.user_id,
            Platform::Twitter,
            &body.content,
            body.post_id.as_deref(),
        )
        .await?;

    Ok(Json(PublishResponse {
        success: true,
        platform: Platform::Twitter,
        message: "Posted to Twitter successfully!".to_string(),
        tweet_id: Some(report.remote_id),
        post_id: None,
    }))
}

/// Publish to LinkedIn with the caller's stored credentials.
async fn publish_linkedin(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<PublishRequest>,
) -> Result<Json<PublishResponse>> {
    let report = state
        .publisher
        .publish(
            &auth.user_id,
            Platform::LinkedIn,
            &body.content,
            body.post_id.as_deref(),
        )
        .await?;

    Ok(Json(PublishResponse {
        success: true,
        platform: Platform::LinkedIn,
        message: "Posted to LinkedIn successfully!".to_string(),
        tweet_id: None,
        post_id: Some(report.remote_id),
    }))
}
