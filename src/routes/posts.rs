// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post record CRUD. All routes require authentication and act only on the
//! caller's own records.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::post::{Platform, PlatformData, PlatformStatuses, Post, PostStatus};
use crate::services::crypto::random_hex_id;
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

#[derive(Serialize)]
struct PostsResponse {
    success: bool,
    posts: Vec<Post>,
}

#[derive(Serialize)]
struct PostResponse {
    success: bool,
    post: Post,
}

#[derive(Serialize)]
struct DeletedResponse {
    success: bool,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePostRequest {
    #[serde(default)]
    content: String,
    /// Target platform list; a single `platform` value is also accepted
    #[serde(default)]
    platforms: Vec<Platform>,
    #[serde(default)]
    platform: Option<Platform>,
    #[serde(default)]
    scheduled_for: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePostRequest {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    scheduled_for: Option<String>,
}

/// List the caller's posts, newest first.
async fn list_posts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PostsResponse>> {
    let posts = state.db.get_posts_for_user(&auth.user_id).await?;
    Ok(Json(PostsResponse {
        success: true,
        posts,
    }))
}

/// Create a draft post record (status `pending`).
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("Content is required".to_string()));
    }

    let mut platforms = body.platforms;
    if let Some(single) = body.platform {
        if !platforms.contains(&single) {
            platforms.push(single);
        }
    }

    let now = now_rfc3339();
    let post = Post {
        id: random_hex_id(),
        content: body.content,
        platforms,
        user_id: auth.user_id.clone(),
        // Stored for clients that set it; nothing schedules from it.
        scheduled_for: body.scheduled_for,
        status: PostStatus::Pending,
        platform_status: PlatformStatuses::default(),
        platform_data: PlatformData::default(),
        error: None,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.set_post(&post).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            success: true,
            post,
        }),
    ))
}

/// Get one post.
async fn get_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>> {
    let post = owned_post(&state, &auth, &id).await?;
    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// Update a post's content and/or schedule timestamp.
async fn update_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>> {
    let mut post = owned_post(&state, &auth, &id).await?;

    if let Some(content) = body.content {
        if content.trim().is_empty() {
            return Err(AppError::BadRequest("Content is required".to_string()));
        }
        post.content = content;
    }
    if body.scheduled_for.is_some() {
        post.scheduled_for = body.scheduled_for;
    }
    post.updated_at = now_rfc3339();
    state.db.set_post(&post).await?;

    Ok(Json(PostResponse {
        success: true,
        post,
    }))
}

/// Delete a post record.
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let post = owned_post(&state, &auth, &id).await?;
    state.db.delete_post(&post.id).await?;

    Ok(Json(DeletedResponse {
        success: true,
        message: "Post deleted".to_string(),
    }))
}

/// Fetch a post and enforce ownership: 404 when absent, 403 when it
/// belongs to another user.
async fn owned_post(state: &AppState, auth: &AuthUser, id: &str) -> Result<Post> {
    let post = state
        .db
        .get_post(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.user_id != auth.user_id {
        return Err(AppError::Forbidden(
            "You do not have access to this post".to_string(),
        ));
    }
    Ok(post)
}
