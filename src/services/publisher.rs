// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Publishing orchestrator.
//!
//! For a user + platform + content: resolve credentials, run the
//! platform-specific publisher, and persist the outcome as a post record.
//! Exactly one remote publish call and one outcome write are attempted per
//! invocation; there are no retries.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::post::{
    Platform, PlatformData, PlatformPostData, PlatformStatus, PlatformStatuses, Post, PostStatus,
};
use crate::services::credentials::CredentialStore;
use crate::services::crypto::random_hex_id;
use crate::services::linkedin::{person_urn, token_expired, LinkedInClient};
use crate::services::twitter::{TwitterApiCredentials, TwitterClient};
use crate::time_utils::now_rfc3339;
use chrono::Utc;

/// Result of a successful publish.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub platform: Platform,
    /// Remote post identifier (tweet id / share URN)
    pub remote_id: String,
    /// The post record that was written
    pub record_id: Option<String>,
}

/// High-level publishing service.
#[derive(Clone)]
pub struct PublishService {
    db: FirestoreDb,
    credentials: CredentialStore,
    linkedin: LinkedInClient,
    twitter: TwitterClient,
    /// Where a user re-authorizes LinkedIn when their token is dead
    linkedin_reauth_url: String,
    /// Legacy single-tenant Twitter credentials from the environment,
    /// consulted only when the user has no Twitter credentials of their own
    twitter_fallback: Option<TwitterApiCredentials>,
}

impl PublishService {
    pub fn new(
        db: FirestoreDb,
        credentials: CredentialStore,
        linkedin: LinkedInClient,
        twitter: TwitterClient,
        linkedin_reauth_url: String,
        twitter_fallback: Option<TwitterApiCredentials>,
    ) -> Self {
        Self {
            db,
            credentials,
            linkedin,
            twitter,
            linkedin_reauth_url,
            twitter_fallback,
        }
    }

    /// Publish `content` to `platform` for the given user.
    ///
    /// When `post_id` names an existing record owned by the user, the
    /// outcome is recorded on it; otherwise a new record is created with
    /// the outcome baked in. On failure a `failed` record is still written,
    /// best-effort.
    pub async fn publish(
        &self,
        user_id: &str,
        platform: Platform,
        content: &str,
        post_id: Option<&str>,
    ) -> Result<PublishReport, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Content is required and must be a non-empty string".to_string(),
            ));
        }

        let result = match platform {
            Platform::Twitter => self.publish_twitter(user_id, content).await,
            Platform::LinkedIn => self.publish_linkedin(user_id, content).await,
        };

        match result {
            Ok(remote_id) => {
                let record_id = self
                    .persist_success(user_id, platform, content, post_id, &remote_id)
                    .await?;
                Ok(PublishReport {
                    platform,
                    remote_id,
                    record_id,
                })
            }
            Err(err) => {
                // Best-effort failure record; its own errors must not mask
                // the primary failure.
                if let Err(db_err) = self
                    .persist_failure(user_id, platform, content, post_id, &err.to_string())
                    .await
                {
                    tracing::warn!(
                        error = %db_err,
                        user_id,
                        platform = %platform,
                        "Failed to persist failed post record"
                    );
                }
                Err(err)
            }
        }
    }

    // ─── Platform publishers ─────────────────────────────────────

    /// Twitter: all four credential fields are required before any network
    /// call is made.
    async fn publish_twitter(&self, user_id: &str, content: &str) -> Result<String, AppError> {
        let stored = self.credentials.get(user_id).await?;

        let api_creds = match &stored {
            Some(creds) if creds.platforms.twitter.enabled => {
                let decrypted = self.credentials.decrypt(creds).twitter;
                TwitterApiCredentials {
                    api_key: decrypted.api_key.unwrap_or_default(),
                    api_secret: decrypted.api_secret.unwrap_or_default(),
                    access_token: decrypted.access_token.unwrap_or_default(),
                    access_secret: decrypted.access_secret.unwrap_or_default(),
                }
            }
            _ => match &self.twitter_fallback {
                Some(fallback) => fallback.clone(),
                None => {
                    return Err(AppError::BadRequest(
                        "Twitter not configured. Please add your Twitter API credentials first."
                            .to_string(),
                    ))
                }
            },
        };

        if !api_creds.is_complete() {
            return Err(AppError::BadRequest(
                "Incomplete Twitter credentials. Please reconfigure your Twitter API access."
                    .to_string(),
            ));
        }

        let tweet = self.twitter.post_tweet(&api_creds, content).await?;
        tracing::info!(user_id, tweet_id = %tweet.id, "Tweet posted");
        Ok(tweet.id)
    }

    /// LinkedIn: requires an access token, and when an expiry is stored it
    /// must not be passed (local check only; the remote probe belongs to
    /// the token-status endpoint).
    async fn publish_linkedin(&self, user_id: &str, content: &str) -> Result<String, AppError> {
        let stored = self
            .credentials
            .get(user_id)
            .await?
            .filter(|c| c.platforms.linkedin.enabled)
            .ok_or_else(|| {
                AppError::BadRequest(
                    "LinkedIn not configured. Please connect your LinkedIn account first."
                        .to_string(),
                )
            })?;

        let decrypted = self.credentials.decrypt(&stored).linkedin;

        let access_token = decrypted.access_token.ok_or_else(|| {
            AppError::BadRequest(
                "LinkedIn access token missing. Please reconnect your LinkedIn account."
                    .to_string(),
            )
        })?;

        if let Some(expires_at) = &decrypted.expires_at {
            if token_expired(expires_at, Utc::now()) {
                return Err(AppError::PlatformAuth {
                    platform: "linkedin",
                    message:
                        "LinkedIn access token has expired. Please reconnect your LinkedIn account."
                            .to_string(),
                    reauth_url: Some(self.linkedin_reauth_url.clone()),
                });
            }
        }

        // A stored profile id skips the profile-lookup round trip.
        let author_urn = match &decrypted.profile_id {
            Some(profile_id) => person_urn(profile_id),
            None => {
                self.linkedin
                    .resolve_profile(&access_token)
                    .await
                    .map_err(|err| self.with_reauth(err))?
                    .urn
            }
        };

        let share = self
            .linkedin
            .post_share(&access_token, &author_urn, content)
            .await
            .map_err(|err| self.with_reauth(err))?;

        tracing::info!(user_id, share_id = %share.id, "LinkedIn share posted");
        Ok(share.id)
    }

    /// Attach the re-authorization URL to token errors from the API.
    fn with_reauth(&self, err: AppError) -> AppError {
        match err {
            AppError::PlatformApi {
                status: Some(401),
                message,
                ..
            } => AppError::PlatformAuth {
                platform: "linkedin",
                message,
                reauth_url: Some(self.linkedin_reauth_url.clone()),
            },
            other => other,
        }
    }

    // ─── Outcome persistence ─────────────────────────────────────

    async fn persist_success(
        &self,
        user_id: &str,
        platform: Platform,
        content: &str,
        post_id: Option<&str>,
        remote_id: &str,
    ) -> Result<Option<String>, AppError> {
        let now = now_rfc3339();
        let data = PlatformPostData {
            remote_id: remote_id.to_string(),
            posted_at: now.clone(),
        };

        if let Some(post_id) = post_id {
            // Update the named record only when it exists and belongs to
            // the caller; a nonexistent id mutates nothing.
            match self.db.get_post(post_id).await? {
                Some(mut post) if post.user_id == user_id => {
                    post.record_outcome(platform, PlatformStatus::Success, Some(data), &now);
                    post.error = None;
                    self.db.set_post(&post).await?;
                    Ok(Some(post.id))
                }
                _ => Ok(None),
            }
        } else {
            let mut post = new_record(user_id, platform, content, &now);
            post.record_outcome(platform, PlatformStatus::Success, Some(data), &now);
            self.db.set_post(&post).await?;
            Ok(Some(post.id))
        }
    }

    async fn persist_failure(
        &self,
        user_id: &str,
        platform: Platform,
        content: &str,
        post_id: Option<&str>,
        error_msg: &str,
    ) -> Result<(), AppError> {
        let now = now_rfc3339();

        if let Some(post_id) = post_id {
            match self.db.get_post(post_id).await? {
                Some(mut post) if post.user_id == user_id => {
                    post.record_outcome(platform, PlatformStatus::Failed, None, &now);
                    post.error = Some(error_msg.to_string());
                    self.db.set_post(&post).await
                }
                _ => Ok(()),
            }
        } else {
            let mut post = new_record(user_id, platform, content, &now);
            post.record_outcome(platform, PlatformStatus::Failed, None, &now);
            post.error = Some(error_msg.to_string());
            self.db.set_post(&post).await
        }
    }
}

/// A fresh post record for an immediate publish attempt.
fn new_record(user_id: &str, platform: Platform, content: &str, now: &str) -> Post {
    Post {
        id: random_hex_id(),
        content: content.to_string(),
        platforms: vec![platform],
        user_id: user_id.to_string(),
        scheduled_for: None,
        status: PostStatus::Pending,
        platform_status: PlatformStatuses::default(),
        platform_data: PlatformData::default(),
        error: None,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}
