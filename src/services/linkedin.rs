// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn API client: OAuth code exchange, profile resolution and
//! UGC share publishing.
//!
//! Handles:
//! - Authorization URL construction (fixed OpenID Connect scope set)
//! - Code-for-token exchange with absolute expiry computation
//! - Userinfo profile resolution with legacy endpoint fallback
//! - Local and remote token validity checks
//! - Publishing a text share as the authenticated member

use crate::error::AppError;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Scopes requested on every authorization round.
pub const OAUTH_SCOPES: &str = "openid profile email w_member_social";

/// LinkedIn tokens default to 60 days when the exchange response omits
/// `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 5_184_000;

/// Timeout for each outbound call.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// LinkedIn API client.
#[derive(Clone)]
pub struct LinkedInClient {
    http: reqwest::Client,
    auth_base: String,
    api_base: String,
    /// Policy for the remote validity probe: when the userinfo call fails
    /// with anything other than a 401, treat the token as possibly still
    /// valid. Fail-open on purpose; a definitive 401 is the only signal
    /// LinkedIn gives for a dead token.
    pub assume_valid_on_ambiguous_error: bool,
}

impl Default for LinkedInClient {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedInClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("reqwest client"),
            auth_base: "https://www.linkedin.com/oauth/v2".to_string(),
            api_base: "https://api.linkedin.com/v2".to_string(),
            assume_valid_on_ambiguous_error: true,
        }
    }

    /// Override the API endpoints (tests).
    #[cfg(any(test, debug_assertions))]
    pub fn with_base_urls(mut self, auth_base: &str, api_base: &str) -> Self {
        self.auth_base = auth_base.to_string();
        self.api_base = api_base.to_string();
        self
    }

    // ─── OAuth ───────────────────────────────────────────────────

    /// Build the authorization URL the user is redirected to.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
    ) -> Result<String, AppError> {
        if client_id.is_empty() {
            return Err(AppError::BadRequest(
                "LinkedIn Client ID is required".to_string(),
            ));
        }

        Ok(format!(
            "{}/authorization?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.auth_base,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TokenExchange, AppError> {
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(AppError::BadRequest(
                "LinkedIn Client ID and Client Secret are required".to_string(),
            ));
        }

        let response = self
            .http
            .post(format!("{}/accessToken", self.auth_base))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::platform_api("linkedin", None, format!("Token exchange failed: {}", e))
            })?;

        let raw: TokenResponse = Self::check_response_json(response).await?;

        let expires_in = raw.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        Ok(TokenExchange {
            access_token: raw.access_token,
            token_type: raw.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }

    // ─── Profile ─────────────────────────────────────────────────

    /// Fetch the member profile via the OpenID Connect userinfo endpoint.
    pub async fn user_info(&self, access_token: &str) -> Result<LinkedInProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/userinfo", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::platform_api("linkedin", None, e.to_string()))?;

        let info: UserInfoResponse = Self::check_response_json(response).await?;
        let (id, urn) = decode_subject(&info.sub);

        Ok(LinkedInProfile {
            id,
            urn,
            name: info.name.unwrap_or_default(),
            email: info.email,
            picture: info.picture,
        })
    }

    /// Legacy profile endpoint, used when userinfo fails. Derives the
    /// display name from the localized first/last name fields.
    pub async fn user_info_legacy(&self, access_token: &str) -> Result<LinkedInProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/people/~", self.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::platform_api("linkedin", None, e.to_string()))?;

        let profile: LegacyProfileResponse = Self::check_response_json(response).await?;

        let name = [&profile.first_name, &profile.last_name]
            .iter()
            .filter_map(|n| n.as_ref().and_then(LocalizedName::any))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(LinkedInProfile {
            urn: person_urn(&profile.id),
            id: profile.id,
            name,
            email: None,
            picture: None,
        })
    }

    /// Resolve the member profile: userinfo first, legacy endpoint as
    /// fallback.
    pub async fn resolve_profile(&self, access_token: &str) -> Result<LinkedInProfile, AppError> {
        match self.user_info(access_token).await {
            Ok(profile) => Ok(profile),
            Err(primary) => {
                tracing::warn!(error = %primary, "userinfo failed, trying legacy profile endpoint");
                self.user_info_legacy(access_token).await
            }
        }
    }

    // ─── Validity ────────────────────────────────────────────────

    /// Probe the token against the userinfo endpoint.
    ///
    /// A 401 is authoritative: the token is dead. Any other failure follows
    /// the `assume_valid_on_ambiguous_error` policy.
    pub async fn token_valid(&self, access_token: &str) -> bool {
        if access_token.is_empty() {
            return false;
        }

        match self.user_info(access_token).await {
            Ok(_) => true,
            Err(AppError::PlatformApi {
                status: Some(401), ..
            }) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Token validation unclear");
                self.assume_valid_on_ambiguous_error
            }
        }
    }

    // ─── Publishing ──────────────────────────────────────────────

    /// Publish a plain-text share as the given author.
    pub async fn post_share(
        &self,
        access_token: &str,
        author_urn: &str,
        text: &str,
    ) -> Result<ShareResponse, AppError> {
        if access_token.is_empty() {
            return Err(AppError::BadRequest(
                "LinkedIn access token is missing".to_string(),
            ));
        }

        let body = serde_json::json!({
            "author": author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": text },
                    "shareMediaCategory": "NONE",
                },
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            },
        });

        let response = self
            .http
            .post(format!("{}/ugcPosts", self.api_base))
            .bearer_auth(access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::platform_api("linkedin", None, e.to_string()))?;

        Self::check_response_json(response).await
    }

    /// Check response status, mapping LinkedIn's failure modes, then parse
    /// the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            let message = match status {
                403 => "LinkedIn API access denied. Ensure your app has the correct scopes \
                        (w_member_social, openid, profile, email) and proper permissions."
                    .to_string(),
                401 => format!("LinkedIn {}", AppError::PLATFORM_TOKEN_ERROR),
                426 => "LinkedIn API version mismatch.".to_string(),
                _ => format!("HTTP {}: {}", status, body),
            };

            return Err(AppError::platform_api("linkedin", Some(status), message));
        }

        response
            .json()
            .await
            .map_err(|e| {
                AppError::platform_api("linkedin", None, format!("JSON parse error: {}", e))
            })
    }
}

/// Local expiry check: compare the stored expiry to now, no network call.
/// An unparseable timestamp counts as expired.
pub fn token_expired(expires_at: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(expires_at) {
        Ok(expiry) => now >= expiry.with_timezone(&Utc),
        Err(_) => true,
    }
}

/// Normalize a profile id into a person URN.
pub fn person_urn(profile_id: &str) -> String {
    if profile_id.starts_with("urn:li:person:") {
        profile_id.to_string()
    } else {
        format!("urn:li:person:{}", profile_id)
    }
}

/// Split a userinfo `sub` value into (person id, full URN).
/// The subject may be a bare id or a full `urn:li:person:...` string.
fn decode_subject(sub: &str) -> (String, String) {
    let id = sub.rsplit(':').next().unwrap_or(sub).to_string();
    let urn = if sub.starts_with("urn:li:person:") {
        sub.to_string()
    } else {
        person_urn(&id)
    };
    (id, urn)
}

// ─── Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<i64>,
}

/// Outcome of the code-for-token exchange.
#[derive(Debug, Clone)]
pub struct TokenExchange {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    /// Absolute expiry computed from `expires_in`
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyProfileResponse {
    id: String,
    #[serde(rename = "firstName")]
    first_name: Option<LocalizedName>,
    #[serde(rename = "lastName")]
    last_name: Option<LocalizedName>,
}

#[derive(Debug, Deserialize)]
struct LocalizedName {
    localized: HashMap<String, String>,
}

impl LocalizedName {
    fn any(&self) -> Option<String> {
        self.localized
            .get("en_US")
            .or_else(|| self.localized.values().next())
            .cloned()
    }
}

/// Resolved member profile.
#[derive(Debug, Clone)]
pub struct LinkedInProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub picture: Option<String>,
    /// Full person URN used as the share author
    pub urn: String,
}

/// UGC post creation response.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareResponse {
    pub id: String,
}
