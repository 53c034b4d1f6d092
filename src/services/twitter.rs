// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Twitter API client: publish a text tweet with user-context credentials.
//!
//! Stateless per call: each publish takes the four credential strings and
//! signs one `POST /2/tweets` request with OAuth 1.0a (HMAC-SHA1). There is
//! no refresh concept; user-context credentials are long-lived.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Timeout for each outbound call.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// The four user-context credential strings.
#[derive(Debug, Clone)]
pub struct TwitterApiCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl TwitterApiCredentials {
    /// All four fields must be non-empty before any network call.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty()
            && !self.api_secret.is_empty()
            && !self.access_token.is_empty()
            && !self.access_secret.is_empty()
    }
}

/// Twitter API client.
#[derive(Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    api_base: String,
}

impl Default for TwitterClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TwitterClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("reqwest client"),
            api_base: "https://api.twitter.com".to_string(),
        }
    }

    /// Override the API endpoint (tests).
    #[cfg(any(test, debug_assertions))]
    pub fn with_base_url(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    /// Publish a text tweet.
    ///
    /// Incomplete credentials are a precondition failure; no request is
    /// sent in that case.
    pub async fn post_tweet(
        &self,
        creds: &TwitterApiCredentials,
        text: &str,
    ) -> Result<TweetData, AppError> {
        if !creds.is_complete() {
            return Err(AppError::BadRequest(
                "Missing Twitter API credentials".to_string(),
            ));
        }

        let url = format!("{}/2/tweets", self.api_base);
        let nonce = crate::services::crypto::random_hex_id();
        let timestamp = chrono::Utc::now().timestamp();
        let authorization = oauth1_header(creds, "POST", &url, &nonce, timestamp);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| AppError::platform_api("twitter", None, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            let message = match status {
                401 => "Twitter authentication failed. Please reconfigure your API credentials."
                    .to_string(),
                403 => "Twitter API access denied. Please check your credentials and permissions."
                    .to_string(),
                _ => format!("HTTP {}: {}", status, body),
            };

            return Err(AppError::platform_api("twitter", Some(status), message));
        }

        let created: CreateTweetResponse = response.json().await.map_err(|e| {
            AppError::platform_api("twitter", None, format!("JSON parse error: {}", e))
        })?;

        Ok(created.data)
    }
}

/// Build the OAuth 1.0a `Authorization` header for a request with a JSON
/// body (only the oauth parameters enter the signature).
fn oauth1_header(
    creds: &TwitterApiCredentials,
    method: &str,
    url: &str,
    nonce: &str,
    timestamp: i64,
) -> String {
    let timestamp = timestamp.to_string();
    let oauth_params: [(&str, &str); 6] = [
        ("oauth_consumer_key", &creds.api_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", &timestamp),
        ("oauth_token", &creds.access_token),
        ("oauth_version", "1.0"),
    ];

    let signature = sign_request(
        method,
        url,
        &oauth_params,
        &creds.api_secret,
        &creds.access_secret,
    );

    let mut header_params: Vec<String> = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
        .collect();
    header_params.push(format!("oauth_signature=\"{}\"", percent_encode(&signature)));
    header_params.sort();

    format!("OAuth {}", header_params.join(", "))
}

/// Compute the HMAC-SHA1 request signature per RFC 5849.
fn sign_request(
    method: &str,
    url: &str,
    params: &[(&str, &str)],
    consumer_secret: &str,
    token_secret: &str,
) -> String {
    // Parameter string: sorted, percent-encoded pairs
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let base_string = format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    );

    let signing_key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac =
        HmacSha1::new_from_slice(signing_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(base_string.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// RFC 3986 percent-encoding (unreserved characters pass through).
fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: TweetData,
}

/// Created tweet, as returned by the v2 API.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetData {
    pub id: String,
    pub text: String,
}
