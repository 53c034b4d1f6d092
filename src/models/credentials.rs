// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user platform credentials, encrypted at rest.
//!
//! One document per user with two fixed platform slots. Secret-bearing
//! fields hold ciphertext produced by [`crate::services::crypto::CredentialCipher`];
//! plaintext views are built on demand and never persisted.

use serde::{Deserialize, Serialize};

/// Credential document stored in Firestore (document ID = user ID).
///
/// References the user by id with no cascade on user deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub user_id: String,
    pub platforms: Platforms,
    pub created_at: String,
    pub updated_at: String,
}

/// The two fixed platform slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Platforms {
    #[serde(default)]
    pub linkedin: LinkedInCredentials,
    #[serde(default)]
    pub twitter: TwitterCredentials,
}

/// LinkedIn credential slot. `client_secret`, `access_token` and
/// `refresh_token` are stored encrypted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedInCredentials {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Absolute token expiry (RFC 3339); empty when LinkedIn returned none
    #[serde(default)]
    pub expires_at: String,
    /// Person id used to build the author URN without a profile lookup
    #[serde(default)]
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: String,
}

/// Twitter credential slot. `api_secret`, `access_token` and `access_secret`
/// are stored encrypted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwitterCredentials {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_secret: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub user_id: String,
}

impl UserCredentials {
    /// Empty credential document for a user (both platforms disabled).
    pub fn empty(user_id: &str, now: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            platforms: Platforms::default(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

// ─── Plaintext views (never persisted) ──────────────────────────

/// Decrypted LinkedIn credentials. Fields that failed to decrypt are `None`.
#[derive(Debug, Clone)]
pub struct DecryptedLinkedIn {
    pub enabled: bool,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<String>,
    pub profile_id: Option<String>,
    pub profile_name: Option<String>,
}

/// Decrypted Twitter credentials. Fields that failed to decrypt are `None`.
#[derive(Debug, Clone)]
pub struct DecryptedTwitter {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_secret: Option<String>,
}

/// Full decrypted view of a credential document.
#[derive(Debug, Clone)]
pub struct DecryptedCredentials {
    pub linkedin: DecryptedLinkedIn,
    pub twitter: DecryptedTwitter,
}

// ─── Redacted views (API responses) ─────────────────────────────

/// Redacted credential view: connection state and profile metadata only.
#[derive(Debug, Clone, Serialize)]
pub struct RedactedCredentials {
    pub platforms: RedactedPlatforms,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedPlatforms {
    pub linkedin: RedactedLinkedIn,
    pub twitter: RedactedTwitter,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedLinkedIn {
    pub enabled: bool,
    pub connected: bool,
    #[serde(rename = "profileName")]
    pub profile_name: String,
    #[serde(rename = "profileId")]
    pub profile_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RedactedTwitter {
    pub enabled: bool,
    pub connected: bool,
    pub username: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl RedactedCredentials {
    /// Project a stored document down to its non-secret fields.
    /// `connected` means an access token is on file (ciphertext presence,
    /// no decryption needed).
    pub fn from_stored(creds: &UserCredentials) -> Self {
        Self {
            platforms: RedactedPlatforms {
                linkedin: RedactedLinkedIn {
                    enabled: creds.platforms.linkedin.enabled,
                    connected: !creds.platforms.linkedin.access_token.is_empty(),
                    profile_name: creds.platforms.linkedin.profile_name.clone(),
                    profile_id: creds.platforms.linkedin.profile_id.clone(),
                },
                twitter: RedactedTwitter {
                    enabled: creds.platforms.twitter.enabled,
                    connected: !creds.platforms.twitter.access_token.is_empty(),
                    username: creds.platforms.twitter.username.clone(),
                    user_id: creds.platforms.twitter.user_id.clone(),
                },
            },
        }
    }
}
