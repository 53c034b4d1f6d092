//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore.
///
/// `user_credentials` and `posts` reference users by id with no cascade:
/// deleting a user document does not remove its dependents. No flow in this
/// service hard-deletes users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Random hex document ID
    pub id: String,
    /// Display name (absent for accounts created via the OAuth callback)
    pub name: Option<String>,
    /// Email address (unique across users)
    pub email: String,
    /// Argon2id PHC hash; absent until the user registers a password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Legacy per-user platform tokens (kept for the PUT /api/user/tokens flow)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_token: Option<String>,
    /// When the LinkedIn token expires (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_token_expiry: Option<String>,
    /// Person URN cached for faster posting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_person_urn: Option<String>,
    /// When the account was created
    pub created_at: String,
    /// Last mutation timestamp
    pub updated_at: String,
}

impl User {
    /// Public view returned by the API: flags instead of token values.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            has_twitter_token: self.twitter_token.is_some(),
            has_linkedin_token: self.linkedin_token.is_some(),
            created_at: self.created_at.clone(),
        }
    }
}

/// User shape exposed over the API. Token values never leave the server.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    #[serde(rename = "hasTwitterToken")]
    pub has_twitter_token: bool,
    #[serde(rename = "hasLinkedinToken")]
    pub has_linkedin_token: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}
