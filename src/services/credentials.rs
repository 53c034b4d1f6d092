// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store: per-user platform credentials, encrypted at rest.
//!
//! Secret-bearing fields are encrypted on every write; decryption is an
//! explicit projection into [`DecryptedCredentials`] that is never persisted.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::credentials::{
    DecryptedCredentials, DecryptedLinkedIn, DecryptedTwitter, UserCredentials,
};
use crate::models::Platform;
use crate::services::crypto::CredentialCipher;
use crate::time_utils::now_rfc3339;

/// Fields accepted when saving LinkedIn credentials.
#[derive(Debug, Default)]
pub struct LinkedInInput {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<String>,
    pub profile_id: String,
    pub profile_name: String,
}

/// Fields accepted when saving Twitter credentials.
#[derive(Debug, Default)]
pub struct TwitterInput {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
    pub username: String,
    pub user_id: String,
}

/// High-level credential store over Firestore plus the credential cipher.
#[derive(Clone)]
pub struct CredentialStore {
    db: FirestoreDb,
    cipher: CredentialCipher,
}

impl CredentialStore {
    pub fn new(db: FirestoreDb, cipher: CredentialCipher) -> Self {
        Self { db, cipher }
    }

    /// Get a user's credential document, creating the empty one lazily.
    pub async fn get_or_create(&self, user_id: &str) -> Result<UserCredentials, AppError> {
        if let Some(creds) = self.db.get_credentials(user_id).await? {
            return Ok(creds);
        }

        let creds = UserCredentials::empty(user_id, &now_rfc3339());
        self.db.set_credentials(&creds).await?;
        Ok(creds)
    }

    /// Get a user's credential document, if any.
    pub async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>, AppError> {
        self.db.get_credentials(user_id).await
    }

    /// Save LinkedIn credentials, enabling the platform. Secret fields are
    /// encrypted before the write.
    pub async fn set_linkedin(
        &self,
        user_id: &str,
        input: LinkedInInput,
    ) -> Result<UserCredentials, AppError> {
        let mut creds = self.get_or_create(user_id).await?;
        let slot = &mut creds.platforms.linkedin;

        slot.enabled = true;
        slot.client_id = input.client_id;
        slot.client_secret = self.cipher.encrypt(&input.client_secret)?;
        slot.access_token = self.cipher.encrypt(&input.access_token)?;
        slot.refresh_token = self.cipher.encrypt(&input.refresh_token)?;
        slot.expires_at = input.expires_at.unwrap_or_default();
        slot.profile_id = input.profile_id;
        slot.profile_name = input.profile_name;

        creds.updated_at = now_rfc3339();
        self.db.set_credentials(&creds).await?;
        Ok(creds)
    }

    /// Save Twitter credentials, enabling the platform. Secret fields are
    /// encrypted before the write.
    pub async fn set_twitter(
        &self,
        user_id: &str,
        input: TwitterInput,
    ) -> Result<UserCredentials, AppError> {
        let mut creds = self.get_or_create(user_id).await?;
        let slot = &mut creds.platforms.twitter;

        slot.enabled = true;
        slot.api_key = input.api_key;
        slot.api_secret = self.cipher.encrypt(&input.api_secret)?;
        slot.access_token = self.cipher.encrypt(&input.access_token)?;
        slot.access_secret = self.cipher.encrypt(&input.access_secret)?;
        slot.username = input.username;
        slot.user_id = input.user_id;

        creds.updated_at = now_rfc3339();
        self.db.set_credentials(&creds).await?;
        Ok(creds)
    }

    /// Update the LinkedIn token fields after an OAuth exchange, when the
    /// user already has a credential document. The OAuth callback also
    /// writes the token to the legacy user fields, so a missing document is
    /// not an error here.
    pub async fn mirror_linkedin_token(
        &self,
        user_id: &str,
        access_token: &str,
        expires_at: &str,
        profile_id: &str,
        profile_name: &str,
    ) -> Result<(), AppError> {
        let Some(mut creds) = self.db.get_credentials(user_id).await? else {
            return Ok(());
        };

        let slot = &mut creds.platforms.linkedin;
        slot.enabled = true;
        slot.access_token = self.cipher.encrypt(access_token)?;
        slot.expires_at = expires_at.to_string();
        if !profile_id.is_empty() {
            slot.profile_id = profile_id.to_string();
        }
        if !profile_name.is_empty() {
            slot.profile_name = profile_name.to_string();
        }

        creds.updated_at = now_rfc3339();
        self.db.set_credentials(&creds).await
    }

    /// Disable a platform: flip `enabled` off and clear the
    /// access-token-class secrets. API keys and profile metadata stay, so
    /// Twitter can be re-enabled without re-entering keys; LinkedIn needs a
    /// fresh OAuth round since its tokens are wiped.
    pub async fn disable(&self, user_id: &str, platform: Platform) -> Result<(), AppError> {
        let Some(mut creds) = self.db.get_credentials(user_id).await? else {
            return Ok(());
        };

        match platform {
            Platform::LinkedIn => {
                let slot = &mut creds.platforms.linkedin;
                slot.enabled = false;
                slot.access_token.clear();
                slot.refresh_token.clear();
            }
            Platform::Twitter => {
                let slot = &mut creds.platforms.twitter;
                slot.enabled = false;
                slot.access_token.clear();
                slot.access_secret.clear();
            }
        }

        creds.updated_at = now_rfc3339();
        self.db.set_credentials(&creds).await
    }

    /// Decrypt a stored document into its plaintext view.
    ///
    /// Pure projection: fields that are empty or fail to decrypt come back
    /// as `None`; one unreadable field never fails the record.
    pub fn decrypt(&self, creds: &UserCredentials) -> DecryptedCredentials {
        let li = &creds.platforms.linkedin;
        let tw = &creds.platforms.twitter;

        DecryptedCredentials {
            linkedin: DecryptedLinkedIn {
                enabled: li.enabled,
                client_id: li.client_id.clone(),
                client_secret: self.cipher.decrypt(&li.client_secret),
                access_token: self.cipher.decrypt(&li.access_token),
                refresh_token: self.cipher.decrypt(&li.refresh_token),
                expires_at: (!li.expires_at.is_empty()).then(|| li.expires_at.clone()),
                profile_id: (!li.profile_id.is_empty()).then(|| li.profile_id.clone()),
                profile_name: (!li.profile_name.is_empty()).then(|| li.profile_name.clone()),
            },
            twitter: DecryptedTwitter {
                enabled: tw.enabled,
                api_key: (!tw.api_key.is_empty()).then(|| tw.api_key.clone()),
                api_secret: self.cipher.decrypt(&tw.api_secret),
                access_token: self.cipher.decrypt(&tw.access_token),
                access_secret: self.cipher.decrypt(&tw.access_secret),
            },
        }
    }
}
