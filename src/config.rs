//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and cached in memory. For local
//! development they come from a `.env` file; in production the deployment
//! environment injects them as environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Public base URL of this API (used to build OAuth redirect URIs)
    pub base_url: String,
    /// Frontend URL for post-OAuth redirects and CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Key material for credential encryption at rest.
    /// Falls back to the JWT secret when CRED_ENCRYPTION_KEY is unset.
    pub credential_key: Vec<u8>,
    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
    /// LinkedIn OAuth app credentials (server-level; users may also store
    /// their own per-account client id/secret in the credential store)
    pub linkedin_client_id: String,
    pub linkedin_client_secret: String,
    /// Explicit LinkedIn redirect URI override
    pub linkedin_redirect_uri: Option<String>,
    /// Legacy single-tenant Twitter credentials. Only consulted when a user
    /// has no Twitter credentials of their own.
    pub twitter_fallback: Option<TwitterEnvCredentials>,
}

/// Twitter API credentials sourced from the environment (legacy mode).
#[derive(Debug, Clone)]
pub struct TwitterEnvCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            credential_key: b"test_credential_key_32_bytes!!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
            linkedin_client_id: "test_client_id".to_string(),
            linkedin_client_secret: "test_client_secret".to_string(),
            linkedin_redirect_uri: None,
            twitter_fallback: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();

        // The credential cipher falls back to the JWT secret so a minimal
        // deployment still encrypts at rest, but a dedicated key is preferred.
        let credential_key = env::var("CRED_ENCRYPTION_KEY")
            .map(String::into_bytes)
            .unwrap_or_else(|_| jwt_signing_key.clone());

        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(String::into_bytes)
            .unwrap_or_else(|_| jwt_signing_key.clone());

        Ok(Self {
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            jwt_signing_key,
            credential_key,
            oauth_state_key,

            linkedin_client_id: env::var("LINKEDIN_CLIENT_ID").unwrap_or_default(),
            linkedin_client_secret: env::var("LINKEDIN_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            linkedin_redirect_uri: env::var("LINKEDIN_REDIRECT_URI").ok(),

            twitter_fallback: Self::twitter_from_env(),
        })
    }

    /// Legacy single-tenant Twitter credentials, present only when all four
    /// variables are set.
    fn twitter_from_env() -> Option<TwitterEnvCredentials> {
        Some(TwitterEnvCredentials {
            api_key: env::var("TWITTER_API_KEY").ok()?,
            api_secret: env::var("TWITTER_API_SECRET").ok()?,
            access_token: env::var("TWITTER_ACCESS_TOKEN").ok()?,
            access_secret: env::var("TWITTER_ACCESS_SECRET").ok()?,
        })
    }

    /// The redirect URI registered with the LinkedIn app.
    pub fn linkedin_redirect_uri(&self) -> String {
        self.linkedin_redirect_uri
            .clone()
            .unwrap_or_else(|| format!("{}/auth/linkedin/callback", self.base_url))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SECRET", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("CRED_ENCRYPTION_KEY");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        // Credential key falls back to the JWT secret
        assert_eq!(config.credential_key, config.jwt_signing_key);
    }

    #[test]
    fn test_linkedin_redirect_uri_default() {
        let config = Config::default();
        assert_eq!(
            config.linkedin_redirect_uri(),
            "http://localhost:8080/auth/linkedin/callback"
        );
    }

    #[test]
    fn test_twitter_fallback_requires_all_four() {
        env::set_var("TWITTER_API_KEY", "k");
        env::set_var("TWITTER_API_SECRET", "s");
        env::remove_var("TWITTER_ACCESS_TOKEN");
        env::remove_var("TWITTER_ACCESS_SECRET");

        assert!(Config::twitter_from_env().is_none());
    }
}
