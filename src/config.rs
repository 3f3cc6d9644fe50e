//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup; provider endpoint URLs are overridable so tests
//! can point the verifiers at a local mock server.

use std::env;

const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const DEFAULT_APPLE_KEYS_URL: &str = "https://appleid.apple.com/auth/keys";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Audience expected in Apple identity tokens (the app's client ID)
    pub apple_client_id: String,
    /// Google userinfo endpoint (overridable for tests)
    pub google_userinfo_url: String,
    /// Apple public-key-set endpoint (overridable for tests)
    pub apple_keys_url: String,
    /// Server port
    pub port: u16,
    /// HS256 signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            apple_client_id: "com.example.test-app".to_string(),
            google_userinfo_url: DEFAULT_GOOGLE_USERINFO_URL.to_string(),
            apple_keys_url: DEFAULT_APPLE_KEYS_URL.to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            apple_client_id: env::var("APPLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("APPLE_CLIENT_ID"))?,
            google_userinfo_url: env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_USERINFO_URL.to_string()),
            apple_keys_url: env::var("APPLE_KEYS_URL")
                .unwrap_or_else(|_| DEFAULT_APPLE_KEYS_URL.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
