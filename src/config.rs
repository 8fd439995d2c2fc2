//! Application configuration loaded from environment variables.
//!
//! Token secrets are read once at startup and held in memory; each token
//! kind has its own secret and expiry so a leaked access secret cannot be
//! used to mint refresh tokens.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (or emulator project for local dev)
    pub gcp_project_id: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Base URL of the external media host
    pub media_host_url: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Access token signing key (raw bytes)
    pub access_token_secret: Vec<u8>,
    /// Refresh token signing key (raw bytes)
    pub refresh_token_secret: Vec<u8>,

    // --- Tunables ---
    /// Access token lifetime in seconds (short-lived)
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds (long-lived)
    pub refresh_token_ttl_secs: u64,
    /// bcrypt work factor for password hashing
    pub bcrypt_cost: u32,
}

impl Config {
    const DEFAULT_ACCESS_TTL_SECS: u64 = 15 * 60;
    const DEFAULT_REFRESH_TTL_SECS: u64 = 10 * 24 * 60 * 60;

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            media_host_url: env::var("MEDIA_HOST_URL")
                .map_err(|_| ConfigError::Missing("MEDIA_HOST_URL"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?
                .into_bytes(),
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .map_err(|_| ConfigError::Missing("REFRESH_TOKEN_SECRET"))?
                .into_bytes(),

            access_token_ttl_secs: parse_or("ACCESS_TOKEN_TTL_SECS", Self::DEFAULT_ACCESS_TTL_SECS),
            refresh_token_ttl_secs: parse_or(
                "REFRESH_TOKEN_TTL_SECS",
                Self::DEFAULT_REFRESH_TTL_SECS,
            ),
            bcrypt_cost: parse_or("BCRYPT_COST", u64::from(bcrypt::DEFAULT_COST)) as u32,
        })
    }

    /// Default config for tests: distinct per-kind secrets and the minimum
    /// bcrypt cost so hashing does not dominate test time.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            media_host_url: "http://localhost:9199".to_string(),
            port: 8080,
            access_token_secret: b"test_access_secret_32_bytes_min!".to_vec(),
            refresh_token_secret: b"test_refresh_secret_32_bytes_ok!".to_vec(),
            access_token_ttl_secs: Self::DEFAULT_ACCESS_TTL_SECS,
            refresh_token_ttl_secs: Self::DEFAULT_REFRESH_TTL_SECS,
            bcrypt_cost: 4, // lowest cost bcrypt accepts
        }
    }
}

fn parse_or(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
