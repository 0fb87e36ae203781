//! services/web/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::net::SocketAddr;

use reqwest::Url;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// OAuth provider endpoints and client credentials.
#[derive(Clone, Debug)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Where browsers are sent to authorize.
    pub auth_url: Url,
    /// Where the authorization code is exchanged for a token.
    pub token_url: Url,
    /// Where the token is resolved to an account (username).
    pub account_url: Url,
    /// Our callback URL, registered with the provider.
    pub redirect_url: Url,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub oauth: OauthConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to keep tests
    /// hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let oauth = OauthConfig {
            client_id: require_var("OAUTH_CLIENT_ID")?,
            client_secret: require_var("OAUTH_CLIENT_SECRET")?,
            auth_url: url_var("OAUTH_AUTH_URL", "https://lichess.org/oauth")?,
            token_url: url_var("OAUTH_TOKEN_URL", "https://lichess.org/api/token")?,
            account_url: url_var("OAUTH_ACCOUNT_URL", "https://lichess.org/api/account")?,
            redirect_url: url_var("OAUTH_REDIRECT_URL", "http://localhost:3000/oauth-callback")?,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            oauth,
        })
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn url_var(name: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
