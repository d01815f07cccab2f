//! Application settings loaded from environment variables.

use std::env;
use std::path::PathBuf;

use super::constants::{
    DEFAULT_ACCESS_TOKEN_MINUTES, DEFAULT_DATABASE_URL, DEFAULT_REFRESH_TOKEN_DAYS,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEV_JWT_SECRET, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Optional JSON file replacing the built-in group/city tables
    pub access_policy_path: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_minutes", &self.access_token_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("access_policy_path", &self.access_policy_path)
            .finish()
    }
}

impl Config {
    /// Build a configuration with default lifetimes and server address.
    ///
    /// # Errors
    /// Returns an internal error if the JWT secret is shorter than
    /// [`MIN_JWT_SECRET_LENGTH`].
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: database_url.into(),
            jwt_secret,
            access_token_minutes: DEFAULT_ACCESS_TOKEN_MINUTES,
            refresh_token_days: DEFAULT_REFRESH_TOKEN_DAYS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            access_policy_path: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// `JWT_SECRET` is mandatory in release builds; debug builds fall back to
    /// an insecure development key and log a warning.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEV_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let mut config = Self::new(database_url, jwt_secret)?;

        if let Some(minutes) = parse_var("JWT_ACCESS_TOKEN_MINUTES") {
            config.access_token_minutes = minutes;
        }
        if let Some(days) = parse_var("JWT_REFRESH_TOKEN_DAYS") {
            config.refresh_token_days = days;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        if let Some(port) = parse_var("SERVER_PORT") {
            config.server_port = port;
        }
        config.access_policy_path = env::var("CONFIG_PATH").ok().map(PathBuf::from);

        Ok(config)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
