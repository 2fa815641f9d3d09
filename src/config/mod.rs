use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::auth::password::MIN_ITERATIONS;

/// Shortest signing secret accepted outside development
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LEN} bytes in {0:?}, got {1}")]
    WeakSecret(Environment, usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiration_minutes: i64,
    pub password_hash_iterations: u32,
    pub password_hash_concurrency: usize,
    pub token_blacklist_purge_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub content_base_path: PathBuf,
}

impl AppConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (environment, test maps)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup);

        config.validate()?;
        Ok(config)
    }

    fn with_overrides(mut self, lookup: &impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("API_PREFIX") {
            self.server.api_prefix = normalize_prefix(&v);
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs = v.parse().unwrap_or(self.database.connect_timeout_secs);
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Some(v) = lookup("JWT_AUDIENCE") {
            self.security.jwt_audience = v;
        }
        if let Some(v) = lookup("JWT_EXPIRATION_MINUTES") {
            self.security.jwt_expiration_minutes = v
                .parse()
                .ok()
                .filter(|m: &i64| *m > 0)
                .unwrap_or(self.security.jwt_expiration_minutes);
        }
        if let Some(v) = lookup("PASSWORD_HASH_ITERATIONS") {
            let iterations: u32 = v.parse().unwrap_or(self.security.password_hash_iterations);
            self.security.password_hash_iterations = iterations.max(MIN_ITERATIONS);
        }
        if let Some(v) = lookup("PASSWORD_HASH_CONCURRENCY") {
            self.security.password_hash_concurrency = v
                .parse()
                .ok()
                .filter(|n: &usize| *n > 0)
                .unwrap_or(self.security.password_hash_concurrency);
        }
        if let Some(v) = lookup("TOKEN_BLACKLIST_PURGE_SECS") {
            self.security.token_blacklist_purge_secs = v
                .parse()
                .ok()
                .filter(|s: &u64| *s > 0)
                .unwrap_or(self.security.token_blacklist_purge_secs);
        }

        // Storage overrides
        if let Some(v) = lookup("CONTENT_BASE_PATH") {
            self.storage.content_base_path = PathBuf::from(v);
        }

        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.environment != Environment::Development
            && self.security.jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(ConfigError::WeakSecret(
                self.environment,
                self.security.jwt_secret.len(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                api_prefix: "/talearc/api".to_string(),
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connect_timeout_secs: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_issuer: "talearc".to_string(),
                jwt_audience: "talearc-api".to_string(),
                jwt_expiration_minutes: 60,
                password_hash_iterations: MIN_ITERATIONS,
                password_hash_concurrency: 4,
                token_blacklist_purge_secs: 3600,
            },
            storage: StorageConfig {
                content_base_path: PathBuf::from("content"),
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.server.host = "0.0.0.0".to_string();
        config.server.cors_origins = vec!["https://staging.talearc.app".to_string()];
        config.database.max_connections = 20;
        config.database.connect_timeout_secs = 10;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.host = "0.0.0.0".to_string();
        config.server.cors_origins = vec!["https://talearc.app".to_string()];
        config.database.max_connections = 50;
        config.database.connect_timeout_secs = 5;
        config.security.password_hash_concurrency = 8;
        config
    }
}

/// Leading slash, no trailing slash; an empty prefix mounts at the root
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
