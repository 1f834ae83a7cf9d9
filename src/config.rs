//! Model endpoint and database configuration.
//!
//! Everything comes from environment variables. A `.env` file is honoured by
//! the binary through `dotenvy`; [`AppConfig::from_lookup`] accepts any key
//! lookup so configuration can be built from a map in tests.

use crate::types::{NlqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default PostgreSQL port.
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Chat model endpoint settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Model name (e.g., "gpt-3.5-turbo")
    pub model: String,
    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ModelConfig {
    /// Build from a key lookup.
    ///
    /// Reads `OPENAI_API_KEY` (required), `OPENAI_MODEL` and `OPENAI_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::ConfigError` if the API key is missing or empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| NlqError::config("OPENAI_API_KEY environment variable not set"))?;

        Ok(Self {
            api_key,
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Full chat completions URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// PostgreSQL connection settings.
///
/// Passed to the executor at construction; a connection is opened from it for
/// every query and closed afterwards.
#[derive(Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl PostgresConfig {
    /// Build from a key lookup.
    ///
    /// Reads `POSTGRES_HOST`, `POSTGRES_PORT` (default 5432), `POSTGRES_USER`,
    /// `POSTGRES_PASSWORD` and `POSTGRES_DATABASE`.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::ConfigError` if a required variable is missing or the
    /// port is not a number
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| NlqError::config(format!("{} environment variable not set", key)))
        };

        let port = match lookup("POSTGRES_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| NlqError::config(format!("Invalid POSTGRES_PORT '{}': {}", raw, e)))?,
            None => DEFAULT_POSTGRES_PORT,
        };

        Ok(Self {
            host: required("POSTGRES_HOST")?,
            port,
            user: required("POSTGRES_USER")?,
            password: required("POSTGRES_PASSWORD")?,
            database: required("POSTGRES_DATABASE")?,
        })
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Driver configuration for `tokio_postgres::Config::connect`.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.database)
            .application_name("weather-nlq");
        config
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub postgres: PostgresConfig,
}

impl AppConfig {
    /// Build from a key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            model: ModelConfig::from_lookup(&lookup)?,
            postgres: PostgresConfig::from_lookup(&lookup)?,
        })
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Build from a `.env` style file, falling back to the process
    /// environment for keys the file does not set.
    ///
    /// # Errors
    ///
    /// Returns `NlqError::ConfigError` if the file cannot be read or parsed,
    /// or if required settings are missing from both sources
    pub fn from_env_file(path: &Path) -> Result<Self> {
        let vars = read_env_file(path)?;
        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| env_lookup(key)))
    }
}

/// Read a `.env` style file into a map without touching the process environment.
///
/// # Errors
///
/// Returns `NlqError::ConfigError` if the file cannot be read or a line does
/// not parse
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .map_err(|e| NlqError::config(format!("Cannot read {}: {}", path.display(), e)))?;

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) =
            item.map_err(|e| NlqError::config(format!("Invalid line in {}: {}", path.display(), e)))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
