//! Server configuration, read from a TOML file. Every field has a default, so a missing
//! file is fine. Database credentials are never read from the file; they come from
//! `PSQL_NAME` and `PSQL_PASS`.

use std::{env::var, path::Path};

use serde::Deserialize;
use tracing::Level;

pub const CONFIG_ENV: &str = "PEAK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "peak.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    pub log_level: String,
    pub store: StoreKind,
    pub session_hours: i64,
    pub database: DatabaseConfig,
    pub scoring: ScoringConfig,
    pub tls: Option<TlsConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:9090".into(),
            log_level: "info".into(),
            store: StoreKind::Postgres,
            session_hours: 1,
            database: DatabaseConfig::default(),
            scoring: ScoringConfig::default(),
            tls: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/evaluate/".into(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub cert: String,
    pub key: String,
}

impl Config {
    /// Loads from `$PEAK_CONFIG`, or `peak.toml` in the working directory.
    pub fn load() -> Result<Self, String> {
        let path = var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_file(path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Could not read {}: {e}", path.display()))?;
        Self::parse(&contents).map_err(|e| format!("Invalid config {}: {e}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Unrecognized levels fall back to INFO.
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }

    /// Reads the database login from the environment.
    pub fn database_credentials() -> Result<(String, String), String> {
        let Ok(name) = var("PSQL_NAME") else {
            return Err("PSQL_NAME environment variable not present".into());
        };
        let Ok(pass) = var("PSQL_PASS") else {
            return Err("PSQL_PASS environment variable not present".into());
        };
        Ok((name, pass))
    }
}
