use anyhow::Context;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!(
                "STORAGE_BACKEND must be 'postgres', 'sqlite' or 'memory', got '{}'",
                other
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        }
    }
}

/// SQLite file used when `STORAGE_BACKEND=sqlite` and no URL is given.
pub const DEFAULT_SQLITE_URL: &str = "sqlite://store.db";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = lookup("STORAGE_BACKEND")
            .map(|raw| raw.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::Postgres);

        let mut database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        match storage_backend {
            StorageBackend::Postgres if database_url.is_none() => {
                anyhow::bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
            }
            StorageBackend::Sqlite if database_url.is_none() => {
                database_url = Some(DEFAULT_SQLITE_URL.to_string());
            }
            _ => {}
        }

        Ok(Config {
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("SERVER_PORT must be a valid port number")?,
            storage_backend,
            database_url,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS").map(|raw| parse_origins(&raw)),
            log_format: lookup("LOG_FORMAT")
                .map(|raw| raw.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(LogFormat::Text),
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL is not set")
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
