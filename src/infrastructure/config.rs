//! Application configuration

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::outbound::Locale;

/// Which remote campaign store to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteBackend {
    Sqlite,
    /// Campaigns are lost when the process exits; useful for demos
    Memory,
}

impl std::str::FromStr for RemoteBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(RemoteBackend::Sqlite),
            "memory" => Ok(RemoteBackend::Memory),
            other => Err(format!("Unknown remote backend '{}'", other)),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server port
    pub server_port: u16,

    /// SQLite URL for accounts and the remote campaign store
    pub database_url: String,
    pub remote_backend: RemoteBackend,

    /// Directory for the local fallback list and write-ahead journals
    pub data_dir: PathBuf,

    /// Language for authentication messages
    pub locale: Locale,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_port: env::var("CHAOSBAG_SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("CHAOSBAG_SERVER_PORT must be a valid port number")?,

            database_url: env::var("CHAOSBAG_DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://chaos_bag.db".to_string()),
            remote_backend: env::var("CHAOSBAG_REMOTE_BACKEND")
                .unwrap_or_else(|_| "sqlite".to_string())
                .parse()
                .map_err(anyhow::Error::msg)
                .context("CHAOSBAG_REMOTE_BACKEND must be 'sqlite' or 'memory'")?,

            data_dir: env::var("CHAOSBAG_DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),

            locale: env::var("CHAOSBAG_LOCALE")
                .unwrap_or_else(|_| "en".to_string())
                .parse()
                .map_err(anyhow::Error::msg)
                .context("CHAOSBAG_LOCALE must be 'en' or 'pt-br'")?,
        })
    }
}
