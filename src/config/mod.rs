//! Configuration module for the member search backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Populate two teams and sample members on startup (local profile)
    pub seed_sample_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_path = env::var("MEMBERS_DB_PATH")
            .unwrap_or_else(|_| "./data/members.sqlite".to_string())
            .into();

        let bind_addr_raw =
            env::var("MEMBERS_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr_raw.parse().map_err(|e| {
            AppError::Internal(format!(
                "Invalid MEMBERS_BIND_ADDR '{}': {}",
                bind_addr_raw, e
            ))
        })?;

        let log_level = env::var("MEMBERS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let seed_sample_data = env::var("MEMBERS_SEED_SAMPLE_DATA")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            seed_sample_data,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
