//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Path of the JSON-array log file
    pub log_file: String,

    /// Directory where uploaded files are stored
    pub upload_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),

            log_file: env::var("WEBTRAIL_LOG_FILE")
                .unwrap_or_else(|_| "logs/access_logs.json".to_string()),

            upload_dir: env::var("WEBTRAIL_UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string()),
        }
    }
}
