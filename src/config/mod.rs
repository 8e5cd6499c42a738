//! Configuration module for the MuniServe backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default Gemini model used for grievance triage.
pub const DEFAULT_TRIAGE_MODEL: &str = "gemini-3-flash-preview";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// API key for the Gemini triage advisor; absence degrades triage to
    /// its fallback classification, it never blocks grievance creation
    pub gemini_api_key: Option<String>,
    /// Base URL of the generative language API
    pub gemini_base_url: String,
    /// Model used for triage classification
    pub triage_model: String,
    /// Upper bound on a single triage call, in seconds
    pub triage_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("MUNISERVE_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let bind_addr = env::var("MUNISERVE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid MUNISERVE_BIND_ADDR format");

        let log_level = env::var("MUNISERVE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let gemini_api_key = env::var("MUNISERVE_GEMINI_API_KEY").ok();

        let gemini_base_url = env::var("MUNISERVE_GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let triage_model =
            env::var("MUNISERVE_TRIAGE_MODEL").unwrap_or_else(|_| DEFAULT_TRIAGE_MODEL.to_string());

        let triage_timeout_secs = env::var("MUNISERVE_TRIAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            db_path,
            bind_addr,
            log_level,
            gemini_api_key,
            gemini_base_url,
            triage_model,
            triage_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("MUNISERVE_DB_PATH");
        env::remove_var("MUNISERVE_BIND_ADDR");
        env::remove_var("MUNISERVE_LOG_LEVEL");
        env::remove_var("MUNISERVE_GEMINI_API_KEY");
        env::remove_var("MUNISERVE_GEMINI_BASE_URL");
        env::remove_var("MUNISERVE_TRIAGE_MODEL");
        env::remove_var("MUNISERVE_TRIAGE_TIMEOUT_SECS");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.triage_model, DEFAULT_TRIAGE_MODEL);
        assert_eq!(config.triage_timeout_secs, 10);
    }
}
