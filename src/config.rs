//! Application configuration loaded from environment variables.
//!
//! Both processes (API server and admin bot) read the same variables, so a
//! single `.env` file configures the whole deployment.

use std::collections::HashSet;
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Datastore ---
    /// MongoDB connection string
    pub mongo_uri: String,
    /// Database name
    pub mongo_db: String,
    /// Collection holding ride requests
    pub mongo_collection: String,

    // --- Telegram ---
    /// Bot credential; absent disables notifications entirely
    pub bot_token: Option<String>,
    /// Destination chat for new-request notifications
    pub notify_chat_id: Option<String>,
    /// Optional forum topic within the destination chat
    pub notify_thread_id: Option<i64>,
    /// Operator ids allowed to use the admin bot; empty set allows everyone
    pub allowed_ids: HashSet<String>,

    // --- HTTP ---
    /// Shared secret for the delete endpoint; absent forbids all deletes
    pub delete_token: Option<String>,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Directory of static form assets served at the router fallback
    pub static_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            mongo_uri: env::var("MONGO_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db: env::var("MONGO_DB").unwrap_or_else(|_| "ride".to_string()),
            mongo_collection: env::var("MONGO_COLLECTION")
                .unwrap_or_else(|_| "requests".to_string()),

            bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .or_else(|_| env::var("BOT_TOKEN"))
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            notify_chat_id: env::var("TELEGRAM_CHAT_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            notify_thread_id: env::var("TELEGRAM_THREAD_ID")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            allowed_ids: parse_id_list(env::var("BOT_ALLOWED_IDS").ok().as_deref()),

            delete_token: env::var("DELETE_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
        })
    }

    /// Bot token, required for the admin bot process.
    pub fn require_bot_token(&self) -> Result<&str, ConfigError> {
        self.bot_token
            .as_deref()
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            mongo_uri: "mongodb://localhost:27017".to_string(),
            mongo_db: "ride_test".to_string(),
            mongo_collection: "requests".to_string(),
            bot_token: None,
            notify_chat_id: None,
            notify_thread_id: None,
            allowed_ids: HashSet::new(),
            delete_token: Some("test_delete_token".to_string()),
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: "static".to_string(),
        }
    }
}

/// Parse a comma-separated id list, dropping empty entries.
fn parse_id_list(raw: Option<&str>) -> HashSet<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        let ids = parse_id_list(Some("123, 456,,789 "));
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("123"));
        assert!(ids.contains("456"));
        assert!(ids.contains("789"));
    }

    #[test]
    fn test_parse_id_list_empty() {
        assert!(parse_id_list(None).is_empty());
        assert!(parse_id_list(Some("")).is_empty());
        assert!(parse_id_list(Some(" , ")).is_empty());
    }

    #[test]
    fn test_require_bot_token() {
        let mut config = Config::test_default();
        assert!(config.require_bot_token().is_err());

        config.bot_token = Some("123:abc".to_string());
        assert_eq!(config.require_bot_token().unwrap(), "123:abc");
    }
}
