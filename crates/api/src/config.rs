//! Application configuration loaded from environment variables.

use std::collections::HashMap;

use common::UserId;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT` — `text` or `json` (default: `text`)
/// - `DATABASE_URL` — SQLite URL (default: `"sqlite://cart.db"`)
/// - `DB_MAX_CONNECTIONS` — pool size (default: `5`)
/// - `SEED_DEMO_DATA` — seed the demo catalog when empty (default: `false`)
/// - `AUTH_TOKENS` — comma separated `token:userId` pairs (default: none)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: String,
    pub db_max_connections: u32,
    pub seed_demo_data: bool,
    pub auth_tokens: HashMap<String, UserId>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.db_max_connections),
            seed_demo_data: lookup("SEED_DEMO_DATA")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(defaults.seed_demo_data),
            auth_tokens: lookup("AUTH_TOKENS")
                .map(|v| parse_auth_tokens(&v))
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: "sqlite://cart.db".to_string(),
            db_max_connections: 5,
            seed_demo_data: false,
            auth_tokens: HashMap::new(),
        }
    }
}

/// Parses `token:userId` pairs separated by commas.
///
/// Entries without a colon, with an empty token, or with a user id that is
/// not a positive integer are skipped.
pub fn parse_auth_tokens(value: &str) -> HashMap<String, UserId> {
    value
        .split(',')
        .filter_map(|entry| {
            let (token, user_id) = entry.trim().split_once(':')?;
            let token = token.trim();
            let user_id = UserId::new(user_id.trim().parse().ok()?);
            (!token.is_empty() && user_id.is_valid()).then(|| (token.to_string(), user_id))
        })
        .collect()
}
