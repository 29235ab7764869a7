use std::env;

use dotenvy::dotenv;

pub const DEFAULT_DATABASE_URL: &str = "app.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5555";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
}

impl Config {
    /// Reads `DB_URI` and `BIND_ADDRESS`, after loading `.env` if present.
    pub fn from_env() -> Self {
        dotenv().ok();

        Self::from_vars(env::var("DB_URI").ok(), env::var("BIND_ADDRESS").ok())
    }

    fn from_vars(db_uri: Option<String>, bind_address: Option<String>) -> Self {
        Self {
            database_url: db_uri
                .as_deref()
                .map(database_path)
                .unwrap_or(DEFAULT_DATABASE_URL)
                .to_string(),
            bind_address: bind_address.unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
        }
    }
}

/// Accepts both a bare SQLite path and a `sqlite:///path` URI.
pub fn database_path(db_uri: &str) -> &str {
    db_uri.strip_prefix("sqlite:///").unwrap_or(db_uri)
}
