use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Every variable is optional: without `DATABASE_URL` the service runs on the
/// in-memory store, and without `GEMINI_API_KEY` callers must supply their own key.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    /// Ambient generation credential. A per-request key takes precedence.
    pub gemini_api_key: Option<String>,
    /// Seeds a session in the in-memory store so the API is usable locally.
    pub dev_session_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            dev_session_token: optional_env("DEV_SESSION_TOKEN"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(non_blank)
}

/// Treats empty values and the literal string `"undefined"` (what a misconfigured
/// deployment injects) as absent.
pub fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Two-tier credential resolution: the per-request override wins over the ambient key.
/// Evaluated once per generation call.
pub fn resolve_credential(override_key: Option<&str>, ambient: Option<&str>) -> Option<String> {
    override_key
        .map(str::to_string)
        .and_then(non_blank)
        .or_else(|| ambient.map(str::to_string).and_then(non_blank))
}
