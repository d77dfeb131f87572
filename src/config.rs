// src/config.rs
use anyhow::{Context, Result};
use log::warn;
use std::env;

const DEFAULT_PORT: u16 = 3030;
const DEFAULT_QUERY_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub query_url: String,
    pub cookie_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        YahooConfig {
            query_url: DEFAULT_QUERY_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub yahoo: YahooConfig,
}

impl Settings {
    /// Reads settings from the process environment (call `dotenv()` first).
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a number, got '{}'", raw))?,
            Err(_) => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let timeout_secs = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number, got '{}'", raw))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let yahoo = YahooConfig {
            query_url: non_empty_var("YAHOO_QUERY_URL").unwrap_or_else(|| DEFAULT_QUERY_URL.to_string()),
            cookie_url: non_empty_var("YAHOO_COOKIE_URL").unwrap_or_else(|| DEFAULT_COOKIE_URL.to_string()),
            user_agent: non_empty_var("YAHOO_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout_secs,
        };

        Ok(Settings { port, yahoo })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}
