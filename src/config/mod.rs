/// Application configuration module
use anyhow::{bail, Context};
use std::env;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://vitemadose.gitlab.io/vitemadose";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub listen_addr: String,
    pub departments: Vec<String>,
    pub refresh_seconds: u64,
    pub http_timeout_seconds: u64,
    /// Minimum chronodose slots before a centre is flagged
    pub chronodose_min: i64,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("VMD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = validate_api_url(&api_url)?;

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let departments = env::var("VMD_DEPARTMENTS")
            .map(|raw| parse_departments(&raw))
            .unwrap_or_default();

        Ok(Self {
            api_url,
            listen_addr,
            departments,
            refresh_seconds: env_parse("REFRESH_EVERY_SECONDS", 300),
            http_timeout_seconds: env_parse("HTTP_TIMEOUT_SECONDS", 30),
            chronodose_min: env_parse("CHRONODOSE_MIN_COUNT", 2),
        })
    }
}

/// Split a comma separated department list, dropping blanks
pub fn parse_departments(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_api_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw).with_context(|| format!("VMD_API_URL is not a valid URL: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        scheme => bail!("VMD_API_URL uses unsupported scheme {}", scheme),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
