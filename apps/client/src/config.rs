use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_LIVE_JOBS_LOCATION: &str = "India";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Stands in for the `<meta name="csrf-token">` tag. Absent means the
    /// `X-CSRFToken` header is simply omitted.
    pub csrf_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub live_jobs_location: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let request_timeout_secs = match optional_env("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => None,
        };

        Ok(Config {
            api_url: optional_env("CAREER_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            csrf_token: optional_env("CSRF_TOKEN"),
            request_timeout_secs,
            live_jobs_location: optional_env("LIVE_JOBS_LOCATION")
                .unwrap_or_else(|| DEFAULT_LIVE_JOBS_LOCATION.to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            csrf_token: None,
            request_timeout_secs: None,
            live_jobs_location: DEFAULT_LIVE_JOBS_LOCATION.to_string(),
            rust_log: "info".to_string(),
        }
    }
}

/// Blank values count as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
