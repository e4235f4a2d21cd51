use std::time::Duration;

pub const DEMO_KEY: &str = "DEMO_KEY";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Process configuration, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub request_timeout: Duration,
    pub port: u16,
    /// Sessions untouched for this long are discarded.
    pub session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = get("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()).unwrap_or_else(|| DEMO_KEY.into());
        let api_base = get("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let timeout_secs = get("GEMINI_TIMEOUT_SECS").and_then(|v| v.parse().ok()).unwrap_or(120);
        let port = get("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080);
        let idle_minutes: u64 = get("SESSION_IDLE_MINUTES").and_then(|v| v.parse().ok()).unwrap_or(60);
        Self {
            api_key,
            api_base,
            request_timeout: Duration::from_secs(timeout_secs),
            port,
            session_idle: Duration::from_secs(idle_minutes * 60),
        }
    }

    pub fn demo_mode(&self) -> bool {
        self.api_key == DEMO_KEY
    }

    /// Key prefix that is safe to log.
    pub fn masked_key(&self) -> String {
        format!("{}...", crate::gemini::clip(&self.api_key, 6))
    }
}
