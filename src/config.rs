//! Service configuration
//!
//! Built once at startup from the environment (after `.env` is loaded) and
//! shared read-only afterwards.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEZONE_URL: &str = "https://timeapi.io/api/TimeZone/coordinate";
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8100";

/// Where birth charts get computed.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineConfig {
    Http { url: String },
    Process { program: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub title: String,
    pub description: String,
    pub version: String,
    pub bind_addr: String,
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout: Duration,
    pub timezone_url: String,
    pub engine: EngineConfig,
    /// Used when a request carries no name.
    pub default_name: String,
    pub otel_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            title: "Vedic Astrology API".to_string(),
            description: "Returns full Vedic charts (including all divisional charts) as JSON.".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            bind_addr: "0.0.0.0:8000".to_string(),
            allowed_origins: vec!["*".to_string()],
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_user_agent: "vedic-astrology-api".to_string(),
            geocoder_timeout: Duration::from_secs(10),
            timezone_url: DEFAULT_TIMEZONE_URL.to_string(),
            engine: EngineConfig::Http {
                url: DEFAULT_ENGINE_URL.to_string(),
            },
            default_name: "User".to_string(),
            otel_enabled: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Reads settings through `get`; unset or blank keys keep their defaults.
    pub fn from_source<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(v) = get("API_TITLE") {
            config.title = v;
        }
        if let Some(v) = get("API_DESCRIPTION") {
            config.description = v;
        }
        if let Some(v) = get("API_VERSION") {
            config.version = v;
        }
        if let Some(v) = get("BIND_ADDR") {
            config.bind_addr = v;
        } else if let Some(port) = get("PORT") {
            config.bind_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(v) = get("ALLOWED_ORIGINS") {
            config.allowed_origins = split_list(&v, ',');
        }
        if let Some(v) = get("GEOCODER_URL") {
            config.geocoder_url = v;
        }
        if let Some(v) = get("GEOCODER_USER_AGENT") {
            config.geocoder_user_agent = v;
        }
        if let Some(v) = get("GEOCODER_TIMEOUT_SECS") {
            let secs: f64 = v
                .parse()
                .with_context(|| format!("GEOCODER_TIMEOUT_SECS must be a number, got '{}'", v))?;
            config.geocoder_timeout = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("GEOCODER_TIMEOUT_SECS out of range: {}", secs))?;
        }
        if let Some(v) = get("TIMEZONE_URL") {
            config.timezone_url = v;
        }
        if let Some(program) = get("ENGINE_COMMAND") {
            config.engine = EngineConfig::Process {
                program,
                args: get("ENGINE_ARGS").map(|a| split_list(&a, ' ')).unwrap_or_default(),
            };
        } else if let Some(url) = get("ENGINE_URL") {
            config.engine = EngineConfig::Http { url };
        }
        if let Some(v) = get("DEFAULT_NAME") {
            config.default_name = v;
        }
        if let Some(v) = get("OTEL_ENABLED") {
            config.otel_enabled = matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        Ok(config)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

fn split_list(value: &str, sep: char) -> Vec<String> {
    value
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
