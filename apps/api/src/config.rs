use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::risk::profile::CANONICAL_PROFILE;

pub const MEDICAL_DISCLAIMER: &str = "This AI tool is for informational purposes only and \
    does not replace professional medical advice.";

const DEFAULT_MAX_CONTENT_LENGTH: usize = 2 * 1024 * 1024;

/// Request quota, parsed from strings such as `"10 per minute"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub period: Duration,
}

impl FromStr for RateLimit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('/', " per ");
        let mut parts = normalized.split_whitespace();

        let (Some(count), Some("per"), Some(unit), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            bail!("Rate limit '{s}' must look like '<N> per <second|minute|hour|day>'");
        };

        let max_requests: u32 = count
            .parse()
            .with_context(|| format!("Rate limit count '{count}' is not a number"))?;
        if max_requests == 0 {
            bail!("Rate limit count must be greater than zero");
        }

        let secs = match unit.trim_end_matches('s') {
            "second" | "sec" => 1,
            "minute" | "min" => 60,
            "hour" => 3600,
            "day" => 86_400,
            other => bail!("Unknown rate limit period '{other}'"),
        };

        Ok(RateLimit {
            max_requests,
            period: Duration::from_secs(secs),
        })
    }
}

/// CORS origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl FromStr for AllowedOrigins {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let origins: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            return Ok(AllowedOrigins::Any);
        }
        Ok(AllowedOrigins::List(origins))
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub allowed_origins: AllowedOrigins,
    pub max_content_length: usize,
    pub rate_limit: RateLimit,
    /// Take client identity from `X-Forwarded-For` (only behind a trusted proxy).
    pub trust_proxy: bool,
    pub risk_profile: String,
    pub include_hospital_map: bool,
    pub anthropic_api_key: Option<String>,
    pub explain_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            allowed_origins: get("ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .parse()?,
            max_content_length: match get("MAX_CONTENT_LENGTH") {
                Some(v) => v
                    .trim()
                    .parse()
                    .context("MAX_CONTENT_LENGTH must be a byte count")?,
                None => DEFAULT_MAX_CONTENT_LENGTH,
            },
            rate_limit: get("RATE_LIMIT")
                .unwrap_or_else(|| "10 per minute".to_string())
                .parse()?,
            trust_proxy: match get("TRUST_PROXY") {
                Some(v) => parse_bool(&v).context("TRUST_PROXY must be true or false")?,
                None => false,
            },
            risk_profile: get("RISK_PROFILE").unwrap_or_else(|| CANONICAL_PROFILE.to_string()),
            include_hospital_map: match get("INCLUDE_HOSPITAL_MAP") {
                Some(v) => parse_bool(&v).context("INCLUDE_HOSPITAL_MAP must be true or false")?,
                None => true,
            },
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            explain_timeout: Duration::from_secs(match get("EXPLAIN_TIMEOUT_SECS") {
                Some(v) => v
                    .trim()
                    .parse()
                    .context("EXPLAIN_TIMEOUT_SECS must be a whole number of seconds")?,
                None => 10,
            }),
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("'{other}' is not a boolean")),
    }
}
