//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ConfigError;

/// Default cache TTL when `CACHE_TTL` is not set.
pub const DEFAULT_CACHE_TTL: &str = "15m";

/// Default listen port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration parameters.
#[derive(Clone)]
pub struct Config {
    /// Upstream access token handed to the update resolver
    pub github_token: String,
    /// HTTP server port
    pub port: u16,
    /// Time-to-live applied to every cache entry
    pub cache_ttl: Duration,
    /// Safety timeout after which an unreleased lock may be re-acquired
    pub lock_ttl: Duration,
    /// Background sweep interval; `None` leaves eviction lazy
    pub cleanup_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GH_TOKEN` - Upstream access token (required)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Cache entry lifetime, e.g. `"15m"` (default: 15m)
    /// - `LOCK_TTL` - Lock safety timeout (default: same as `CACHE_TTL`)
    /// - `CLEANUP_INTERVAL` - Expired-entry sweep interval (default: disabled)
    ///
    /// Variables missing from the process environment are read from a
    /// `.env` file in the working directory, if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_and_file(Path::new(".env"))
    }

    /// Loads configuration from the process environment, falling back to
    /// the variables declared in the dotenv file at `path`.
    pub fn from_env_and_file(path: &Path) -> Result<Self, ConfigError> {
        let file_vars = read_env_file(path);
        Self::from_lookup(|name| env::var(name).ok().or_else(|| file_vars.get(name).cloned()))
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let github_token = lookup("GH_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let cache_ttl_raw = lookup("CACHE_TTL").unwrap_or_else(|| DEFAULT_CACHE_TTL.to_string());
        let cache_ttl = positive_duration("CACHE_TTL", &cache_ttl_raw)?;

        let lock_ttl = match lookup("LOCK_TTL") {
            Some(raw) => positive_duration("LOCK_TTL", &raw)?,
            None => cache_ttl,
        };

        let cleanup_interval = lookup("CLEANUP_INTERVAL")
            .map(|raw| positive_duration("CLEANUP_INTERVAL", &raw))
            .transpose()?;

        Ok(Self {
            github_token,
            port,
            cache_ttl,
            lock_ttl,
            cleanup_interval,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &"<redacted>")
            .field("port", &self.port)
            .field("cache_ttl", &self.cache_ttl)
            .field("lock_ttl", &self.lock_ttl)
            .field("cleanup_interval", &self.cleanup_interval)
            .finish()
    }
}

/// Reads `KEY=value` pairs from a dotenv file without touching the process
/// environment. A missing file yields no variables.
fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) => {
            debug!("No env file at {}: {}", path.display(), err);
            return HashMap::new();
        }
    };

    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(err) => {
            warn!("Skipping malformed line in {}: {}", path.display(), err);
            None
        }
    })
    .collect()
}

fn positive_duration(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match parse_duration(raw) {
        Some(d) if !d.is_zero() => Ok(d),
        Some(_) => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "duration must be greater than zero".to_string(),
        }),
        None => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected a duration such as 500ms, 30s, 15m, 1h or 1d".to_string(),
        }),
    }
}

/// Parse a duration string like "500ms", "30s", "15m", "1.5h", "2d" or "1w".
///
/// A bare number is read as milliseconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (num_str, unit) = s.split_at(split);

    let num: f64 = num_str.parse().ok()?;
    if !num.is_finite() || num < 0.0 {
        return None;
    }

    let factor_ms = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        "w" | "week" | "weeks" => 604_800_000.0,
        // 365.25 days
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000.0,
        _ => return None,
    };

    Some(Duration::from_millis((num * factor_ms).round() as u64))
}
