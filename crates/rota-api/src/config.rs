//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use rota_core::{Error, LogFormat, Result};

/// Log output selection for the server process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatChoice {
    /// Pick JSON in production and pretty output in debug mode.
    #[default]
    Auto,
    /// Force JSON lines.
    Json,
    /// Force human-readable output.
    Pretty,
}

impl LogFormatChoice {
    /// Resolves the choice against the debug flag.
    #[must_use]
    pub fn resolve(self, debug: bool) -> LogFormat {
        match self {
            Self::Json => LogFormat::Json,
            Self::Pretty => LogFormat::Pretty,
            Self::Auto => {
                if debug {
                    LogFormat::Pretty
                } else {
                    LogFormat::Json
                }
            }
        }
    }
}

/// CORS configuration for browser-based access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Use `["*"]` to allow all origins (development only).
    /// Empty list disables CORS entirely.
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache (seconds).
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            // Default: disabled (secure-by-default).
            // Set to `["*"]` for local development, or explicit origins for production.
            allowed_origins: Vec::new(),
            max_age_seconds: 3600, // 1 hour
        }
    }
}

/// Configuration for the Rota API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode.
    ///
    /// When enabled the server may run on the in-memory store and defaults
    /// to pretty logs. When disabled, a `ROTA_DB_PATH` is required.
    pub debug: bool,

    /// Log output selection.
    #[serde(default)]
    pub log_format: LogFormatChoice,

    /// `SQLite` database path. Unset means the in-memory store (debug only).
    #[serde(default)]
    pub db_path: Option<String>,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Bound in milliseconds on how long one submission may wait for slot
    /// locks before being turned away as busy.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

const MIN_LOCK_WAIT_MS: u64 = 10;
const MAX_LOCK_WAIT_MS: u64 = 60_000; // 1 minute max

fn default_lock_wait_ms() -> u64 {
    // Matches rota_ledger::DEFAULT_LOCK_WAIT.
    2_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            debug: false,
            log_format: LogFormatChoice::default(),
            db_path: None,
            cors: CorsConfig::default(),
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Supported env vars:
    /// - `ROTA_HTTP_PORT`
    /// - `ROTA_DEBUG`
    /// - `ROTA_LOG_FORMAT` (`auto` | `json` | `pretty`)
    /// - `ROTA_DB_PATH`
    /// - `ROTA_CORS_ALLOWED_ORIGINS` (comma-separated, or `*`)
    /// - `ROTA_CORS_MAX_AGE_SECONDS`
    /// - `ROTA_LOCK_WAIT_MS` (10-60000, default: 2000)
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable is present but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_u16("ROTA_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env_bool("ROTA_DEBUG")? {
            config.debug = debug;
        }
        if let Some(format) = env_string("ROTA_LOG_FORMAT") {
            config.log_format = parse_log_format("ROTA_LOG_FORMAT", &format)?;
        }
        if let Some(path) = env_string("ROTA_DB_PATH") {
            config.db_path = Some(path);
        }

        if let Some(origins) = env_string("ROTA_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_cors_allowed_origins(&origins);
        }
        if let Some(max_age) = env_u64("ROTA_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }

        if let Some(ms) = env_u64("ROTA_LOCK_WAIT_MS")? {
            if ms < MIN_LOCK_WAIT_MS {
                return Err(Error::InvalidInput(format!(
                    "ROTA_LOCK_WAIT_MS must be at least {MIN_LOCK_WAIT_MS} milliseconds"
                )));
            }
            if ms > MAX_LOCK_WAIT_MS {
                return Err(Error::InvalidInput(format!(
                    "ROTA_LOCK_WAIT_MS must be at most {MAX_LOCK_WAIT_MS} milliseconds"
                )));
            }
            config.lock_wait_ms = ms;
        }

        Ok(config)
    }

    /// Returns the lock wait bound as a [`Duration`].
    #[must_use]
    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms.min(MAX_LOCK_WAIT_MS))
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u16(name: &str) -> Result<Option<u16>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u16>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    v.parse::<u64>()
        .map(Some)
        .map_err(|e| Error::InvalidInput(format!("{name} must be a u64: {e}")))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn env_bool(name: &str) -> Result<Option<bool>> {
    let Some(v) = env_string(name) else {
        return Ok(None);
    };
    parse_bool(name, &v).map(Some)
}

fn parse_log_format(name: &str, value: &str) -> Result<LogFormatChoice> {
    let format = value.trim().to_ascii_lowercase();
    match format.as_str() {
        "auto" => Ok(LogFormatChoice::Auto),
        "json" => Ok(LogFormatChoice::Json),
        "pretty" => Ok(LogFormatChoice::Pretty),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be one of: auto, json, pretty (got {value})"
        ))),
    }
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed == "*" {
        return vec!["*".to_string()];
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_true_values() {
        assert!(parse_bool("TEST", "true").unwrap());
        assert!(parse_bool("TEST", "1").unwrap());
        assert!(parse_bool("TEST", "yes").unwrap());
        assert!(parse_bool("TEST", "TRUE").unwrap());
    }

    #[test]
    fn parse_bool_accepts_false_values() {
        assert!(!parse_bool("TEST", "false").unwrap());
        assert!(!parse_bool("TEST", "0").unwrap());
        assert!(!parse_bool("TEST", "no").unwrap());
        assert!(!parse_bool("TEST", "FALSE").unwrap());
    }

    #[test]
    fn parse_bool_rejects_invalid_values() {
        assert!(parse_bool("TEST", "maybe").is_err());
        assert!(parse_bool("TEST", "").is_err());
    }

    #[test]
    fn parse_log_format_accepts_all_choices() -> Result<()> {
        assert_eq!(parse_log_format("TEST", "auto")?, LogFormatChoice::Auto);
        assert_eq!(parse_log_format("TEST", "json")?, LogFormatChoice::Json);
        assert_eq!(parse_log_format("TEST", "PRETTY")?, LogFormatChoice::Pretty);
        Ok(())
    }

    #[test]
    fn parse_log_format_rejects_invalid_value() {
        let err = parse_log_format("TEST", "syslog").unwrap_err();
        let Error::InvalidInput(message) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(message.contains("TEST"));
        assert!(message.contains("syslog"));
    }

    #[test]
    fn log_format_auto_follows_debug_flag() {
        assert_eq!(LogFormatChoice::Auto.resolve(true), LogFormat::Pretty);
        assert_eq!(LogFormatChoice::Auto.resolve(false), LogFormat::Json);
        assert_eq!(LogFormatChoice::Json.resolve(true), LogFormat::Json);
        assert_eq!(LogFormatChoice::Pretty.resolve(false), LogFormat::Pretty);
    }

    #[test]
    fn cors_origins_parse_wildcard_and_lists() {
        assert_eq!(parse_cors_allowed_origins("*"), vec!["*".to_string()]);
        assert_eq!(
            parse_cors_allowed_origins("https://a.example, https://b.example"),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_cors_allowed_origins("  ").is_empty());
    }

    #[test]
    fn lock_wait_is_capped() {
        let config = Config {
            lock_wait_ms: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.lock_wait(), Duration::from_millis(MAX_LOCK_WAIT_MS));
    }
}
