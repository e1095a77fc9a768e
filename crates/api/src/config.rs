use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use axum::http::HeaderValue;
use regex::Regex;
use todo_db::{PoolSettings, RetryPolicy};

/// Log output format, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format '{0}'")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(UnknownLogFormat(s.to_string())),
        }
    }
}

/// Origins allowed by the CORS layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Store URL. `memory:` selects the in-memory store.
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Connect attempts at startup before serving in degraded mode.
    pub db_connect_attempts: u32,
    /// Base delay for the linear connect backoff.
    pub db_retry_delay_ms: u64,
    pub cors_origins: CorsOrigins,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub referrer_policy: HeaderValue,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                           |
    /// |---------------------------|-----------------------------------|
    /// | `HOST`                    | `0.0.0.0`                         |
    /// | `PORT`                    | `5000`                            |
    /// | `DATABASE_URL`            | `postgres://localhost:5432/todo`  |
    /// | `DB_MAX_CONNECTIONS`      | `10`                              |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                               |
    /// | `DB_CONNECT_ATTEMPTS`     | `5`                               |
    /// | `DB_RETRY_DELAY_MS`       | `1000`                            |
    /// | `CORS_ORIGINS`            | `*`                               |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                              |
    /// | `REFERRER_POLICY`         | `strict-origin-when-cross-origin` |
    /// | `LOG_FORMAT`              | `pretty`                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(&lookup, "PORT", 5000, "a valid port number")?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "postgres://localhost:5432/todo".into());
        let db_max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", 10, "a positive integer")?;
        let db_acquire_timeout_secs =
            parse_var(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5, "a number of seconds")?;
        let db_connect_attempts = parse_var(&lookup, "DB_CONNECT_ATTEMPTS", 5, "a positive integer")?;
        let db_retry_delay_ms =
            parse_var(&lookup, "DB_RETRY_DELAY_MS", 1000, "a number of milliseconds")?;

        let cors_raw = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".into());
        let cors_origins = parse_cors_origins(&cors_raw)?;

        let request_timeout_secs =
            parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30, "a number of seconds")?;

        let referrer_raw =
            lookup("REFERRER_POLICY").unwrap_or_else(|| "strict-origin-when-cross-origin".into());
        let referrer_policy =
            HeaderValue::from_str(&referrer_raw).map_err(|_| ConfigError::Invalid {
                var: "REFERRER_POLICY",
                expected: "a valid header value",
                value: referrer_raw.clone(),
            })?;

        let log_format = parse_var(&lookup, "LOG_FORMAT", LogFormat::Pretty, "'pretty' or 'json'")?;

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
            db_acquire_timeout_secs,
            db_connect_attempts,
            db_retry_delay_ms,
            cors_origins,
            request_timeout_secs,
            referrer_policy,
            log_format,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.db_connect_attempts,
            base_delay: Duration::from_millis(self.db_retry_delay_ms),
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}

fn parse_cors_origins(raw: &str) -> Result<CorsOrigins, ConfigError> {
    let entries: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if entries.is_empty() || entries.contains(&"*") {
        return Ok(CorsOrigins::Any);
    }

    entries
        .into_iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                expected: "a comma-separated list of origins",
                value: raw.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsOrigins::List)
}

static URL_PASSWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[^:@]+@").expect("static regex is valid"));

/// Mask the password of a connection URL for logging.
pub fn mask_database_url(url: &str) -> String {
    URL_PASSWORD.replace(url, ":****@").into_owned()
}
