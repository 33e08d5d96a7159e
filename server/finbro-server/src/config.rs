//! Environment-driven server configuration

use chrono::Duration as ChronoDuration;
use error_common::{FinbroError, Result};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEVELOPMENT_JWT_SECRET: &str = "finbro-development-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// Read `ENVIRONMENT` alone, so logging can be set up before the rest
    /// of the configuration is known to be valid
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("ENVIRONMENT")
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self::parse(&v))
            .unwrap_or(Environment::Development)
    }

    pub fn current() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Clone)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

impl std::fmt::Debug for GoogleSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry: ChronoDuration,
    pub google: GoogleSettings,
    /// Postgres connection string; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub business_domains: Vec<String>,
    pub upstream_timeout: Duration,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("environment", &self.environment)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry", &self.jwt_expiry)
            .field("google", &self.google)
            .field("database", &self.database_url.as_ref().map(|_| "configured"))
            .field("business_domains", &self.business_domains)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = Environment::from_lookup(&lookup);

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| {
                    FinbroError::ConfigError(format!("PORT is not a valid port: {raw}"))
                })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = match (get("JWT_SECRET"), environment) {
            (Some(secret), _) => secret,
            (None, Environment::Production) => {
                return Err(FinbroError::ConfigError(
                    "JWT_SECRET is required in production".to_string(),
                ))
            }
            (None, Environment::Development) => DEVELOPMENT_JWT_SECRET.to_string(),
        };

        let jwt_expiry = match get("JWT_EXPIRY") {
            Some(raw) => parse_expiry(&raw).ok_or_else(|| {
                FinbroError::ConfigError(format!("JWT_EXPIRY is not a valid duration: {raw}"))
            })?,
            None => ChronoDuration::hours(DEFAULT_JWT_EXPIRY_HOURS),
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    FinbroError::ConfigError(format!("UPSTREAM_TIMEOUT_SECS is invalid: {raw}"))
                })?,
            None => Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        };

        let business_domains = get("BUSINESS_DOMAINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment,
            port,
            jwt_secret,
            jwt_expiry,
            google: GoogleSettings {
                client_id: get("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: get("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
                redirect_url: get("GOOGLE_REDIRECT_URL").unwrap_or_else(|| {
                    format!("http://localhost:{port}/api/v1/auth/google/callback")
                }),
            },
            database_url: get("DATABASE_URL"),
            business_domains,
            upstream_timeout,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Parse a token lifetime.
///
/// Accepts a bare number of seconds or unit-suffixed terms in the
/// `ms`/`s`/`m`/`h` units, optionally fractional and chained
/// (`90s`, `1.5h`, `1h30m`, `24h0m0s`). The total must be at least one second
/// because token timestamps have second resolution.
pub fn parse_expiry(raw: &str) -> Option<ChronoDuration> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return (secs > 0).then(|| ChronoDuration::seconds(secs));
    }
    if raw.is_empty() {
        return None;
    }

    let mut rest = raw;
    let mut total_ms = 0.0_f64;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let value: f64 = number.parse().ok()?;
        let unit_ms = match unit {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            _ => return None,
        };
        total_ms += value * unit_ms;
        rest = next;
    }

    if !total_ms.is_finite() || total_ms < 1_000.0 || total_ms > i64::MAX as f64 / 2.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = total_ms.round() as i64;
    Some(ChronoDuration::milliseconds(millis))
}
