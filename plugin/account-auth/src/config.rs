//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables. The signing
//! secret may be absent: the service still starts, but the token issuer then
//! refuses every issue/verify call.

use crate::error::ConfigError;
use chrono::{Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::env;

/// Token lifetime used when `JWT_EXPIRES_IN` is unset or empty
pub const DEFAULT_TOKEN_LIFETIME: &str = "7d";

/// Minimum password length used when `MIN_PASSWORD_LENGTH` is unset
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

lazy_static! {
    static ref LIFETIME_PATTERN: Regex = Regex::new(
        r"(?i)^(\d*\.?\d+) *(milliseconds?|msecs?|ms|seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|w|years?|yrs?|y)?$"
    )
    .expect("lifetime pattern compiles");
}

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Lifetime of issued tokens (from JWT_EXPIRES_IN env var)
    pub token_lifetime: Duration,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Minimum password length at signup (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// Fails only when `JWT_EXPIRES_IN` is set to something that is not a
    /// duration. A missing `JWT_SECRET` is not an error here.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_lifetime = match env::var("JWT_EXPIRES_IN") {
            Ok(raw) if !raw.trim().is_empty() => parse_lifetime(&raw)?,
            _ => parse_lifetime(DEFAULT_TOKEN_LIFETIME)?,
        };

        Ok(Self {
            jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),

            token_lifetime,

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(argon2::Params::DEFAULT_M_COST), // 19 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(argon2::Params::DEFAULT_T_COST),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(argon2::Params::DEFAULT_P_COST),

            min_password_length: env::var("MIN_PASSWORD_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_PASSWORD_LENGTH),
        })
    }

    /// Defaults with an explicit signing secret
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_lifetime < Duration::zero() {
            return Err(ConfigError::Invalid(
                "JWT_EXPIRES_IN must not be negative".to_string(),
            ));
        }

        if Utc::now().checked_add_signed(self.token_lifetime).is_none() {
            return Err(ConfigError::Invalid(
                "JWT_EXPIRES_IN is too large".to_string(),
            ));
        }

        argon2::Params::new(
            self.argon2_memory_cost,
            self.argon2_time_cost,
            self.argon2_parallelism,
            None,
        )
        .map_err(|e| ConfigError::Invalid(format!("ARGON2_* parameters rejected: {e}")))?;

        if self.min_password_length == 0 {
            return Err(ConfigError::Invalid(
                "MIN_PASSWORD_LENGTH must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Cheapest Argon2 parameters, so hashing in tests stays fast
    #[cfg(test)]
    pub(crate) fn for_tests(secret: &str) -> Self {
        Self {
            argon2_memory_cost: argon2::Params::MIN_M_COST,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..Self::with_secret(secret)
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_lifetime: Duration::days(7),
            argon2_memory_cost: argon2::Params::DEFAULT_M_COST,
            argon2_time_cost: argon2::Params::DEFAULT_T_COST,
            argon2_parallelism: argon2::Params::DEFAULT_P_COST,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

/// Parse a token lifetime such as `"7d"`, `"2 days"`, `"12h"` or `"90000"`.
///
/// A bare number is read as milliseconds. The result is truncated to whole
/// seconds because token timestamps are second-granular.
pub fn parse_lifetime(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: "JWT_EXPIRES_IN",
        value: raw.to_string(),
    };

    let captures = LIFETIME_PATTERN.captures(raw.trim()).ok_or_else(invalid)?;
    let amount: f64 = captures[1].parse().map_err(|_| invalid())?;

    let unit = captures
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_else(|| "ms".to_string());

    let millis_per_unit = match unit.as_str() {
        "years" | "year" | "yrs" | "yr" | "y" => 31_557_600_000.0,
        "weeks" | "week" | "w" => 604_800_000.0,
        "days" | "day" | "d" => 86_400_000.0,
        "hours" | "hour" | "hrs" | "hr" | "h" => 3_600_000.0,
        "minutes" | "minute" | "mins" | "min" | "m" => 60_000.0,
        "seconds" | "second" | "secs" | "sec" | "s" => 1_000.0,
        _ => 1.0,
    };

    let seconds = (amount * millis_per_unit / 1_000.0).floor();
    if !seconds.is_finite() || seconds > i64::MAX as f64 / 1_000.0 {
        return Err(invalid());
    }

    Ok(Duration::seconds(seconds as i64))
}
