//! Retry budgets and their validation.
//!
//! A [`RetryPolicy`] holds two independent budgets: how many times a generic
//! failure may be retried and how many times a rate-limited (HTTP 429) failure
//! may be retried. Budgets are validated once, when the policy is built, so a
//! policy value is always usable.
//!
//! Budgets can come from typed arguments ([`RetryPolicy::new`]), from SDK
//! configuration JSON ([`RetryPolicy::from_settings`]) or from the environment
//! ([`RetryPolicy::from_env`]).

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Generic retries allowed when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Rate-limit retries allowed when none is configured.
pub const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Environment variable holding the generic retry budget.
pub const RETRIES_ENV: &str = "REST_RETRY_MAX_RETRIES";

/// Environment variable holding the rate-limit retry budget.
pub const RATE_LIMIT_RETRIES_ENV: &str = "REST_RETRY_MAX_RATE_LIMIT_RETRIES";

const RETRIES: &str = "retries";
const RATE_LIMIT_RETRIES: &str = "rate_limit_retries";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    #[serde(rename = "retries")]
    max_retries: u32,
    #[serde(rename = "rate_limit_retries")]
    max_rate_limit_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from optional budgets, using the defaults for `None`.
    ///
    /// `retries` is checked before `rate_limit_retries`; the first invalid
    /// value is reported.
    pub fn new(retries: Option<i64>, rate_limit_retries: Option<i64>) -> Result<Self, ConfigError> {
        let max_retries = match retries {
            Some(value) => check_budget(RETRIES, value)?,
            None => DEFAULT_MAX_RETRIES,
        };
        let max_rate_limit_retries = match rate_limit_retries {
            Some(value) => check_budget(RATE_LIMIT_RETRIES, value)?,
            None => DEFAULT_MAX_RATE_LIMIT_RETRIES,
        };

        Ok(Self {
            max_retries,
            max_rate_limit_retries,
        })
    }

    /// Reads `retries` and `rate_limit_retries` from a JSON settings object.
    ///
    /// Missing or `null` keys fall back to the defaults. Any other non-integer
    /// value is a [`ConfigError::TypeMismatch`].
    pub fn from_settings(settings: &Value) -> Result<Self, ConfigError> {
        let retries = settings.get(RETRIES).filter(|v| !v.is_null());
        let rate_limit_retries = settings.get(RATE_LIMIT_RETRIES).filter(|v| !v.is_null());

        Ok(Self {
            max_retries: budget_from_value(RETRIES, retries)?.unwrap_or(DEFAULT_MAX_RETRIES),
            max_rate_limit_retries: budget_from_value(RATE_LIMIT_RETRIES, rate_limit_retries)?
                .unwrap_or(DEFAULT_MAX_RATE_LIMIT_RETRIES),
        })
    }

    /// Reads the budgets from [`RETRIES_ENV`] and [`RATE_LIMIT_RETRIES_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RetryPolicy::from_env`], with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let retries = budget_from_env(RETRIES, lookup(RETRIES_ENV))?;
        let rate_limit_retries = budget_from_env(RATE_LIMIT_RETRIES, lookup(RATE_LIMIT_RETRIES_ENV))?;

        let policy = Self {
            max_retries: retries.unwrap_or(DEFAULT_MAX_RETRIES),
            max_rate_limit_retries: rate_limit_retries.unwrap_or(DEFAULT_MAX_RATE_LIMIT_RETRIES),
        };
        debug!("Retry policy from environment: {:?}", policy);
        Ok(policy)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn max_rate_limit_retries(&self) -> u32 {
        self.max_rate_limit_retries
    }
}

fn check_budget(name: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::InvalidValue {
            name,
            expected: "greater than or equal to zero".to_string(),
            value: value.to_string(),
        });
    }
    u32::try_from(value).map_err(|_| out_of_range(name, value))
}

fn out_of_range(name: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        expected: format!("at most {}", u32::MAX),
        value: value.to_string(),
    }
}

fn budget_from_value(name: &'static str, value: Option<&Value>) -> Result<Option<u32>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                check_budget(name, i).map(Some)
            } else if let Some(u) = n.as_u64() {
                Err(out_of_range(name, u))
            } else {
                Err(ConfigError::TypeMismatch {
                    name,
                    found: json_type_name(value),
                })
            }
        }
        other => Err(ConfigError::TypeMismatch {
            name,
            found: json_type_name(other),
        }),
    }
}

/// Environment values are read as JSON scalars so that `"1.5"` is reported as
/// a float and `"true"` as a bool; anything unparsable is a string.
fn budget_from_env(name: &'static str, raw: Option<String>) -> Result<Option<u32>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value = serde_json::from_str::<Value>(raw.trim()).unwrap_or(Value::String(raw));
    budget_from_value(name, Some(&value))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
