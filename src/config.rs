//! Simulation settings.
//!
//! Every delay in a payment session is simulated. The defaults reproduce the
//! checkout flow: two seconds of network latency, five seconds until the
//! customer approves, and a five minute countdown.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_NETWORK_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_AUTHORIZATION_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_COUNTDOWN_SECS: u32 = 300;
pub const DEFAULT_MIN_PHONE_DIGITS: usize = 10;
pub const DEFAULT_CURRENCY: &str = "GHS";
pub const DEFAULT_HISTORY_ATTEMPTS: u32 = 5;

/// Environment variable prefix read by [`SimulationConfig::from_env`].
pub const ENV_PREFIX: &str = "MOMOPAY_";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Countdown ceiling must be at least one second")]
    ZeroCountdown,

    #[error("Minimum phone digits must be at least 3 (got {0})")]
    MinDigitsTooSmall(usize),

    #[error("History must keep at least one attempt")]
    ZeroHistoryAttempts,

    #[error("Currency must be a three-letter uppercase code (got {0:?})")]
    InvalidCurrency(String),
}

/// How the authorization step resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureInjection {
    /// Authorization always succeeds if it beats the countdown.
    #[default]
    Never,
    /// Authorization always resolves to a simulated failure.
    OnAuthorization,
}

impl FromStr for FailureInjection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" | "" => Ok(Self::Never),
            "on_authorization" | "always" => Ok(Self::OnAuthorization),
            other => Err(format!(
                "expected \"never\" or \"on_authorization\", got {other:?}"
            )),
        }
    }
}

/// Timing and policy for simulated payment sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay between accepting a pay action and entering `Waiting`.
    #[serde(with = "duration_millis")]
    pub network_delay: Duration,
    /// Delay between entering `Waiting` and the simulated authorization.
    #[serde(with = "duration_millis")]
    pub authorization_delay: Duration,
    /// Countdown start value, reset every time `Waiting` is entered.
    pub countdown_secs: u32,
    pub min_phone_digits: usize,
    pub currency: String,
    pub failure: FailureInjection,
    /// Number of most recent attempts whose transitions the history keeps.
    pub history_attempts: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            network_delay: DEFAULT_NETWORK_DELAY,
            authorization_delay: DEFAULT_AUTHORIZATION_DELAY,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            min_phone_digits: DEFAULT_MIN_PHONE_DIGITS,
            currency: DEFAULT_CURRENCY.to_string(),
            failure: FailureInjection::Never,
            history_attempts: DEFAULT_HISTORY_ATTEMPTS,
        }
    }
}

impl SimulationConfig {
    pub fn network_delay(mut self, delay: Duration) -> Self {
        self.network_delay = delay;
        self
    }

    pub fn authorization_delay(mut self, delay: Duration) -> Self {
        self.authorization_delay = delay;
        self
    }

    pub fn countdown_secs(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    pub fn min_phone_digits(mut self, digits: usize) -> Self {
        self.min_phone_digits = digits;
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn failure(mut self, failure: FailureInjection) -> Self {
        self.failure = failure;
        self
    }

    pub fn history_attempts(mut self, attempts: u32) -> Self {
        self.history_attempts = attempts;
        self
    }

    /// Load from `MOMOPAY_*` environment variables, falling back to defaults.
    ///
    /// Recognised keys: `NETWORK_DELAY_MS`, `AUTHORIZATION_DELAY_MS`,
    /// `COUNTDOWN_SECS`, `MIN_PHONE_DIGITS`, `CURRENCY`, `FAILURE`,
    /// `HISTORY_ATTEMPTS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Load from an arbitrary key lookup (keys without the prefix).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "NETWORK_DELAY_MS")? {
            config.network_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "AUTHORIZATION_DELAY_MS")? {
            config.authorization_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var(&lookup, "COUNTDOWN_SECS")? {
            config.countdown_secs = secs;
        }
        if let Some(digits) = parse_var(&lookup, "MIN_PHONE_DIGITS")? {
            config.min_phone_digits = digits;
        }
        if let Some(currency) = lookup("CURRENCY") {
            config.currency = currency.trim().to_string();
        }
        if let Some(failure) = parse_var(&lookup, "FAILURE")? {
            config.failure = failure;
        }
        if let Some(attempts) = parse_var(&lookup, "HISTORY_ATTEMPTS")? {
            config.history_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown_secs == 0 {
            return Err(ConfigError::ZeroCountdown);
        }

        if self.history_attempts == 0 {
            return Err(ConfigError::ZeroHistoryAttempts);
        }

        // The provider prefix alone needs three digits.
        if self.min_phone_digits < 3 {
            return Err(ConfigError::MinDigitsTooSmall(self.min_phone_digits));
        }

        let valid_currency =
            self.currency.len() == 3 && self.currency.chars().all(|c| c.is_ascii_uppercase());
        if !valid_currency {
            return Err(ConfigError::InvalidCurrency(self.currency.clone()));
        }

        Ok(())
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: format!("{ENV_PREFIX}{key}"),
            value: raw.clone(),
            reason: e.to_string(),
        })
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
