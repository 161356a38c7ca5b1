//! Error taxonomy for payment sessions.
//!
//! Validation errors refuse a pay action without touching the session,
//! payment failures end a session and are reported through the error
//! callback, and machine errors describe a handle that outlived its driver.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a pay action is refused before any state change.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No mobile money provider detected for this number")]
    NoProviderDetected,

    #[error("Phone number has {digits} digits, at least {required} required")]
    PhoneTooShort { digits: usize, required: usize },
}

/// Terminal failure of a payment session.
///
/// The `Display` form is the reason string handed to the error callback.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFailure {
    /// The countdown reached zero while waiting for authorization.
    #[error("timeout")]
    Timeout,

    /// The failure path was injected, either by configuration or by the caller.
    #[error("simulated failure")]
    SimulatedFailure,
}

impl PaymentFailure {
    /// Reason string reported to the error callback.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::SimulatedFailure => "simulated failure",
        }
    }
}

/// Errors returned by a `PaymentHandle`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("Payment machine is no longer running")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display_matches_reason() {
        assert_eq!(PaymentFailure::Timeout.to_string(), "timeout");
        assert_eq!(
            PaymentFailure::SimulatedFailure.to_string(),
            PaymentFailure::SimulatedFailure.reason()
        );
    }

    #[test]
    fn phone_too_short_mentions_both_counts() {
        let err = ValidationError::PhoneTooShort {
            digits: 7,
            required: 10,
        };
        assert_eq!(
            err.to_string(),
            "Phone number has 7 digits, at least 10 required"
        );
    }

    #[test]
    fn failure_serializes_as_snake_case() {
        let json = serde_json::to_string(&PaymentFailure::SimulatedFailure).unwrap();
        assert_eq!(json, "\"simulated_failure\"");
    }
}
