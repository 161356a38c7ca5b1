//! Payment session data and its read-only snapshot.

use super::provider::{detect_provider, Provider};
use super::state::PaymentStatus;
use crate::config::SimulationConfig;
use crate::error::PaymentFailure;
use crate::validation::can_pay;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One end-to-end payment attempt, from `Idle` to a terminal status.
///
/// Sessions are plain values. The transition function takes one by
/// reference and returns the next, so a session is never mutated in place
/// outside this module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub phone_number: String,
    pub detected_provider: Option<Provider>,
    pub status: PaymentStatus,
    pub remaining_seconds: u32,
    pub amount: Decimal,
    pub currency: String,
    /// Set exactly when `status` is `Success`.
    pub transaction_id: Option<String>,
    /// Set exactly when `status` is `Failed`.
    pub failure: Option<PaymentFailure>,
    /// 1 for the first session, incremented by every retry.
    pub attempt: u32,
}

impl PaymentSession {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            phone_number: String::new(),
            detected_provider: None,
            status: PaymentStatus::Idle,
            remaining_seconds: config.countdown_secs,
            amount: Decimal::ZERO,
            currency: config.currency.clone(),
            transaction_id: None,
            failure: None,
            attempt: 1,
        }
    }

    /// Replace the phone number and re-run provider detection.
    pub(crate) fn set_phone(&mut self, phone: &str) {
        self.phone_number = phone.to_string();
        self.detected_provider = detect_provider(phone);
    }

    /// The next session after a retry: same number and amount, fresh budget.
    pub(crate) fn retried(&self, config: &SimulationConfig) -> Self {
        Self {
            status: PaymentStatus::Idle,
            remaining_seconds: config.countdown_secs,
            transaction_id: None,
            failure: None,
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub(crate) fn failed(&self, failure: PaymentFailure) -> Self {
        Self {
            status: PaymentStatus::Failed,
            failure: Some(failure),
            ..self.clone()
        }
    }

    pub fn snapshot(&self, config: &SimulationConfig) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            remaining_seconds: self.remaining_seconds,
            phone_number: self.phone_number.clone(),
            provider: self.detected_provider,
            provider_name: self
                .detected_provider
                .map(|p| p.display_name().to_string()),
            pay_enabled: self.status == PaymentStatus::Idle
                && can_pay(&self.phone_number, config.min_phone_digits),
            amount: self.amount,
            currency: self.currency.clone(),
            transaction_id: self.transaction_id.clone(),
            failure: self.failure,
            attempt: self.attempt,
        }
    }
}

/// What a UI needs to render the payment widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub status: PaymentStatus,
    pub remaining_seconds: u32,
    pub phone_number: String,
    pub provider: Option<Provider>,
    pub provider_name: Option<String>,
    pub pay_enabled: bool,
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: Option<String>,
    pub failure: Option<PaymentFailure>,
    pub attempt: u32,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
