//! Status transition history.
//!
//! History is passed by value: `record` takes the history and returns it with
//! the transition appended. `retain_attempts` bounds it across retries.

use super::state::PaymentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single status change inside a payment session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    pub timestamp: DateTime<Utc>,
    /// Session attempt the transition belongs to (1 for the first session,
    /// incremented by every retry).
    pub attempt: u32,
}

/// Ordered history of status transitions across retries.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use momopay::core::{PaymentStatus, SessionHistory, StatusTransition};
///
/// let history = SessionHistory::new().record(StatusTransition {
///     from: PaymentStatus::Idle,
///     to: PaymentStatus::Processing,
///     timestamp: Utc::now(),
///     attempt: 1,
/// });
///
/// assert_eq!(
///     history.get_path(),
///     vec![&PaymentStatus::Idle, &PaymentStatus::Processing]
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionHistory {
    transitions: Vec<StatusTransition>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning the extended history.
    pub fn record(mut self, transition: StatusTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Keep only the transitions of the `attempts` most recent attempts.
    pub fn retain_attempts(mut self, attempts: u32) -> Self {
        let Some(latest) = self.transitions.last().map(|t| t.attempt) else {
            return self;
        };
        let oldest = latest.saturating_sub(attempts.saturating_sub(1));
        self.transitions.retain(|t| t.attempt >= oldest);
        self
    }

    /// Statuses traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&PaymentStatus> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Transitions belonging to one session attempt.
    pub fn for_attempt(&self, attempt: u32) -> Vec<&StatusTransition> {
        self.transitions
            .iter()
            .filter(|t| t.attempt == attempt)
            .collect()
    }

    /// Elapsed time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn transitions(&self) -> &[StatusTransition] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
