//! Payment session status.
//!
//! The status is a plain tagged value. All of its inspection methods are
//! pure, and only the transition function decides how it moves.

use serde::{Deserialize, Serialize};

/// Where a payment session currently stands.
///
/// ```text
/// Idle -> Processing -> Waiting -> Success
///                          |
///                          +----> Failed -> (retry) -> Idle
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Collecting a phone number; the only state accepting a pay action.
    #[default]
    Idle,
    /// Pay action accepted, simulated network call in flight.
    Processing,
    /// Waiting for the customer to approve on their phone; countdown running.
    Waiting,
    /// Authorized. Permanently terminal for the session.
    Success,
    /// Timed out or failed. Terminal until retried.
    Failed,
}

impl PaymentStatus {
    /// Status name for display and logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Waiting => "waiting",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Whether the session has concluded.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Whether a simulated timer is outstanding in this status.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Processing | Self::Waiting)
    }

    /// Whether the user can recover from this status with a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
