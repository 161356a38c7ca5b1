//! Build errors for payment machines.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur when building a payment machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Success callback not specified. Call .on_success(callback) before .build()")]
    MissingSuccessCallback,

    #[error("Error callback not specified. Call .on_error(callback) before .build()")]
    MissingErrorCallback,

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("No tokio runtime available to drive the payment machine")]
    NoRuntime,
}
