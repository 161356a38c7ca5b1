//! Builder for spawning payment machines.

use crate::builder::error::BuildError;
use crate::config::SimulationConfig;
use crate::effects::{Callbacks, ErrorCallback, PaymentHandle, PaymentMachine, SuccessCallback};

/// Fluent construction of a payment machine.
///
/// Both callbacks are required; the config defaults to
/// `SimulationConfig::default()`.
pub struct PaymentMachineBuilder {
    config: SimulationConfig,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl PaymentMachineBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            on_success: None,
            on_error: None,
        }
    }

    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the success callback (required). Receives the transaction id.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Register the error callback (required). Receives the failure reason.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Validate and spawn the machine on the current tokio runtime.
    pub fn build(self) -> Result<PaymentHandle, BuildError> {
        self.config.validate()?;
        let on_success = self.on_success.ok_or(BuildError::MissingSuccessCallback)?;
        let on_error = self.on_error.ok_or(BuildError::MissingErrorCallback)?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(BuildError::NoRuntime);
        }

        Ok(PaymentMachine::spawn(
            self.config,
            Callbacks {
                on_success,
                on_error,
            },
        ))
    }
}

impl Default for PaymentMachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
