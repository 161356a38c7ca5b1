#![allow(dead_code)]

use momopay::{PaymentHandle, PaymentMachineBuilder, SimulationConfig};
use std::sync::{Arc, Mutex};

/// Callback invocations captured for assertions.
#[derive(Clone, Default)]
pub struct Outcomes {
    successes: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl Outcomes {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn total(&self) -> usize {
        self.successes().len() + self.errors().len()
    }
}

/// Spawn a machine whose callbacks record into the returned `Outcomes`.
pub fn spawn(config: SimulationConfig) -> (PaymentHandle, Outcomes) {
    let outcomes = Outcomes::default();
    let successes = Arc::clone(&outcomes.successes);
    let errors = Arc::clone(&outcomes.errors);

    let handle = PaymentMachineBuilder::new()
        .config(config)
        .on_success(move |id| successes.lock().unwrap().push(id))
        .on_error(move |reason| errors.lock().unwrap().push(reason))
        .build()
        .expect("machine should build inside a runtime");

    (handle, outcomes)
}

pub const MTN_NUMBER: &str = "0241234567";
