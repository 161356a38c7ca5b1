//! Imperative shell around the pure core.
//!
//! # Key Concepts
//!
//! - **Timers**: simulated delays and the countdown, as cancellable tokio tasks
//! - **Machine**: a driver task that applies events one at a time and runs the
//!   commands each transition returns
//! - **Handle**: the caller's view; sends actions and observes snapshots

mod machine;
mod timer;

pub(crate) use machine::{Callbacks, PaymentMachine};
pub use machine::{generate_transaction_id, ErrorCallback, PaymentHandle, SuccessCallback};
pub use timer::{Signal, Timers};
