//! Pure core of the payment simulation.
//!
//! This module contains everything that can be decided without a clock:
//! - Provider profiles and prefix detection
//! - The `PaymentStatus` enum and `PaymentSession` data
//! - The transition function and the commands it emits
//! - Immutable history tracking
//!
//! Timers and callbacks live in `effects`.

pub mod provider;
mod history;
mod session;
mod state;
mod transition;

pub use history::{SessionHistory, StatusTransition};
pub use provider::{detect_provider, Provider, ProviderProfile, PROVIDERS};
pub use session::{PaymentSession, SessionSnapshot};
pub use state::PaymentStatus;
pub use transition::{transition, Command, PaymentEvent, Step, TimerKind, TransitionError, TICK};
