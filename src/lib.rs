//! Momopay: a simulated mobile-money payment flow
//!
//! Momopay follows a "pure core, imperative shell" layout. The core decides
//! every status change with pure functions, while the shell owns the clock:
//! simulated delays, the approval countdown, and the caller's callbacks.
//!
//! # Core Concepts
//!
//! - **Provider detection**: map a phone number's dialing prefix to MTN,
//!   Vodafone or AirtelTigo
//! - **Session**: one attempt moving `Idle -> Processing -> Waiting -> Success`,
//!   or into `Failed` on timeout or simulated failure
//! - **Transition**: a pure function from (session, event) to (session, commands)
//! - **Machine**: a tokio task that runs those commands and reports outcomes
//!
//! # Example
//!
//! ```rust
//! use momopay::core::{transition, PaymentEvent, PaymentSession, PaymentStatus};
//! use momopay::config::SimulationConfig;
//! use rust_decimal::Decimal;
//!
//! let config = SimulationConfig::default();
//! let session = PaymentSession::new(&config);
//!
//! let step = transition(
//!     &session,
//!     PaymentEvent::Pay {
//!         amount: Decimal::new(15000, 2),
//!         phone_number: "024 123 4567".to_string(),
//!     },
//!     &config,
//! )
//! .unwrap();
//!
//! assert_eq!(step.session.status, PaymentStatus::Processing);
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod display;
pub mod effects;
pub mod error;
pub mod validation;

// Re-export commonly used types
pub use crate::builder::{BuildError, PaymentMachineBuilder};
pub use crate::config::{FailureInjection, SimulationConfig};
pub use crate::core::{detect_provider, PaymentStatus, Provider, SessionSnapshot};
pub use crate::effects::PaymentHandle;
pub use crate::error::{MachineError, PaymentFailure, ValidationError};
