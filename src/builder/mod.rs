//! Builder API for spawning payment machines.
//!
//! ```no_run
//! use momopay::builder::PaymentMachineBuilder;
//! use momopay::config::SimulationConfig;
//!
//! # async fn run() -> Result<(), momopay::builder::BuildError> {
//! let handle = PaymentMachineBuilder::new()
//!     .config(SimulationConfig::default())
//!     .on_success(|transaction_id| println!("paid: {transaction_id}"))
//!     .on_error(|reason| eprintln!("payment failed: {reason}"))
//!     .build()?;
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod machine;

pub use error::BuildError;
pub use machine::PaymentMachineBuilder;
