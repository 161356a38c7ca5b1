//! Checkout
//!
//! Drives one simulated mobile-money payment from the terminal, printing
//! the approval countdown until the session settles.
//!
//! Configuration starts from `MOMOPAY_*` environment variables; flags
//! override them.
//!
//! Run with: cargo run --example checkout -- --phone "024 123 4567" --amount 150
//! Verbose:  RUST_LOG=momopay=debug cargo run --example checkout -- --fail

use clap::Parser;
use momopay::display::{format_amount, format_countdown};
use momopay::{FailureInjection, PaymentMachineBuilder, PaymentStatus, SimulationConfig};
use rust_decimal::Decimal;
use std::error::Error;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payer phone number, local or +233 format
    #[arg(long, default_value = "024 123 4567")]
    phone: String,

    /// Amount to charge
    #[arg(long, default_value = "150.00")]
    amount: Decimal,

    /// Currency code shown with the amount
    #[arg(long)]
    currency: Option<String>,

    /// Fail the payment when authorization resolves
    #[arg(long)]
    fail: bool,

    #[arg(long)]
    network_delay_ms: Option<u64>,

    #[arg(long)]
    auth_delay_ms: Option<u64>,

    /// Seconds the payer has to approve on their handset
    #[arg(long)]
    countdown: Option<u32>,
}

impl Cli {
    fn apply(&self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(currency) = &self.currency {
            config = config.currency(currency.clone());
        }
        if let Some(ms) = self.network_delay_ms {
            config = config.network_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.auth_delay_ms {
            config = config.authorization_delay(Duration::from_millis(ms));
        }
        if let Some(secs) = self.countdown {
            config = config.countdown_secs(secs);
        }
        if self.fail {
            config = config.failure(FailureInjection::OnAuthorization);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.apply(SimulationConfig::from_env()?);
    let currency = config.currency.clone();

    let handle = PaymentMachineBuilder::new()
        .config(config)
        .on_success(|transaction_id| println!("Payment approved: {transaction_id}"))
        .on_error(|reason| println!("Payment failed: {reason}"))
        .build()?;

    handle.enter_phone(cli.phone.as_str()).await?;
    let snapshot = handle.snapshot();
    match snapshot.provider_name {
        Some(name) => println!("Detected provider: {name}"),
        None => println!("No provider matches {}", cli.phone),
    }
    if !handle.can_start(&cli.phone) {
        println!("Pay is disabled for this number");
        handle.shutdown();
        return Ok(());
    }

    println!("Charging {}", format_amount(cli.amount, &currency));
    handle.start_payment(cli.amount, cli.phone.as_str()).await?;

    let mut snapshots = handle.subscribe();
    let mut last = PaymentStatus::Idle;
    loop {
        let current = snapshots.borrow_and_update().clone();
        if current.status != last {
            println!("Status: {}", current.status);
            last = current.status;
        }
        if current.status == PaymentStatus::Waiting {
            println!(
                "Approve on your phone ({} left)",
                format_countdown(current.remaining_seconds)
            );
        }
        if current.status.is_final() {
            println!("{}", current.to_json()?);
            break;
        }
        if snapshots.changed().await.is_err() {
            break;
        }
    }

    handle.shutdown();
    Ok(())
}
