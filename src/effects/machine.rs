//! Driver task and caller-facing handle.
//!
//! The driver owns the session, its timers and the callbacks. User actions
//! reach it over a command channel and timer expiries over a signal channel;
//! both are applied one at a time through the pure transition function, so
//! no two transitions ever run concurrently.

use crate::config::SimulationConfig;
use crate::core::{
    transition, Command, PaymentEvent, PaymentSession, PaymentStatus, SessionHistory,
    SessionSnapshot, StatusTransition, TimerKind, TransitionError, TICK,
};
use crate::effects::timer::{Signal, Timers};
use crate::error::MachineError;
use crate::validation::can_pay;
use chrono::Utc;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Called once with the transaction id when a session succeeds.
pub type SuccessCallback = Box<dyn FnMut(String) + Send>;

/// Called once with the failure reason when a session fails.
pub type ErrorCallback = Box<dyn FnMut(String) + Send>;

pub(crate) struct Callbacks {
    pub on_success: SuccessCallback,
    pub on_error: ErrorCallback,
}

/// Fresh transaction identifier: fixed prefix, wall-clock millis, random suffix.
pub fn generate_transaction_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("TXN-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

enum Action {
    EnterPhone(String),
    StartPayment { amount: Decimal, phone_number: String },
    Cancel,
    Retry,
    InjectFailure,
}

impl Action {
    fn into_event(self) -> PaymentEvent {
        match self {
            Self::EnterPhone(phone) => PaymentEvent::PhoneEntered(phone),
            Self::StartPayment {
                amount,
                phone_number,
            } => PaymentEvent::Pay {
                amount,
                phone_number,
            },
            Self::Cancel => PaymentEvent::Cancel,
            Self::Retry => PaymentEvent::Retry,
            Self::InjectFailure => PaymentEvent::SimulatedFailure,
        }
    }
}

enum Request {
    Act {
        action: Action,
        done: oneshot::Sender<()>,
    },
    History(oneshot::Sender<SessionHistory>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Driver for one payment widget: the session plus everything with a clock.
pub(crate) struct PaymentMachine {
    config: SimulationConfig,
    session: PaymentSession,
    history: SessionHistory,
    timers: Timers,
    countdown_deadline: Option<Instant>,
    callbacks: Callbacks,
    signals: mpsc::UnboundedReceiver<Signal>,
    requests: mpsc::UnboundedReceiver<Request>,
    snapshots: watch::Sender<SessionSnapshot>,
    token: CancellationToken,
}

impl PaymentMachine {
    /// Spawn the driver on the current tokio runtime.
    pub(crate) fn spawn(config: SimulationConfig, callbacks: Callbacks) -> PaymentHandle {
        let session = PaymentSession::new(&config);
        let (signal_tx, signals) = mpsc::unbounded_channel();
        let (request_tx, requests) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(session.snapshot(&config));
        let token = CancellationToken::new();

        let handle = PaymentHandle {
            requests: request_tx,
            snapshots: snapshot_rx,
            token: token.clone(),
            min_phone_digits: config.min_phone_digits,
        };

        let machine = Self {
            config,
            session,
            history: SessionHistory::new(),
            timers: Timers::new(signal_tx),
            countdown_deadline: None,
            callbacks,
            signals,
            requests,
            snapshots,
            token,
        };
        tokio::spawn(machine.run());

        handle
    }

    async fn run(mut self) {
        debug!(attempt = self.session.attempt, "Payment machine started");

        loop {
            tokio::select! {
                biased;
                () = self.token.cancelled() => {
                    debug!("Payment machine cancelled");
                    break;
                }
                Some(signal) = self.signals.recv() => {
                    self.on_signal(signal);
                }
                request = self.requests.recv() => {
                    let Some(request) = request else {
                        debug!("All payment handles dropped");
                        break;
                    };
                    if self.on_request(request) == Flow::Stop {
                        break;
                    }
                }
            }
        }

        self.timers.cancel_all();
        debug!(status = %self.session.status, "Payment machine stopped");
    }

    fn on_signal(&mut self, signal: Signal) {
        if !self.timers.accept(signal) {
            trace!(kind = ?signal.kind, generation = signal.generation, "Dropping stale timer signal");
            return;
        }

        let event = match signal.kind {
            TimerKind::NetworkDelay => PaymentEvent::NetworkDelayElapsed,
            TimerKind::Countdown => PaymentEvent::Tick,
            // Authorization landing at or past the deadline loses to the countdown.
            TimerKind::Authorization => match self.countdown_deadline {
                Some(deadline) if Instant::now() >= deadline => PaymentEvent::CountdownExpired,
                _ => PaymentEvent::AuthorizationResolved {
                    transaction_id: generate_transaction_id(),
                },
            },
        };

        if let Err(e) = self.apply(event) {
            debug!(error = %e, "Timer event refused");
        }
    }

    fn on_request(&mut self, request: Request) -> Flow {
        match request {
            Request::History(reply) => {
                let _ = reply.send(self.history.clone());
                Flow::Continue
            }
            Request::Act { action, done } => {
                let flow = match self.apply(action.into_event()) {
                    Ok(flow) => flow,
                    Err(e @ TransitionError::Rejected(_)) => {
                        warn!(error = %e, "Pay action refused");
                        Flow::Continue
                    }
                    Err(e) => {
                        debug!(error = %e, "Action ignored");
                        Flow::Continue
                    }
                };
                let _ = done.send(());
                flow
            }
        }
    }

    fn apply(&mut self, event: PaymentEvent) -> Result<Flow, TransitionError> {
        let event_name = event.name();
        let step = transition(&self.session, event, &self.config)?;

        let (from, to) = (self.session.status, step.session.status);
        if from != to {
            debug!(%from, %to, event = event_name, attempt = step.session.attempt, "Payment status changed");
            self.history = std::mem::take(&mut self.history)
                .record(StatusTransition {
                    from,
                    to,
                    timestamp: Utc::now(),
                    attempt: step.session.attempt,
                })
                .retain_attempts(self.config.history_attempts);
        }
        self.session = step.session;

        let mut flow = Flow::Continue;
        for command in step.commands {
            match command {
                Command::Schedule(kind, delay) => {
                    self.timers.schedule(kind, delay);
                }
                Command::StartCountdown => {
                    let remaining = Duration::from_secs(u64::from(self.session.remaining_seconds));
                    self.countdown_deadline = Some(Instant::now() + remaining);
                    self.timers.repeat(TimerKind::Countdown, TICK);
                }
                Command::CancelAllTimers => {
                    self.timers.cancel_all();
                    self.countdown_deadline = None;
                }
                Command::NotifySuccess(transaction_id) => {
                    info!(
                        %transaction_id,
                        amount = %self.session.amount,
                        currency = %self.session.currency,
                        "Payment succeeded"
                    );
                    (self.callbacks.on_success)(transaction_id);
                }
                Command::NotifyError(failure) => {
                    info!(reason = failure.reason(), attempt = self.session.attempt, "Payment failed");
                    (self.callbacks.on_error)(failure.to_string());
                }
                Command::Close => {
                    info!("Payment cancelled by user");
                    flow = Flow::Stop;
                }
            }
        }

        self.snapshots.send_replace(self.session.snapshot(&self.config));
        Ok(flow)
    }
}

/// Caller-side handle to a running payment machine.
///
/// Handles are cheap to clone. The machine stops once every handle is
/// dropped, on `shutdown`, or after a `cancel` from `Idle`; stopping aborts
/// all pending timers so no callback fires afterwards.
#[derive(Clone)]
pub struct PaymentHandle {
    requests: mpsc::UnboundedSender<Request>,
    snapshots: watch::Receiver<SessionSnapshot>,
    token: CancellationToken,
    min_phone_digits: usize,
}

impl PaymentHandle {
    /// Update the phone number while idle, refreshing provider detection.
    pub async fn enter_phone(&self, phone: impl Into<String>) -> Result<(), MachineError> {
        self.act(Action::EnterPhone(phone.into())).await
    }

    /// Start a payment. Refused silently (status stays `Idle`) when no
    /// provider is detected or the number is too short.
    pub async fn start_payment(
        &self,
        amount: Decimal,
        phone_number: impl Into<String>,
    ) -> Result<(), MachineError> {
        self.act(Action::StartPayment {
            amount,
            phone_number: phone_number.into(),
        })
        .await
    }

    /// Abandon the payment from `Idle`. Ignored in every other status.
    pub async fn cancel(&self) -> Result<(), MachineError> {
        self.act(Action::Cancel).await
    }

    /// Return a failed session to `Idle`. Ignored unless `Failed`.
    pub async fn retry(&self) -> Result<(), MachineError> {
        self.act(Action::Retry).await
    }

    /// Force the failure path while `Processing` or `Waiting`.
    pub async fn inject_failure(&self) -> Result<(), MachineError> {
        self.act(Action::InjectFailure).await
    }

    pub async fn history(&self) -> Result<SessionHistory, MachineError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::History(reply))
            .map_err(|_| MachineError::Closed)?;
        response.await.map_err(|_| MachineError::Closed)
    }

    /// Whether the pay button should be enabled for `phone`.
    pub fn can_start(&self, phone: &str) -> bool {
        self.status() == PaymentStatus::Idle && can_pay(phone, self.min_phone_digits)
    }

    pub fn status(&self) -> PaymentStatus {
        self.snapshots.borrow().status
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.snapshots.borrow().remaining_seconds
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> Result<SessionSnapshot, MachineError>
    where
        F: FnMut(&SessionSnapshot) -> bool,
    {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| MachineError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Tear the machine down, cancelling every pending timer.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }

    /// Resolves once the driver has stopped.
    pub async fn closed(&self) {
        self.requests.closed().await;
    }

    async fn act(&self, action: Action) -> Result<(), MachineError> {
        let (done, applied) = oneshot::channel();
        self.requests
            .send(Request::Act { action, done })
            .map_err(|_| MachineError::Closed)?;
        applied.await.map_err(|_| MachineError::Closed)
    }
}
