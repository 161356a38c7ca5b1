//! Pure transition function for payment sessions.
//!
//! `transition` never sleeps, spawns or calls back. It returns the next
//! session together with the commands the shell must carry out (arm or
//! cancel timers, notify the caller, close). Refused events leave the
//! session untouched and come back as `TransitionError`.

use super::session::PaymentSession;
use super::state::PaymentStatus;
use crate::config::{FailureInjection, SimulationConfig};
use crate::error::{PaymentFailure, ValidationError};
use crate::validation::{into_result, validate_pay_request};
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// Interval between countdown ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// The simulated timers a session can arm. At most one of each is pending.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TimerKind {
    /// Processing -> Waiting.
    NetworkDelay,
    /// Waiting -> Success.
    Authorization,
    /// One tick per second while waiting.
    Countdown,
}

/// Inputs to the state machine: user actions and timer expiries.
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentEvent {
    PhoneEntered(String),
    Pay {
        amount: Decimal,
        phone_number: String,
    },
    NetworkDelayElapsed,
    Tick,
    /// The countdown deadline passed before a pending tick was applied.
    CountdownExpired,
    AuthorizationResolved {
        transaction_id: String,
    },
    SimulatedFailure,
    Retry,
    Cancel,
}

impl PaymentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhoneEntered(_) => "phone_entered",
            Self::Pay { .. } => "pay",
            Self::NetworkDelayElapsed => "network_delay_elapsed",
            Self::Tick => "tick",
            Self::CountdownExpired => "countdown_expired",
            Self::AuthorizationResolved { .. } => "authorization_resolved",
            Self::SimulatedFailure => "simulated_failure",
            Self::Retry => "retry",
            Self::Cancel => "cancel",
        }
    }
}

/// Side effects requested by a transition, in execution order.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Arm a one-shot timer.
    Schedule(TimerKind, Duration),
    /// Arm the repeating countdown timer for `remaining_seconds` ticks.
    StartCountdown,
    CancelAllTimers,
    NotifySuccess(String),
    NotifyError(PaymentFailure),
    /// End the machine; no further events are accepted.
    Close,
}

/// Result of an accepted event.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub session: PaymentSession,
    pub commands: Vec<Command>,
}

impl Step {
    fn quiet(session: PaymentSession) -> Self {
        Self {
            session,
            commands: Vec::new(),
        }
    }

    fn with(session: PaymentSession, commands: Vec<Command>) -> Self {
        Self { session, commands }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("Pay action refused: {}", describe(.0))]
    Rejected(Vec<ValidationError>),

    #[error("Event '{event}' not allowed while {status}")]
    NotAllowed {
        status: PaymentStatus,
        event: &'static str,
    },
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Apply one event to a session.
pub fn transition(
    session: &PaymentSession,
    event: PaymentEvent,
    config: &SimulationConfig,
) -> Result<Step, TransitionError> {
    use PaymentStatus::*;

    match (session.status, event) {
        (Idle, PaymentEvent::PhoneEntered(phone)) => {
            let mut next = session.clone();
            next.set_phone(&phone);
            Ok(Step::quiet(next))
        }

        (Idle, PaymentEvent::Pay {
            amount,
            phone_number,
        }) => {
            into_result(validate_pay_request(&phone_number, config.min_phone_digits))
                .map_err(TransitionError::Rejected)?;

            let mut next = session.clone();
            next.set_phone(&phone_number);
            next.amount = amount;
            next.status = Processing;
            Ok(Step::with(
                next,
                vec![Command::Schedule(
                    TimerKind::NetworkDelay,
                    config.network_delay,
                )],
            ))
        }

        (Idle, PaymentEvent::Cancel) => Ok(Step::with(
            session.clone(),
            vec![Command::CancelAllTimers, Command::Close],
        )),

        (Processing, PaymentEvent::NetworkDelayElapsed) => {
            let mut next = session.clone();
            next.status = Waiting;
            next.remaining_seconds = config.countdown_secs;
            Ok(Step::with(
                next,
                vec![
                    Command::StartCountdown,
                    Command::Schedule(TimerKind::Authorization, config.authorization_delay),
                ],
            ))
        }

        (Waiting, PaymentEvent::Tick) => {
            let remaining = session.remaining_seconds.saturating_sub(1);
            if remaining == 0 {
                return Ok(fail(session, 0, PaymentFailure::Timeout));
            }
            let mut next = session.clone();
            next.remaining_seconds = remaining;
            Ok(Step::quiet(next))
        }

        (Waiting, PaymentEvent::CountdownExpired) => {
            Ok(fail(session, 0, PaymentFailure::Timeout))
        }

        (Waiting, PaymentEvent::AuthorizationResolved { transaction_id }) => {
            if config.failure == FailureInjection::OnAuthorization {
                return Ok(fail(
                    session,
                    session.remaining_seconds,
                    PaymentFailure::SimulatedFailure,
                ));
            }

            let mut next = session.clone();
            next.status = Success;
            next.transaction_id = Some(transaction_id.clone());
            Ok(Step::with(
                next,
                vec![
                    Command::CancelAllTimers,
                    Command::NotifySuccess(transaction_id),
                ],
            ))
        }

        (status, PaymentEvent::SimulatedFailure) if status.is_in_flight() => Ok(fail(
            session,
            session.remaining_seconds,
            PaymentFailure::SimulatedFailure,
        )),

        (status, PaymentEvent::Retry) if status.is_retryable() => Ok(Step::with(
            session.retried(config),
            vec![Command::CancelAllTimers],
        )),

        (status, event) => Err(TransitionError::NotAllowed {
            status,
            event: event.name(),
        }),
    }
}

fn fail(session: &PaymentSession, remaining_seconds: u32, failure: PaymentFailure) -> Step {
    let mut next = session.failed(failure);
    next.remaining_seconds = remaining_seconds;
    Step::with(
        next,
        vec![Command::CancelAllTimers, Command::NotifyError(failure)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config() -> SimulationConfig {
        SimulationConfig::default()
    }

    fn pay(phone: &str) -> PaymentEvent {
        PaymentEvent::Pay {
            amount: dec!(150.00),
            phone_number: phone.to_string(),
        }
    }

    fn apply(session: &PaymentSession, event: PaymentEvent) -> Step {
        transition(session, event, &config()).unwrap()
    }

    fn waiting_session() -> PaymentSession {
        let idle = PaymentSession::new(&config());
        let processing = apply(&idle, pay("0241234567")).session;
        apply(&processing, PaymentEvent::NetworkDelayElapsed).session
    }

    #[test]
    fn pay_moves_idle_to_processing_and_arms_network_delay() {
        let step = apply(&PaymentSession::new(&config()), pay("0241234567"));

        assert_eq!(step.session.status, PaymentStatus::Processing);
        assert_eq!(step.session.amount, dec!(150.00));
        assert_eq!(
            step.session.detected_provider,
            Some(crate::core::Provider::Mtn)
        );
        assert_eq!(
            step.commands,
            vec![Command::Schedule(
                TimerKind::NetworkDelay,
                Duration::from_secs(2)
            )]
        );
    }

    #[test]
    fn pay_with_short_number_is_refused_without_change() {
        let session = PaymentSession::new(&config());
        let err = transition(&session, pay("024123"), &config()).unwrap_err();

        assert!(matches!(err, TransitionError::Rejected(ref errors) if errors.len() == 1));
        assert_eq!(session.status, PaymentStatus::Idle);
    }

    #[test]
    fn pay_without_provider_is_refused() {
        let session = PaymentSession::new(&config());
        let err = transition(&session, pay("0301234567"), &config()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::Rejected(vec![ValidationError::NoProviderDetected])
        );
    }

    #[test]
    fn pay_accepts_any_amount_once_the_number_is_valid() {
        for amount in [dec!(0), dec!(-5)] {
            let event = PaymentEvent::Pay {
                amount,
                phone_number: "0241234567".to_string(),
            };
            let step = apply(&PaymentSession::new(&config()), event);

            assert_eq!(step.session.status, PaymentStatus::Processing);
            assert_eq!(step.session.amount, amount);
        }
    }

    #[test]
    fn network_delay_enters_waiting_with_full_countdown() {
        let session = waiting_session();
        assert_eq!(session.status, PaymentStatus::Waiting);
        assert_eq!(session.remaining_seconds, 300);
    }

    #[test]
    fn network_delay_arms_countdown_and_authorization() {
        let processing = apply(&PaymentSession::new(&config()), pay("0241234567")).session;
        let step = apply(&processing, PaymentEvent::NetworkDelayElapsed);

        assert_eq!(
            step.commands,
            vec![
                Command::StartCountdown,
                Command::Schedule(TimerKind::Authorization, Duration::from_secs(5)),
            ]
        );
    }

    #[test]
    fn tick_decrements_while_waiting() {
        let step = apply(&waiting_session(), PaymentEvent::Tick);
        assert_eq!(step.session.remaining_seconds, 299);
        assert!(step.commands.is_empty());
    }

    #[test]
    fn last_tick_fails_with_timeout() {
        let mut session = waiting_session();
        session.remaining_seconds = 1;

        let step = apply(&session, PaymentEvent::Tick);

        assert_eq!(step.session.status, PaymentStatus::Failed);
        assert_eq!(step.session.remaining_seconds, 0);
        assert_eq!(step.session.failure, Some(PaymentFailure::Timeout));
        assert_eq!(
            step.commands,
            vec![
                Command::CancelAllTimers,
                Command::NotifyError(PaymentFailure::Timeout)
            ]
        );
    }

    #[test]
    fn countdown_expired_forces_timeout() {
        let step = apply(&waiting_session(), PaymentEvent::CountdownExpired);
        assert_eq!(step.session.status, PaymentStatus::Failed);
        assert_eq!(step.session.remaining_seconds, 0);
    }

    #[test]
    fn authorization_succeeds_with_transaction_id() {
        let step = apply(
            &waiting_session(),
            PaymentEvent::AuthorizationResolved {
                transaction_id: "TXN-1".to_string(),
            },
        );

        assert_eq!(step.session.status, PaymentStatus::Success);
        assert_eq!(step.session.transaction_id.as_deref(), Some("TXN-1"));
        assert_eq!(
            step.commands,
            vec![
                Command::CancelAllTimers,
                Command::NotifySuccess("TXN-1".to_string())
            ]
        );
    }

    #[test]
    fn injected_failure_on_authorization() {
        let config = config().failure(FailureInjection::OnAuthorization);
        let step = transition(
            &waiting_session(),
            PaymentEvent::AuthorizationResolved {
                transaction_id: "TXN-1".to_string(),
            },
            &config,
        )
        .unwrap();

        assert_eq!(step.session.status, PaymentStatus::Failed);
        assert_eq!(step.session.transaction_id, None);
        assert_eq!(
            step.session.failure,
            Some(PaymentFailure::SimulatedFailure)
        );
    }

    #[test]
    fn simulated_failure_allowed_while_processing() {
        let processing = apply(&PaymentSession::new(&config()), pay("0241234567")).session;
        let step = apply(&processing, PaymentEvent::SimulatedFailure);
        assert_eq!(step.session.status, PaymentStatus::Failed);
    }

    #[test]
    fn simulated_failure_needs_a_session_in_flight() {
        let idle = PaymentSession::new(&config());
        let failed = apply(&waiting_session(), PaymentEvent::SimulatedFailure).session;

        for session in [idle, failed] {
            assert!(!session.status.is_in_flight());
            assert_eq!(
                transition(&session, PaymentEvent::SimulatedFailure, &config()).unwrap_err(),
                TransitionError::NotAllowed {
                    status: session.status,
                    event: "simulated_failure"
                }
            );
        }
    }

    #[test]
    fn success_is_permanently_terminal() {
        let success = apply(
            &waiting_session(),
            PaymentEvent::AuthorizationResolved {
                transaction_id: "TXN-1".to_string(),
            },
        )
        .session;

        for event in [
            PaymentEvent::Retry,
            PaymentEvent::Tick,
            PaymentEvent::SimulatedFailure,
            PaymentEvent::Cancel,
            pay("0241234567"),
        ] {
            assert!(transition(&success, event, &config()).is_err());
        }
    }

    #[test]
    fn retry_only_from_failed() {
        let idle = PaymentSession::new(&config());
        assert_eq!(
            transition(&idle, PaymentEvent::Retry, &config()).unwrap_err(),
            TransitionError::NotAllowed {
                status: PaymentStatus::Idle,
                event: "retry"
            }
        );

        let failed = apply(&waiting_session(), PaymentEvent::CountdownExpired).session;
        let retried = apply(&failed, PaymentEvent::Retry).session;
        assert_eq!(retried.status, PaymentStatus::Idle);
        assert_eq!(retried.remaining_seconds, 300);
        assert_eq!(retried.attempt, 2);
    }

    #[test]
    fn stale_timer_events_are_refused() {
        let idle = PaymentSession::new(&config());
        assert!(transition(&idle, PaymentEvent::Tick, &config()).is_err());
        assert!(transition(&idle, PaymentEvent::NetworkDelayElapsed, &config()).is_err());

        let waiting = waiting_session();
        assert!(transition(&waiting, PaymentEvent::NetworkDelayElapsed, &config()).is_err());
    }

    #[test]
    fn cancel_only_in_idle() {
        let idle = PaymentSession::new(&config());
        let step = apply(&idle, PaymentEvent::Cancel);
        assert_eq!(step.commands, vec![Command::CancelAllTimers, Command::Close]);

        assert!(transition(&waiting_session(), PaymentEvent::Cancel, &config()).is_err());
    }

    #[test]
    fn phone_entry_only_in_idle() {
        let idle = PaymentSession::new(&config());
        let step = apply(&idle, PaymentEvent::PhoneEntered("0501234567".to_string()));
        assert_eq!(
            step.session.detected_provider,
            Some(crate::core::Provider::Vodafone)
        );

        assert!(transition(
            &waiting_session(),
            PaymentEvent::PhoneEntered("0501234567".to_string()),
            &config()
        )
        .is_err());
    }

    #[test]
    fn rejected_error_lists_every_reason() {
        let err = TransitionError::Rejected(vec![
            ValidationError::NoProviderDetected,
            ValidationError::PhoneTooShort {
                digits: 3,
                required: 10,
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Pay action refused: No mobile money provider detected for this number; \
             Phone number has 3 digits, at least 10 required"
        );
    }
}
