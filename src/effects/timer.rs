//! Cancellable simulated timers.
//!
//! Each armed timer is a tokio task that sleeps and then sends a `Signal`
//! back to the driver. Signals carry the generation they were armed with;
//! once a timer is cancelled or re-armed its generation is no longer
//! current, so a signal already sitting in the channel is recognised as
//! stale and dropped.

use crate::core::TimerKind;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Expiry notification sent by an armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signal {
    pub kind: TimerKind,
    pub generation: u64,
}

struct Armed {
    generation: u64,
    repeating: bool,
    task: JoinHandle<()>,
}

/// Owner of every pending timer of one payment machine.
///
/// Dropping `Timers` aborts all pending tasks.
pub struct Timers {
    sender: mpsc::UnboundedSender<Signal>,
    armed: HashMap<TimerKind, Armed>,
    next_generation: u64,
}

impl Timers {
    pub fn new(sender: mpsc::UnboundedSender<Signal>) -> Self {
        Self {
            sender,
            armed: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Arm a one-shot timer, replacing any pending timer of the same kind.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) -> u64 {
        let generation = self.bump(kind);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(Signal { kind, generation });
        });

        self.armed.insert(
            kind,
            Armed {
                generation,
                repeating: false,
                task,
            },
        );
        generation
    }

    /// Arm a repeating timer whose first signal arrives one `period` from now.
    pub fn repeat(&mut self, kind: TimerKind, period: Duration) -> u64 {
        let generation = self.bump(kind);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticks.tick().await;
                if sender.send(Signal { kind, generation }).is_err() {
                    break;
                }
            }
        });

        self.armed.insert(
            kind,
            Armed {
                generation,
                repeating: true,
                task,
            },
        );
        generation
    }

    /// Accept a signal if it belongs to a currently armed timer.
    ///
    /// One-shot timers are disarmed by their signal; repeating timers stay armed.
    pub fn accept(&mut self, signal: Signal) -> bool {
        match self.armed.get(&signal.kind) {
            Some(armed) if armed.generation == signal.generation => {
                if !armed.repeating {
                    self.armed.remove(&signal.kind);
                }
                true
            }
            _ => false,
        }
    }

    /// Cancel one timer. Returns whether it was armed.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.armed.remove(&kind) {
            Some(armed) => {
                armed.task.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, armed) in self.armed.drain() {
            armed.task.abort();
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains_key(&kind)
    }

    pub fn pending(&self) -> usize {
        self.armed.len()
    }

    fn bump(&mut self, kind: TimerKind) -> u64 {
        self.cancel(kind);
        self.next_generation += 1;
        self.next_generation
    }
}

impl Drop for Timers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
