//! One-shot timers that report back over a channel.
//!
//! A timer is a spawned task that sleeps until its deadline and then sends a
//! [`TimerFired`] message. The owner of the receiving end feeds those messages
//! back into the engine on the same task that handles user input, so state is
//! only ever mutated from one place. Dropping a [`PendingTimer`] aborts it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique timer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> Self {
        Self(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Hide the revealed solution.
    RevealExpired,
    /// Move on after a correct submission.
    Advance,
}

/// Message sent when a timer reaches its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    /// Which timer fired.
    pub id: TimerId,
    /// What it was for.
    pub kind: TimerKind,
}

/// Sending half handed to everything that schedules timers.
pub type TimerSender = mpsc::UnboundedSender<TimerFired>;

/// Receiving half drained by the player's event loop.
pub type TimerReceiver = mpsc::UnboundedReceiver<TimerFired>;

/// Creates the channel fired timers are delivered on.
#[must_use]
pub fn timer_channel() -> (TimerSender, TimerReceiver) {
    mpsc::unbounded_channel()
}

/// A scheduled timer that has not been consumed yet.
#[derive(Debug)]
pub struct PendingTimer {
    id: TimerId,
    kind: TimerKind,
    handle: JoinHandle<()>,
}

impl PendingTimer {
    /// Spawns a timer that fires `delay` from now.
    ///
    /// The deadline is fixed at the time of the call, not when the spawned
    /// task first runs. Must be called from within a tokio runtime.
    pub fn schedule(kind: TimerKind, delay: Duration, sender: &TimerSender) -> Self {
        let id = TimerId::next();
        let deadline = Instant::now() + delay;
        let sender = sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The receiver is gone only when the player shut down.
            let _ = sender.send(TimerFired { id, kind });
        });

        tracing::debug!(timer_id = %id, ?kind, ?delay, "Timer scheduled");
        Self { id, kind, handle }
    }

    /// The timer's id.
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    /// What the timer is for.
    #[must_use]
    pub const fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Returns `true` if `fired` was sent by this timer.
    #[must_use]
    pub fn matches(&self, fired: &TimerFired) -> bool {
        self.id == fired.id
    }
}

impl Drop for PendingTimer {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            tracing::debug!(timer_id = %self.id, kind = ?self.kind, "Timer cancelled");
        }
        self.handle.abort();
    }
}
