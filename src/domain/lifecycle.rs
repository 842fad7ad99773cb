//! Service lifecycle - state, the one-shot shutdown gate and the
//! capabilities the controller borrows from the call-handling subsystem

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Notify;

/// Lifecycle state of the gateway process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceState {
    Created,
    Running,
    /// Intake deregistered, waiting for admitted calls to finish
    Draining,
    Stopped,
}

impl ServiceState {
    pub fn can_transition_to(&self, next: ServiceState) -> bool {
        use ServiceState::*;

        matches!(
            (self, next),
            (Created, Running) | (Created, Stopped) | (Running, Draining) | (Draining, Stopped)
        )
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Created => "created",
            ServiceState::Running => "running",
            ServiceState::Draining => "draining",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// How the service was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutdownMode {
    /// Wait for active calls before tearing down
    Drain,
    /// Tear down immediately
    Kill,
}

impl ShutdownMode {
    pub fn from_kill(kill: bool) -> Self {
        if kill {
            ShutdownMode::Kill
        } else {
            ShutdownMode::Drain
        }
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, ShutdownMode::Kill)
    }
}

const GATE_OPEN: u8 = 0;
const GATE_DRAIN: u8 = 1;
const GATE_KILL: u8 = 2;

/// One-shot shutdown gate.
///
/// The first `trip` wins: it records the shutdown mode and closes the gate
/// in a single compare-and-swap. Every later `trip` is a no-op whatever its
/// mode, so a graceful stop cannot downgrade a kill and a kill cannot cut
/// short a drain already under way.
#[derive(Debug, Default)]
pub struct ShutdownGate {
    state: AtomicU8,
    notify: Notify,
}

impl ShutdownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the gate. Returns true only for the call that tripped it.
    pub fn trip(&self, kill: bool) -> bool {
        let next = match ShutdownMode::from_kill(kill) {
            ShutdownMode::Drain => GATE_DRAIN,
            ShutdownMode::Kill => GATE_KILL,
        };
        let won = self
            .state
            .compare_exchange(GATE_OPEN, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.notify.notify_waiters();
        }
        won
    }

    pub fn is_tripped(&self) -> bool {
        self.mode().is_some()
    }

    /// Mode recorded by the winning `trip`, if any
    pub fn mode(&self) -> Option<ShutdownMode> {
        match self.state.load(Ordering::Acquire) {
            GATE_DRAIN => Some(ShutdownMode::Drain),
            GATE_KILL => Some(ShutdownMode::Kill),
            _ => None,
        }
    }

    /// Wait until the gate trips and return the recorded mode
    pub async fn tripped(&self) -> ShutdownMode {
        loop {
            // Registered before the check so a trip in between is not lost.
            let notified = self.notify.notified();
            if let Some(mode) = self.mode() {
                return mode;
            }
            notified.await;
        }
    }
}

/// Reports how many calls the call-handling subsystem still has in flight
pub trait ActiveCallCounter: Send + Sync {
    fn active_calls(&self) -> usize;
}

impl<F> ActiveCallCounter for F
where
    F: Fn() -> usize + Send + Sync,
{
    fn active_calls(&self) -> usize {
        self()
    }
}

/// Releases the resources owned by the call-handling subsystem
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Stopper: Send + Sync {
    async fn stop(&self);
}
