//! In-process call tracker
//!
//! Counts admitted calls for the drain loop and refuses new ones once the
//! controller stops it. Each admitted call holds a [`CallGuard`]; dropping
//! the guard ends the call.

use crate::domain::lifecycle::{ActiveCallCounter, Stopper};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct CallTracker {
    active: AtomicUsize,
    stopped: AtomicBool,
}

impl CallTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            active: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    /// Admit a call. `None` once the tracker is stopped.
    pub fn begin(self: &Arc<Self>) -> Option<CallGuard> {
        // Count first, then check: a call racing `stop` is either refused
        // or already visible to the stopper.
        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = CallGuard {
            tracker: self.clone(),
        };
        if self.stopped.load(Ordering::SeqCst) {
            return None;
        }
        Some(guard)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl ActiveCallCounter for CallTracker {
    fn active_calls(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Stopper for CallTracker {
    async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        info!(active_calls = self.active_calls(), "call tracker stopped");
    }
}

/// Keeps one call counted while alive
#[derive(Debug)]
pub struct CallGuard {
    tracker: Arc<CallTracker>,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::SeqCst);
    }
}
