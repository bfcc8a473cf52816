//! Tracks outstanding historical-data requests so the session can wait for
//! the data instead of sleeping blindly.

use crate::domain::contract::RequestId;
use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Complete,
    TimedOut { outstanding: Vec<RequestId> },
}

#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: Mutex<HashSet<RequestId>>,
    done: Condvar,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request before it is sent, so a fast reply cannot race the
    /// registration.
    pub fn expect(&self, req_id: RequestId) {
        self.outstanding.lock().insert(req_id);
    }

    /// Returns true if the id was outstanding.
    pub fn complete(&self, req_id: RequestId) -> bool {
        let mut outstanding = self.outstanding.lock();
        let removed = outstanding.remove(&req_id);
        if outstanding.is_empty() {
            self.done.notify_all();
        }
        removed
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.lock().len()
    }

    pub fn wait_all(&self, timeout: Duration) -> WaitOutcome {
        let mut guard = self.outstanding.lock();
        self.done
            .wait_while_for(&mut guard, |outstanding| !outstanding.is_empty(), timeout);
        if guard.is_empty() {
            WaitOutcome::Complete
        } else {
            let mut outstanding: Vec<_> = guard.iter().copied().collect();
            outstanding.sort_unstable();
            WaitOutcome::TimedOut { outstanding }
        }
    }
}
