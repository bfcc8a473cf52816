//! Order id sequence seeded by the gateway's session-ready callback.

use crate::domain::contract::OrderId;
use crate::domain::error::TraderError;
use parking_lot::{Condvar, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct OrderIdSequence {
    next: Mutex<Option<OrderId>>,
    ready: Condvar,
}

impl OrderIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed (or reseed) the sequence. The counter never moves backwards, so
    /// ids already handed out cannot be reissued.
    pub fn seed(&self, order_id: OrderId) {
        let mut next = self.next.lock();
        *next = Some(match *next {
            Some(current) => current.max(order_id),
            None => order_id,
        });
        self.ready.notify_all();
    }

    /// Block until the sequence is seeded or `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let mut next = self.next.lock();
        self.ready.wait_while_for(&mut next, |id| id.is_none(), timeout);
        next.is_some()
    }

    /// Hand out the next id and advance the counter.
    pub fn allocate(&self) -> Result<OrderId, TraderError> {
        let mut next = self.next.lock();
        let id = next.ok_or(TraderError::OrderIdUnavailable)?;
        *next = Some(id + 1);
        Ok(id)
    }
}
