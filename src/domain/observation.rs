//! Per-symbol percent-change observations and the shared tracker that
//! historical-data callbacks write into.
//!
//! The set is keyed by symbol, so a symbol contributes at most one
//! observation no matter how many bars the gateway delivers for it.
//! Iteration order is arrival order, which is what breaks ties when ranking.

use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub symbol: String,
    pub percent_change: f64,
}

impl Observation {
    pub fn new(symbol: impl Into<String>, percent_change: f64) -> Self {
        Self {
            symbol: symbol.into(),
            percent_change,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Inserted,
    /// The symbol already has an observation; the new value was dropped.
    Duplicate,
    /// The value was NaN or infinite (e.g. a zero open).
    NotFinite,
}

#[derive(Debug, Clone, Default)]
pub struct ObservationSet {
    entries: Vec<Observation>,
    index: HashMap<String, usize>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, percent_change: f64) -> RecordOutcome {
        if !percent_change.is_finite() {
            return RecordOutcome::NotFinite;
        }
        if self.index.contains_key(symbol) {
            return RecordOutcome::Duplicate;
        }
        self.index.insert(symbol.to_string(), self.entries.len());
        self.entries.push(Observation::new(symbol, percent_change));
        RecordOutcome::Inserted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observations in arrival order.
    pub fn entries(&self) -> &[Observation] {
        &self.entries
    }
}

/// Lock-guarded [`ObservationSet`] shared between gateway callback threads
/// and the selector.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    set: Mutex<ObservationSet>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, symbol: &str, percent_change: f64) -> RecordOutcome {
        self.set.lock().insert(symbol, percent_change)
    }

    pub fn len(&self) -> usize {
        self.set.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.lock().is_empty()
    }

    /// Copy of the current observations in arrival order. The lock is
    /// released before this returns.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.set.lock().entries().to_vec()
    }
}
