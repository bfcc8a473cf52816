//! Historical bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// (close - open) / open * 100
    pub fn percent_change(&self) -> f64 {
        percent_change(self.open, self.close)
    }
}

/// Percentage move from `open` to `close`. Not finite when `open` is zero.
pub fn percent_change(open: f64, close: f64) -> f64 {
    (close - open) / open * 100.0
}
