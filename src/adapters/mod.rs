//! Concrete adapter implementations for ports.

pub mod console_report;
pub mod csv_universe_adapter;
pub mod file_config_adapter;
#[cfg(feature = "ibkr")]
pub mod ibkr_adapter;
