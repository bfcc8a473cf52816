//! Core domain types and logic.

pub mod bar;
pub mod completion;
pub mod config_validation;
pub mod contract;
pub mod error;
pub mod observation;
pub mod order_id;
pub mod requests;
pub mod selector;
pub mod session;
pub mod universe;
