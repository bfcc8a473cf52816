//! Port traits: the seams between the domain and the outside world.

pub mod config_port;
pub mod gateway_events;
pub mod gateway_port;
pub mod report_port;
pub mod universe_port;
