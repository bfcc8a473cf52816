//! Configuration validation.
//!
//! Validates the gateway and session sections before a session starts.

use crate::domain::error::TraderError;
use crate::domain::session::WaitMode;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Longest wait either timeout may be configured to.
pub const MAX_WAIT_SECS: f64 = 86_400.0;

pub fn validate_session_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_host(config)?;
    validate_port(config)?;
    validate_client_id(config)?;
    validate_ready_timeout(config)?;
    validate_pacing(config)?;
    validate_settle(config)?;
    validate_wait_mode(config)?;
    validate_symbols(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parses a present key, so a typo is reported instead of silently taking
/// the default.
fn parse_present<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TraderError>
where
    T: FromStr,
    T::Err: Display,
{
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => {
            let raw = raw.trim();
            raw.parse::<T>()
                .map(Some)
                .map_err(|e| invalid(section, key, format!("'{}' is not a number: {}", raw, e)))
        }
    }
}

fn validate_wait_secs(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), TraderError> {
    let Some(secs) = parse_present::<f64>(config, section, key)? else {
        return Ok(());
    };
    if secs > MAX_WAIT_SECS {
        return Err(invalid(
            section,
            key,
            format!("{} must be at most {} seconds", key, MAX_WAIT_SECS),
        ));
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(wait) if !wait.is_zero() => Ok(()),
        _ => Err(invalid(section, key, format!("{} must be positive", key))),
    }
}

fn validate_host(config: &dyn ConfigPort) -> Result<(), TraderError> {
    match config.get_string("gateway", "host") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TraderError::ConfigMissing {
            section: "gateway".to_string(),
            key: "host".to_string(),
        }),
    }
}

fn validate_port(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if config.get_string("gateway", "port").is_none() {
        return Err(TraderError::ConfigMissing {
            section: "gateway".to_string(),
            key: "port".to_string(),
        });
    }
    let value = config.get_int("gateway", "port", 0);
    if !(1..=i64::from(u16::MAX)).contains(&value) {
        return Err(invalid("gateway", "port", "port must be between 1 and 65535"));
    }
    Ok(())
}

fn validate_client_id(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let value = parse_present::<i64>(config, "gateway", "client_id")?.unwrap_or(0);
    if value < 0 || value > i64::from(i32::MAX) {
        return Err(invalid("gateway", "client_id", "client_id must be a non-negative integer"));
    }
    Ok(())
}

fn validate_ready_timeout(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_wait_secs(config, "gateway", "ready_timeout_secs")
}

fn validate_pacing(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let value = parse_present::<i64>(config, "session", "request_pacing_ms")?.unwrap_or(100);
    if value < 0 {
        return Err(invalid(
            "session",
            "request_pacing_ms",
            "request_pacing_ms must be non-negative",
        ));
    }
    Ok(())
}

fn validate_settle(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_wait_secs(config, "session", "settle_secs")
}

fn validate_wait_mode(config: &dyn ConfigPort) -> Result<(), TraderError> {
    match config.get_string("session", "wait_mode") {
        None => Ok(()),
        Some(s) => s
            .parse::<WaitMode>()
            .map(|_| ())
            .map_err(|reason| invalid("session", "wait_mode", reason)),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), TraderError> {
    match config.get_string("universe", "symbols") {
        Some(s) if !s.trim().is_empty() => parse_symbols(&s)
            .map(|_| ())
            .map_err(|e| invalid("universe", "symbols", e.to_string())),
        _ => Ok(()),
    }
}
