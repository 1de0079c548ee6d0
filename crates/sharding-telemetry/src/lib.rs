//! Logging setup for the sharding configuration tooling.
//!
//! The compiler in `sharding-config` only emits `tracing` events; binaries
//! call [`init_logging`] once at startup to decide where they go.
//!
//! # Example
//!
//! ```rust,ignore
//! use sharding_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Parse a log format name into the `json_format` switch of [`LogConfig`].
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for anything but `json` or `pretty`.
pub fn parse_log_format(format: &str) -> TelemetryResult<bool> {
    match format.to_lowercase().as_str() {
        "json" => Ok(true),
        "pretty" | "text" => Ok(false),
        other => Err(TelemetryError::InvalidConfig(format!(
            "unsupported log format: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert!(parse_log_format("JSON").unwrap());
        assert!(!parse_log_format("pretty").unwrap());
        assert!(parse_log_format("xml").is_err());
    }
}
