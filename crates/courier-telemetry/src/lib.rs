//! # Courier Telemetry
//!
//! Process-wide observability setup for Courier services:
//!
//! - **Logging**: a `tracing-subscriber` registry printing JSON or pretty
//!   lines, filtered by an `EnvFilter` directive
//! - **Metrics**: a Prometheus recorder for the `metrics` counters the
//!   forwarder emits
//!
//! Courier itself only emits through `tracing` and `metrics`; nothing is
//! printed or counted until the application installs these.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let metrics = init_telemetry(&TelemetryConfig::default())?;
//! if let Some(metrics) = metrics {
//!     println!("{}", metrics.render());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use crate::metrics::{init_metrics, render_metrics, MetricsRegistry};

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Settings for [`init_telemetry`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Logging settings.
    pub logging: LogConfig,
    /// Whether to install the Prometheus recorder.
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            logging: LogConfig::default(),
            metrics_enabled: true,
        }
    }
}

/// Installs logging and, when enabled, the metrics recorder.
///
/// # Errors
///
/// Returns the first [`TelemetryError`] raised by either subsystem.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    init_logging(&config.logging)?;
    if config.metrics_enabled {
        init_metrics().map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_disabled() {
        let config = TelemetryConfig {
            logging: LogConfig {
                enabled: false,
                ..LogConfig::default()
            },
            metrics_enabled: false,
        };
        assert!(init_telemetry(&config).unwrap().is_none());
    }
}
