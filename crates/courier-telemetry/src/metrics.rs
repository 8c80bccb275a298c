//! Prometheus metrics.
//!
//! The forwarder counts every call in `courier_forward_total`, labelled by
//! `outcome` (`ok`, `bind_error`, `validation_error`, `remote_error`,
//! `unknown_error`). Counters go through the `metrics` facade, so they are
//! free until a recorder is installed with [`init_metrics`].

use std::sync::OnceLock;

use courier_core::forward::FORWARD_TOTAL;
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::TelemetryError;
use crate::TelemetryResult;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Renders the installed recorder.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps a Prometheus handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders every metric in the Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder as the global `metrics` recorder.
///
/// Exposing the rendered text over HTTP is left to the application.
///
/// # Errors
///
/// Returns [`TelemetryError::MetricsInit`] if a global recorder is already
/// installed.
pub fn init_metrics() -> TelemetryResult<MetricsRegistry> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle.clone());
    describe_metrics();
    Ok(MetricsRegistry::new(handle))
}

/// Renders the global recorder, or `None` before [`init_metrics`].
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers help text for Courier's metrics on the current recorder.
pub fn describe_metrics() {
    describe_counter!(FORWARD_TOTAL, "Forwarded calls by outcome");
}
