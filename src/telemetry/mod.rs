//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use self::metrics::{increment_counter, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::{Path, PathBuf};

/// Guard that flushes telemetry on drop
pub struct TelemetryGuard {
    prometheus: Option<(PrometheusHandle, PathBuf)>,
}

impl TelemetryGuard {
    /// Write the current metrics snapshot, if a snapshot path was configured
    pub fn flush(&self) -> anyhow::Result<()> {
        if let Some((handle, path)) = &self.prometheus {
            write_snapshot(handle, path)?;
        }
        Ok(())
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "Failed to write metrics snapshot");
        }
    }
}

fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, handle.render())?;
    tracing::debug!(path = ?path, "Wrote metrics snapshot");
    Ok(())
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, config.log_format)?;

    let prometheus = match &config.metrics_snapshot {
        Some(path) => {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;
            tracing::info!(path = ?path, "Metrics snapshot enabled");
            Some((handle, path.clone()))
        }
        None => None,
    };

    Ok(TelemetryGuard { prometheus })
}
