//! Prometheus exporter for the feeder's `metrics` series.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::FeederConfig;

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global recorder and publish the configured limits.
    /// Fails if a recorder is already installed.
    pub fn install(cfg: &FeederConfig) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_gauge!("alerts_buffer_capacity", "Maximum alerts kept in memory.");
        describe_gauge!("seen_ids_capacity", "Maximum dedup ids remembered.");
        describe_gauge!("poll_interval_minutes", "Configured default poll interval.");
        gauge!("alerts_buffer_capacity").set(cfg.alerts_capacity as f64);
        gauge!("seen_ids_capacity").set(cfg.seen_capacity as f64);
        gauge!("poll_interval_minutes").set(cfg.poll_interval_minutes as f64);

        Ok(Self { handle })
    }

    /// `GET /metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
