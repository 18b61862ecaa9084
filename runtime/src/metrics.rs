//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for:
//! - Store dispatch (commands sent, reducer latency)
//! - Effect execution by kind
//! - Form outcomes (validation failures, saves)
//!
//! # Example
//!
//! ```rust,no_run
//! use shopfront_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Snapshot in Prometheus text format
//! if let Some(text) = server.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics server.
///
/// Installs the global Prometheus recorder and serves `/metrics` over HTTP on
/// the configured address.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address the scrape endpoint listens on (e.g., `0.0.0.0:9090`)
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the scrape endpoint listens on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Register metric descriptions, install the Prometheus recorder and spawn
    /// the HTTP listener.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if the metrics exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g., by another test), this logs a
    /// warning and returns `Ok` without a render handle.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(self.addr)
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5,
                    1.0, 5.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .build()
            .map_err(|e| MetricsError::Build(e.to_string()))?;
        let handle = recorder.handle();

        match metrics::set_global_recorder(recorder) {
            Ok(()) => {
                tokio::spawn(async move {
                    if exporter.await.is_err() {
                        tracing::error!("Metrics listener stopped");
                    }
                });
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics available at /metrics");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!(
        "store.commands.total",
        "Total number of actions sent to stores"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time taken by one reducer pass"
    );
    describe_counter!(
        "store.effects.executed",
        "Effects executed by the store, labelled by type"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );

    // Forms
    describe_counter!(
        "form.validation.failed",
        "Submit attempts rejected by validation, labelled by form"
    );
    describe_counter!(
        "form.saves.total",
        "Records handed to persistence, labelled by form and outcome"
    );
}

/// Form outcome metrics recorder.
pub struct FormMetrics;

impl FormMetrics {
    /// Record a submit rejected by validation.
    pub fn record_validation_failure(form: &'static str, errors: usize) {
        counter!("form.validation.failed", "form" => form).increment(1);
        tracing::debug!(form, errors, "Validation failure recorded");
    }

    /// Record the outcome of a save handed to a record sink.
    pub fn record_save(form: &'static str, succeeded: bool) {
        let outcome = if succeeded { "saved" } else { "failed" };
        counter!("form.saves.total", "form" => form, "outcome" => outcome).increment(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_server_creation() {
        let addr = "127.0.0.1:9464".parse().unwrap();
        let server = MetricsServer::new(addr);
        assert!(server.handle().is_none());
        assert_eq!(server.addr(), addr);
    }

    #[tokio::test]
    async fn test_scrape_endpoint_serves_form_metrics() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let addr = "127.0.0.1:39464".parse().unwrap();
        let mut server = MetricsServer::new(addr);
        server.start().unwrap();

        FormMetrics::record_validation_failure("order", 2);
        FormMetrics::record_save("order", true);

        // The recorder is process-global; another test binary may own it.
        if server.handle().is_none() {
            return;
        }

        let mut body = String::new();
        for _ in 0..50 {
            if let Ok(mut stream) = tokio::net::TcpStream::connect(addr).await {
                stream
                    .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                    .await
                    .unwrap();
                stream.read_to_string(&mut body).await.unwrap();
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        assert!(body.contains("form_validation_failed"));
        assert!(body.contains("form_saves_total"));
        assert_eq!(server.render().map(|text| text.contains("form_saves_total")), Some(true));
    }
}
