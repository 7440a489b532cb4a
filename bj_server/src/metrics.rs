//! Prometheus metrics for monitoring server health and game activity.
//!
//! Metrics are exposed in Prometheus text format on a dedicated listener
//! (configured via `METRICS_BIND`) for scraping by monitoring systems.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record a WebSocket connection being opened or closed.
pub fn websocket_connection_change(delta: i64) {
    metrics::gauge!("websocket_connections_active").increment(delta as f64);
}

/// Record a game action received from a client.
pub fn player_actions_total(action: &str) {
    metrics::counter!("player_actions_total",
        "action" => action.to_string()
    )
    .increment(1);
}

/// Record the current number of running tables.
pub fn tables_active(count: usize) {
    metrics::gauge!("tables_active").set(count as f64);
}
