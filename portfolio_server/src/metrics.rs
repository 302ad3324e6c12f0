//! Prometheus metrics for portfolio observability.

use std::net::SocketAddr;

use metrics::counter;

/// Initialize the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    if let Err(e) = builder.install() {
        tracing::warn!("Failed to install Prometheus exporter: {}", e);
    }
}

/// Record a login attempt (`success` or `failure`).
pub fn login_attempt(outcome: &'static str) {
    counter!("portfolio_logins_total", "outcome" => outcome).increment(1);
}

/// Record a README fetch (`ok`, `malformed_url`, `request_failed`, `not_found`).
pub fn readme_fetch(outcome: &'static str) {
    counter!("portfolio_readme_fetches_total", "outcome" => outcome).increment(1);
}

/// Record where an avatar response came from (`blob`, `absent`, `error`).
pub fn avatar_served(source: &'static str) {
    counter!("portfolio_avatar_responses_total", "source" => source).increment(1);
}

/// Record a failed store operation.
pub fn store_error(operation: &'static str) {
    counter!("portfolio_store_errors_total", "operation" => operation).increment(1);
}
