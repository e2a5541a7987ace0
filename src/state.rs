//! Shared application state.

use crate::config::{Config, RouteLabelPolicy};
use crate::metrics::MetricsCollector;
use crate::server::{Cors, Resolution, Router};
use crate::util::ShutdownSignal;
use hyper::header::InvalidHeaderValue;

/// State injected into every request handler.
///
/// Owns the metrics registry, so separate instances never share counters.
#[derive(Clone)]
pub struct AppState {
    /// Metrics registry and HTTP families.
    metrics: MetricsCollector,

    /// Route table.
    router: Router,

    /// CORS policy.
    cors: Cors,

    /// How unmatched requests are labelled.
    route_labels: RouteLabelPolicy,

    /// Label used for unmatched requests under the collapse policy.
    unmatched_route: String,

    /// Shutdown signal.
    shutdown: ShutdownSignal,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: &Config, metrics: MetricsCollector) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            metrics,
            router: Router::new(&config.metrics.path),
            cors: Cors::new(&config.server.cors.allow_origin)?,
            route_labels: config.metrics.route_labels,
            unmatched_route: config.metrics.unmatched_route.clone(),
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Get the metrics collector.
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Get the route table.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Get the CORS policy.
    pub fn cors(&self) -> &Cors {
        &self.cors
    }

    /// Get the shutdown signal.
    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Trigger shutdown.
    pub fn trigger_shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Route label for a resolved request.
    pub fn route_label<'a>(&'a self, resolution: &Resolution<'a>, path: &'a str) -> &'a str {
        match (resolution.pattern(), self.route_labels) {
            (Some(pattern), _) => pattern,
            (None, RouteLabelPolicy::Collapse) => &self.unmatched_route,
            (None, RouteLabelPolicy::RawPath) => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::Method;

    fn state(policy: RouteLabelPolicy) -> AppState {
        let mut config = Config::default();
        config.metrics.route_labels = policy;
        AppState::new(&config, MetricsCollector::new()).unwrap()
    }

    #[test]
    fn test_matched_route_uses_pattern() {
        let state = state(RouteLabelPolicy::Collapse);
        let resolution = state.router().resolve(&Method::GET, "/API/hello/");
        assert_eq!(state.route_label(&resolution, "/API/hello/"), "/api/hello");
    }

    #[test]
    fn test_collapse_policy() {
        let state = state(RouteLabelPolicy::Collapse);
        let resolution = state.router().resolve(&Method::GET, "/nope");
        assert_eq!(state.route_label(&resolution, "/nope"), "unmatched");
    }

    #[test]
    fn test_raw_path_policy() {
        let state = state(RouteLabelPolicy::RawPath);
        let resolution = state.router().resolve(&Method::GET, "/nope");
        assert_eq!(state.route_label(&resolution, "/nope"), "/nope");
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let mut config = Config::default();
        config.server.cors.allow_origin = "bad\norigin".to_string();
        assert!(AppState::new(&config, MetricsCollector::new()).is_err());
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let state = state(RouteLabelPolicy::Collapse);
        let mut rx = state.shutdown().subscribe();
        state.trigger_shutdown();
        assert!(rx.recv().await.is_ok());
    }
}
