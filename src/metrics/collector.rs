//! HTTP request metrics using prometheus-client.
//!
//! Provides the request duration histogram plus request and error counters,
//! all keyed by the `(method, route, status_code)` label tuple.

use crate::metrics::{PlainCounter, ProcessMetrics};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bounds of the request duration buckets, in seconds.
pub const DURATION_BUCKETS: [f64; 9] = [0.1, 0.3, 0.5, 0.7, 1.0, 3.0, 5.0, 7.0, 10.0];

/// Content type of the encoded registry.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Labels shared by every HTTP metric.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub route: String,
    pub status_code: String,
}

impl HttpLabels {
    pub fn new(method: &str, route: &str, status_code: u16) -> Self {
        Self {
            method: method.to_string(),
            route: route.to_string(),
            status_code: status_code.to_string(),
        }
    }
}

/// Collects and stores all metrics.
///
/// Cloning is cheap; every clone shares one registry.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsCollectorInner>,
}

struct MetricsCollectorInner {
    /// Request duration histogram (in seconds).
    request_duration_seconds: Family<HttpLabels, Histogram>,
    /// Total requests counter.
    request_count: Family<HttpLabels, PlainCounter>,
    /// Requests answered with a status of 400 or above.
    error_count: Family<HttpLabels, PlainCounter>,
    /// Process gauges, when enabled.
    process: Option<ProcessMetrics>,
    /// The prometheus registry.
    registry: Registry,
}

fn duration_histogram() -> Histogram {
    Histogram::new(DURATION_BUCKETS.into_iter())
}

impl MetricsCollector {
    /// Create a collector with HTTP metrics only.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Create a collector that also registers process gauges.
    pub fn with_process_metrics() -> Self {
        Self::build(true)
    }

    fn build(process_metrics: bool) -> Self {
        let mut registry = Registry::default();

        let request_duration_seconds =
            Family::<HttpLabels, Histogram>::new_with_constructor(duration_histogram as fn() -> Histogram);
        let request_count = Family::<HttpLabels, PlainCounter>::default();
        let error_count = Family::<HttpLabels, PlainCounter>::default();

        registry.register(
            "http_request_duration_seconds",
            "Duration of HTTP requests in seconds",
            request_duration_seconds.clone(),
        );
        registry.register(
            "http_request_count",
            "Total number of HTTP requests",
            request_count.clone(),
        );
        registry.register(
            "http_error_count",
            "Total number of HTTP errors",
            error_count.clone(),
        );

        let process = process_metrics.then(|| ProcessMetrics::register(&mut registry));

        Self {
            inner: Arc::new(MetricsCollectorInner {
                request_duration_seconds,
                request_count,
                error_count,
                process,
                registry,
            }),
        }
    }

    /// Get the prometheus registry for encoding.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Process gauges, if this collector registered them.
    pub fn process(&self) -> Option<&ProcessMetrics> {
        self.inner.process.as_ref()
    }

    /// Record a completed request.
    ///
    /// Updates one label tuple in the histogram and request counter, and in
    /// the error counter when `status_code >= 400`.
    pub fn record_request(&self, method: &str, route: &str, status_code: u16, duration: Duration) {
        let labels = HttpLabels::new(method, route, status_code);

        self.inner
            .request_duration_seconds
            .get_or_create(&labels)
            .observe(duration.as_secs_f64());
        self.inner.request_count.get_or_create(&labels).inc();

        if status_code >= 400 {
            self.inner.error_count.get_or_create(&labels).inc();
        }
    }

    /// Encode the registry in the text exposition format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, self.registry())?;
        Ok(buffer)
    }

    /// Start timing a request.
    pub fn start_request_timer(&self) -> RequestTimer {
        RequestTimer {
            collector: self.clone(),
            start: Instant::now(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer started when a request arrives.
pub struct RequestTimer {
    collector: MetricsCollector,
    start: Instant,
}

impl RequestTimer {
    /// Record the request with its final labels and consume the timer.
    pub fn record(self, method: &str, route: &str, status_code: u16) -> Duration {
        let duration = self.start.elapsed();
        self.collector
            .record_request(method, route, status_code, duration);
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: &str, series: &str) -> Option<f64> {
        text.lines()
            .find_map(|line| line.strip_prefix(series)?.strip_prefix(' '))
            .and_then(|value| value.trim().parse().ok())
    }

    #[test]
    fn test_families_always_present() {
        let collector = MetricsCollector::new();
        let text = collector.encode().unwrap();

        assert!(text.contains("http_request_duration_seconds"));
        assert!(text.contains("http_request_count"));
        assert!(text.contains("http_error_count"));
    }

    #[test]
    fn test_record_success() {
        let collector = MetricsCollector::new();
        collector.record_request("GET", "/api/hello", 200, Duration::from_millis(5));
        let text = collector.encode().unwrap();

        assert_eq!(
            sample(
                &text,
                r#"http_request_count{method="GET",route="/api/hello",status_code="200"}"#
            ),
            Some(1.0)
        );
        assert_eq!(
            sample(
                &text,
                r#"http_error_count{method="GET",route="/api/hello",status_code="200"}"#
            ),
            None
        );
    }

    #[test]
    fn test_counter_samples_use_family_name() {
        let collector = MetricsCollector::new();
        collector.record_request("GET", "/api/hello", 200, Duration::from_millis(5));
        collector.record_request("GET", "unmatched", 404, Duration::from_millis(5));
        let text = collector.encode().unwrap();

        assert!(text.contains("# TYPE http_request_count counter"));
        assert!(text.lines().any(|line| {
            line == r#"http_request_count{method="GET",route="/api/hello",status_code="200"} 1"#
        }));
        assert!(text.lines().any(|line| {
            line == r#"http_error_count{method="GET",route="unmatched",status_code="404"} 1"#
        }));
        assert!(!text.contains("_count_total"));
    }

    #[test]
    fn test_record_error_counts_once() {
        let collector = MetricsCollector::new();
        collector.record_request("GET", "unmatched", 404, Duration::from_millis(1));
        collector.record_request("POST", "unmatched", 404, Duration::from_millis(1));
        let text = collector.encode().unwrap();

        assert_eq!(
            sample(
                &text,
                r#"http_error_count{method="GET",route="unmatched",status_code="404"}"#
            ),
            Some(1.0)
        );
        assert_eq!(
            sample(
                &text,
                r#"http_error_count{method="POST",route="unmatched",status_code="404"}"#
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_histogram_count_matches_counter() {
        let collector = MetricsCollector::new();
        for millis in [10, 250, 900, 4000, 12000] {
            collector.record_request("GET", "/api/hello", 200, Duration::from_millis(millis));
        }
        let text = collector.encode().unwrap();

        let labels = r#"{method="GET",route="/api/hello",status_code="200"}"#;
        let requests = sample(&text, &format!("http_request_count{labels}"));
        let observations = sample(&text, &format!("http_request_duration_seconds_count{labels}"));
        assert_eq!(requests, Some(5.0));
        assert_eq!(observations, requests);
    }

    #[test]
    fn test_overflow_bucket() {
        let collector = MetricsCollector::new();
        collector.record_request("GET", "/slow", 200, Duration::from_secs(30));
        let text = collector.encode().unwrap();

        // label order within a bucket line is an encoder detail
        let bucket = |le: &str| {
            text.lines()
                .filter(|line| line.starts_with("http_request_duration_seconds_bucket{"))
                .filter(|line| line.contains(r#"route="/slow""#))
                .find(|line| line.contains(&format!(r#"le="{le}"#)))
                .and_then(|line| line.rsplit(' ').next())
                .and_then(|value| value.parse::<f64>().ok())
        };
        assert_eq!(bucket("10"), Some(0.0));
        assert_eq!(bucket("+Inf"), Some(1.0));
    }

    #[test]
    fn test_request_timer() {
        let collector = MetricsCollector::new();
        let timer = collector.start_request_timer();
        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.record("GET", "/api/hello", 200);
        assert!(duration >= Duration::from_millis(10));

        let text = collector.encode().unwrap();
        assert!(text.contains(r#"route="/api/hello""#));
    }

    #[test]
    fn test_clones_share_registry() {
        let collector = MetricsCollector::new();
        let other = collector.clone();
        other.record_request("GET", "/api/hello", 500, Duration::ZERO);

        let text = collector.encode().unwrap();
        assert_eq!(
            sample(
                &text,
                r#"http_error_count{method="GET",route="/api/hello",status_code="500"}"#
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_isolated_collectors() {
        let a = MetricsCollector::new();
        let b = MetricsCollector::new();
        a.record_request("GET", "/api/hello", 200, Duration::ZERO);

        let text = b.encode().unwrap();
        assert!(!text.contains(r#"route="/api/hello""#));
    }
}
