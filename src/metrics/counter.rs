//! Counter whose samples keep the family name.
//!
//! prometheus-client writes counter samples as `<name>_total`. Scrapers of the
//! `http_request_count` / `http_error_count` series expect the bare name, so
//! this counter is typed as a counter but writes its value without a suffix.

use prometheus_client::encoding::{EncodeMetric, MetricEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::{MetricType, TypedMetric};

/// Monotonic counter exposed as `<name>{labels} <value>`.
#[derive(Debug, Clone, Default)]
pub struct PlainCounter {
    inner: Counter,
}

impl PlainCounter {
    /// Increase the counter by 1.
    pub fn inc(&self) -> u64 {
        self.inner.inc()
    }

    /// Current value.
    pub fn get(&self) -> u64 {
        self.inner.get()
    }
}

impl TypedMetric for PlainCounter {
    const TYPE: MetricType = MetricType::Counter;
}

impl EncodeMetric for PlainCounter {
    fn encode(&self, mut encoder: MetricEncoder) -> Result<(), std::fmt::Error> {
        let value = i64::try_from(self.get()).unwrap_or(i64::MAX);
        encoder.encode_gauge(&value)
    }

    fn metric_type(&self) -> MetricType {
        Self::TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;
    use prometheus_client::registry::Registry;

    #[test]
    fn test_sample_has_no_suffix() {
        let mut registry = Registry::default();
        let counter = PlainCounter::default();
        registry.register("jobs_done", "Finished jobs", counter.clone());

        counter.inc();
        counter.inc();

        let mut text = String::new();
        encode(&mut text, &registry).unwrap();
        assert!(text.contains("# TYPE jobs_done counter"));
        assert!(text.lines().any(|line| line == "jobs_done 2"));
        assert!(!text.contains("jobs_done_total"));
    }

    #[test]
    fn test_clones_share_value() {
        let counter = PlainCounter::default();
        let other = counter.clone();
        other.inc();
        assert_eq!(counter.get(), 1);
    }
}
