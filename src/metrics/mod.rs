//! Metrics collection and exposition.

mod collector;
mod counter;
mod process;

pub use collector::{HttpLabels, MetricsCollector, RequestTimer, CONTENT_TYPE, DURATION_BUCKETS};
pub use counter::PlainCounter;
pub use process::{run_process_sampler, ProcessMetrics, ProcessSample, ProcessSampler};
