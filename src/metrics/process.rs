//! Process-level gauges sampled on a fixed interval.
//!
//! The gauges live in the same registry as the HTTP metrics; a background
//! task refreshes them from the operating system's view of this process.

use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;
use std::time::Duration;
use sysinfo::{Pid, System};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Gauges describing the current process.
#[derive(Clone, Default)]
pub struct ProcessMetrics {
    resident_memory_bytes: Gauge,
    virtual_memory_bytes: Gauge,
    cpu_usage_percent: Gauge<f64, AtomicU64>,
    start_time_seconds: Gauge,
    uptime_seconds: Gauge,
}

/// A single reading of the process state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSample {
    pub resident_memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub cpu_usage_percent: f32,
    pub start_time_seconds: u64,
    pub uptime_seconds: u64,
}

impl ProcessMetrics {
    /// Register process gauges with the registry.
    pub fn register(registry: &mut Registry) -> Self {
        let metrics = Self::default();

        registry.register(
            "process_resident_memory_bytes",
            "Resident memory size in bytes",
            metrics.resident_memory_bytes.clone(),
        );
        registry.register(
            "process_virtual_memory_bytes",
            "Virtual memory size in bytes",
            metrics.virtual_memory_bytes.clone(),
        );
        registry.register(
            "process_cpu_usage_percent",
            "CPU usage of the process since the previous sample, in percent",
            metrics.cpu_usage_percent.clone(),
        );
        registry.register(
            "process_start_time_seconds",
            "Start time of the process since unix epoch in seconds",
            metrics.start_time_seconds.clone(),
        );
        registry.register(
            "process_uptime_seconds",
            "Time the process has been running in seconds",
            metrics.uptime_seconds.clone(),
        );

        metrics
    }

    /// Apply a sample to the gauges.
    pub fn update(&self, sample: &ProcessSample) {
        self.resident_memory_bytes
            .set(saturating_i64(sample.resident_memory_bytes));
        self.virtual_memory_bytes
            .set(saturating_i64(sample.virtual_memory_bytes));
        self.cpu_usage_percent.set(f64::from(sample.cpu_usage_percent));
        self.start_time_seconds
            .set(saturating_i64(sample.start_time_seconds));
        self.uptime_seconds.set(saturating_i64(sample.uptime_seconds));
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Reads process statistics through sysinfo.
pub struct ProcessSampler {
    system: System,
    pid: Pid,
}

impl ProcessSampler {
    /// Create a sampler for the current process.
    pub fn current() -> Result<Self, &'static str> {
        let pid = sysinfo::get_current_pid()?;
        Ok(Self {
            system: System::new(),
            pid,
        })
    }

    /// Refresh and read the process state.
    ///
    /// CPU usage is computed between refreshes, so the first reading is 0.
    pub fn sample(&mut self) -> Option<ProcessSample> {
        if !self.system.refresh_process(self.pid) {
            return None;
        }
        let process = self.system.process(self.pid)?;

        Some(ProcessSample {
            resident_memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            cpu_usage_percent: process.cpu_usage(),
            start_time_seconds: process.start_time(),
            uptime_seconds: process.run_time(),
        })
    }
}

/// Sample process metrics every `interval` until shutdown.
pub async fn run_process_sampler(
    metrics: ProcessMetrics,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut sampler = match ProcessSampler::current() {
        Ok(sampler) => sampler,
        Err(e) => {
            warn!(error = e, "process metrics unavailable on this platform");
            return;
        }
    };

    info!(interval = %humantime::format_duration(interval), "process metrics sampler started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sampler.sample() {
                    Some(sample) => {
                        metrics.update(&sample);
                        debug!(
                            rss = sample.resident_memory_bytes,
                            cpu = sample.cpu_usage_percent,
                            "sampled process metrics"
                        );
                    }
                    None => debug!("process not found while sampling"),
                }
            }

            _ = shutdown.recv() => {
                info!("process metrics sampler shutting down");
                break;
            }
        }
    }
}
