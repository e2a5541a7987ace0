//! Configuration data types.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Global configuration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address and port to listen on
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Cross-origin settings
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin resource sharing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`; `*` permits any origin
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
        }
    }
}

/// Metrics endpoint and instrumentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Path for the scrape endpoint
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// How requests that matched no route are labelled
    #[serde(default)]
    pub route_labels: RouteLabelPolicy,

    /// Route label used for unmatched requests under the `collapse` policy
    #[serde(default = "default_unmatched_route")]
    pub unmatched_route: String,

    /// Process metrics sampling
    #[serde(default)]
    pub process: ProcessMetricsConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            route_labels: RouteLabelPolicy::default(),
            unmatched_route: default_unmatched_route(),
            process: ProcessMetricsConfig::default(),
        }
    }
}

/// Route label policy for requests without a matching route.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteLabelPolicy {
    /// Every unmatched request shares one constant label.
    #[default]
    Collapse,
    /// The literal request path becomes the label (unbounded cardinality).
    RawPath,
}

/// Process metrics sampling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessMetricsConfig {
    /// Whether process gauges are registered and sampled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sampling interval
    #[serde(default = "default_process_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ProcessMetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_process_interval(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

fn default_true() -> bool {
    true
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3003))
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_unmatched_route() -> String {
    "unmatched".to_string()
}

fn default_process_interval() -> Duration {
    Duration::from_secs(10)
}

/// Custom serde module for humantime durations.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
