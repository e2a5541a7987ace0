//! hello-metrics - a hello-world backend with Prometheus instrumentation
//!
//! This crate provides:
//! - An HTTP backend serving `GET /api/hello` and a scrape endpoint
//! - Per-request duration, count, and error metrics keyed by method, route, and status
//! - Process metrics sampled into the same registry
//! - A client page that fetches the hello message once and renders it

pub mod api;
pub mod client;
pub mod config;
pub mod metrics;
pub mod server;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;
