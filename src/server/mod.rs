//! Metrics-instrumented HTTP backend.
//!
//! Serves the hello endpoint and the scrape endpoint, recording every request
//! into the injected metrics registry.

mod cors;
mod handlers;
mod listener;
mod router;
mod service;

pub use cors::Cors;
pub use listener::HttpServer;
pub use router::{Endpoint, Resolution, Router};
pub use service::{handle_request, REQUEST_ID_HEADER};
