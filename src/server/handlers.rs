//! Endpoint handlers.

use crate::api::HelloResponse;
use crate::metrics::{MetricsCollector, CONTENT_TYPE as METRICS_CONTENT_TYPE};
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Method, Response, StatusCode};
use tracing::error;

/// `GET /api/hello`.
pub fn hello() -> Response<Full<Bytes>> {
    match serde_json::to_vec(&HelloResponse::default()) {
        Ok(body) => with_content_type(
            StatusCode::OK,
            "application/json; charset=utf-8",
            Bytes::from(body),
        ),
        Err(e) => {
            error!(error = %e, "failed to serialize hello response");
            internal_error()
        }
    }
}

/// `GET /metrics`.
///
/// Encoding happens before the scrape itself is recorded, so a snapshot
/// never contains its own observation.
pub fn metrics(collector: &MetricsCollector) -> Response<Full<Bytes>> {
    match collector.encode() {
        Ok(buffer) => with_content_type(StatusCode::OK, METRICS_CONTENT_TYPE, Bytes::from(buffer)),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            internal_error()
        }
    }
}

/// Fallback for requests no route matched.
pub fn not_found(method: &Method, path: &str) -> Response<Full<Bytes>> {
    with_content_type(
        StatusCode::NOT_FOUND,
        "text/plain; charset=utf-8",
        Bytes::from(format!("Cannot {} {}\n", method, path)),
    )
}

fn internal_error() -> Response<Full<Bytes>> {
    with_content_type(
        StatusCode::INTERNAL_SERVER_ERROR,
        "text/plain; charset=utf-8",
        Bytes::from_static(b"Internal Server Error\n"),
    )
}

fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
