//! Request dispatch wrapped in timing and counting instrumentation.

use crate::server::handlers;
use crate::server::router::{Endpoint, Resolution};
use crate::state::AppState;
use crate::util::RequestId;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Request, Response};
use std::convert::Infallible;
use tracing::debug;

/// Header carrying the per-request id.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Handle one request.
///
/// Every request, whatever its route or outcome, is recorded exactly once:
/// one histogram observation, one request count, and one error count when the
/// status is 400 or above. The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let timer = state.metrics().start_request_timer();

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(RequestId::from_string)
        .unwrap_or_default();

    let resolution = state.router().resolve(&method, &path);

    let mut response = match resolution {
        Resolution::Matched {
            endpoint: Endpoint::Hello,
            ..
        } => handlers::hello(),
        Resolution::Matched {
            endpoint: Endpoint::Metrics,
            ..
        } => handlers::metrics(state.metrics()),
        Resolution::Preflight => state.cors().preflight(req.headers()),
        Resolution::NotFound => handlers::not_found(&method, &path),
    };

    state.cors().apply(response.headers_mut());
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    let route = state.route_label(&resolution, &path);
    let status = response.status().as_u16();
    let duration = timer.record(method.as_str(), route, status);

    debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route,
        status,
        duration_ms = duration.as_millis(),
        "request completed"
    );

    Ok(response)
}
