//! Cross-origin headers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
    VARY,
};
use hyper::{Response, StatusCode};

const ALLOW_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// CORS policy applied to every response.
#[derive(Debug, Clone)]
pub struct Cors {
    allow_origin: HeaderValue,
}

impl Cors {
    /// Build a policy for the given origin; `*` allows any origin.
    pub fn new(allow_origin: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(allow_origin)?,
        })
    }

    /// Policy that permits every origin.
    pub fn permissive() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
        }
    }

    fn is_wildcard(&self) -> bool {
        self.allow_origin.as_bytes() == b"*"
    }

    /// Add the allow-origin header to a response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        if !self.is_wildcard() {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
    }

    /// Answer a preflight request.
    ///
    /// Requested headers are reflected back so any header is allowed.
    pub fn preflight(&self, request_headers: &HeaderMap) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::default());
        *response.status_mut() = StatusCode::NO_CONTENT;

        let headers = response.headers_mut();
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        if let Some(requested) = request_headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            headers.append(VARY, HeaderValue::from_static("Access-Control-Request-Headers"));
        }

        response
    }
}

impl Default for Cors {
    fn default() -> Self {
        Self::permissive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_origin() {
        let cors = Cors::permissive();
        let mut headers = HeaderMap::new();
        cors.apply(&mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(VARY).is_none());
    }

    #[test]
    fn test_fixed_origin_varies() {
        let cors = Cors::new("http://localhost:3000").unwrap();
        let mut headers = HeaderMap::new();
        cors.apply(&mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[VARY], "Origin");
    }

    #[test]
    fn test_invalid_origin() {
        assert!(Cors::new("bad\norigin").is_err());
    }

    #[test]
    fn test_preflight_reflects_headers() {
        let cors = Cors::permissive();
        let mut request_headers = HeaderMap::new();
        request_headers.insert(
            ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type,x-trace"),
        );

        let response = cors.preflight(&request_headers);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_HEADERS],
            "content-type,x-trace"
        );
        assert_eq!(response.headers()[VARY], "Access-Control-Request-Headers");
    }

    #[test]
    fn test_preflight_without_requested_headers() {
        let response = Cors::permissive().preflight(&HeaderMap::new());
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_HEADERS).is_none());
    }
}
