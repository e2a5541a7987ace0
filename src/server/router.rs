//! Route table for the backend.
//!
//! Matching is case-insensitive and tolerates one trailing slash. `HEAD`
//! requests match `GET` routes and every `OPTIONS` request is a CORS preflight.

use crate::api::HELLO_ROUTE;
use hyper::Method;

/// Handler selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Hello,
    Metrics,
}

/// Outcome of resolving a request against the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A route matched; `pattern` is its label.
    Matched { pattern: &'a str, endpoint: Endpoint },
    /// `OPTIONS` request, answered by the CORS layer.
    Preflight,
    /// No route for this method and path.
    NotFound,
}

impl<'a> Resolution<'a> {
    /// The matched route pattern, if any.
    pub fn pattern(&self) -> Option<&'a str> {
        match self {
            Resolution::Matched { pattern, .. } => Some(*pattern),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    pattern: String,
    endpoint: Endpoint,
}

/// Static route table.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Build the table with the hello route and the scrape endpoint.
    pub fn new(metrics_path: &str) -> Self {
        Self {
            routes: vec![
                Route {
                    method: Method::GET,
                    pattern: metrics_path.to_string(),
                    endpoint: Endpoint::Metrics,
                },
                Route {
                    method: Method::GET,
                    pattern: HELLO_ROUTE.to_string(),
                    endpoint: Endpoint::Hello,
                },
            ],
        }
    }

    /// Resolve a request to a route.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        if method == Method::OPTIONS {
            return Resolution::Preflight;
        }

        let method = if method == Method::HEAD {
            Method::GET
        } else {
            method.clone()
        };

        self.routes
            .iter()
            .find(|route| route.method == method && path_matches(&route.pattern, path))
            .map(|route| Resolution::Matched {
                pattern: &route.pattern,
                endpoint: route.endpoint,
            })
            .unwrap_or(Resolution::NotFound)
    }
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    pattern.eq_ignore_ascii_case(path)
}
