//! Request and connection identifiers for log correlation.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for short connection IDs.
static CONNECTION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new UUID-based request ID.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short ID based on a counter.
///
/// Only unique within a single process. Format: `conn-{counter}` with the
/// counter zero-padded to 16 hex digits.
pub fn generate_short_request_id() -> String {
    let count = CONNECTION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("conn-{:016x}", count)
}

/// Identifier attached to log lines and the `x-request-id` response header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new random request ID.
    pub fn new() -> Self {
        Self(generate_request_id())
    }

    /// Create a new short, process-local ID.
    pub fn short() -> Self {
        Self(generate_short_request_id())
    }

    /// Create a request ID from an existing string (e.g., from a header).
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the request ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
