//! Wire types shared by the backend and the client page.

use serde::{Deserialize, Serialize};

/// Path of the JSON endpoint.
pub const HELLO_ROUTE: &str = "/api/hello";

/// Message returned by the JSON endpoint.
pub const HELLO_MESSAGE: &str = "Hello World from Backend!";

/// Body of `GET /api/hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

impl Default for HelloResponse {
    fn default() -> Self {
        Self {
            message: HELLO_MESSAGE.to_string(),
        }
    }
}
