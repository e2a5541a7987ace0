//! Client page for the backend's hello endpoint.

mod fetch;
mod page;

pub use fetch::{FetchError, HttpMessageSource, MessageSource, DEFAULT_BACKEND_URL};
pub use page::{FetchStatus, HelloPage};
