//! Configuration validation.

use crate::api::HELLO_ROUTE;
use crate::config::Config;
use hyper::header::HeaderValue;

/// Validate the configuration.
///
/// Checks for:
/// - A known log level
/// - A metrics path that is absolute and does not shadow the hello route
/// - A non-empty unmatched route label
/// - A non-zero process sampling interval
/// - A non-empty CORS origin usable as a header value
///
/// # Returns
///
/// `Ok(())` if valid, or an error message describing every problem found.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    let metrics = &config.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "metrics path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.path.trim_end_matches('/').eq_ignore_ascii_case(HELLO_ROUTE) {
        errors.push(format!(
            "metrics path '{}' conflicts with the {} route",
            metrics.path, HELLO_ROUTE
        ));
    }

    if metrics.unmatched_route.is_empty() {
        errors.push("unmatched route label cannot be empty".to_string());
    }

    if metrics.process.enabled && metrics.process.interval.is_zero() {
        errors.push("process metrics interval must be greater than zero".to_string());
    }

    let origin = &config.server.cors.allow_origin;
    if origin.is_empty() {
        errors.push("CORS allow_origin cannot be empty".to_string());
    } else if HeaderValue::from_str(origin).is_err() {
        errors.push(format!(
            "CORS allow_origin '{}' is not a valid header value",
            origin.escape_debug()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
