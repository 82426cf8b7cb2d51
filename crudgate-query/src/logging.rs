//! Logging setup for crudgate.
//!
//! Structured logging is driven by environment variables.
//!
//! # Environment Variables
//!
//! - `CRUDGATE_DEBUG=true` (or `1`, `yes`) - Enable debug logging
//! - `CRUDGATE_LOG_LEVEL=debug|info|warn|error|trace` - Set a specific level
//! - `CRUDGATE_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use crudgate_query::logging;
//!
//! // Call once at startup
//! logging::init();
//! ```
//!
//! Library code uses the plain tracing macros:
//!
//! ```rust,ignore
//! use tracing::{debug, warn};
//!
//! debug!(collection = %name, skip, limit, "find");
//! warn!(error = %e, "query failed");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "CRUDGATE_DEBUG";
const LEVEL_VAR: &str = "CRUDGATE_LOG_LEVEL";
const FORMAT_VAR: &str = "CRUDGATE_LOG_FORMAT";

/// Whether `CRUDGATE_DEBUG` is set to "true", "1" or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Level from `CRUDGATE_LOG_LEVEL`.
///
/// Falls back to "debug" when `CRUDGATE_DEBUG` is on, "info" otherwise.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "info" };
    match env::var(LEVEL_VAR) {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Format from `CRUDGATE_LOG_FORMAT`; defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var(FORMAT_VAR)
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// The filter directive applied to crudgate crates and the HTTP trace layer.
pub fn filter_directive(level: &str) -> String {
    format!(
        "crudgate={level},crudgate_query={level},crudgate_mongodb={level},crudgate_axum={level},tower_http={level}"
    )
}

/// Install the global subscriber. Subsequent calls are no-ops.
///
/// Without the `tracing-subscriber` feature this does nothing and the
/// application is expected to install its own subscriber.
pub fn init() {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(filter_directive(level))
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                "pretty" => registry.with(fmt::layer().pretty()).try_init(),
                _ => registry.with(fmt::layer().json()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = get_log_format(), "logging initialized");
            }
        }
    });
}
