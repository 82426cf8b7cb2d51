//! Cross-origin resource sharing configuration.

use crudgate_query::{QueryError, QueryResult};
use http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

/// Origin allowed when none is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// CORS settings for the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins. Empty means [`DEFAULT_ORIGIN`].
    pub allowed_origins: Vec<String>,
    /// Accept any origin, including `null`. Only honored when no origins are
    /// configured.
    pub allow_null_origin: bool,
}

impl CorsConfig {
    /// Configuration from a comma separated origin list.
    pub fn from_list(origins: &str) -> Self {
        Self {
            allowed_origins: origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            allow_null_origin: false,
        }
    }

    /// Allow the `null` origin.
    pub fn allow_null_origin(mut self, enabled: bool) -> Self {
        self.allow_null_origin = enabled;
        self
    }

    /// Origins that will be sent back to browsers.
    pub fn effective_origins(&self) -> Vec<&str> {
        if self.allowed_origins.is_empty() {
            vec![DEFAULT_ORIGIN]
        } else {
            self.allowed_origins.iter().map(String::as_str).collect()
        }
    }

    /// Whether the request origin is mirrored back.
    pub fn mirrors_origin(&self) -> bool {
        self.allowed_origins.is_empty() && self.allow_null_origin
    }

    /// Build the `tower-http` layer.
    pub fn layer(&self) -> QueryResult<CorsLayer> {
        let origin = if self.mirrors_origin() {
            warn!("allowing requests from any origin, including 'null'; only use this for development");
            AllowOrigin::mirror_request()
        } else {
            let origins = self
                .effective_origins()
                .into_iter()
                .map(|o| {
                    HeaderValue::from_str(o).map_err(|e| {
                        QueryError::configuration(format!("invalid allowed origin '{o}': {e}"))
                    })
                })
                .collect::<QueryResult<Vec<_>>>()?;
            debug!(origins = ?self.effective_origins(), "cors origins configured");
            AllowOrigin::list(origins)
        };

        Ok(CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::ORIGIN,
                header::CONTENT_LENGTH,
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
            ])
            .allow_credentials(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_origin() {
        let config = CorsConfig::default();
        assert_eq!(config.effective_origins(), vec![DEFAULT_ORIGIN]);
        assert!(!config.mirrors_origin());
        assert!(config.layer().is_ok());
    }

    #[test]
    fn test_from_list() {
        let config = CorsConfig::from_list("https://a.example, https://b.example,,");
        assert_eq!(
            config.effective_origins(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_null_origin_only_without_explicit_origins() {
        assert!(CorsConfig::default().allow_null_origin(true).mirrors_origin());
        assert!(
            !CorsConfig::from_list("https://a.example")
                .allow_null_origin(true)
                .mirrors_origin()
        );
    }

    #[test]
    fn test_invalid_origin_is_configuration_error() {
        let err = CorsConfig::from_list("https://bad\norigin").layer().unwrap_err();
        assert_eq!(err.code, crudgate_query::ErrorCode::InvalidConfiguration);
    }
}
