//! Axum integration for crudgate.
//!
//! This crate exposes any [`Entity`](crudgate_query::Entity) as a REST
//! resource with five generic handlers:
//!
//! | method | path | result |
//! |---|---|---|
//! | `POST` | `/rest/v1/<name>` | 201 and the created entity |
//! | `GET` | `/rest/v1/<name>/{id}` | 200 and the entity, or 404 |
//! | `GET` | `/rest/v1/<name>?<filters>` | 200 and a JSON array |
//! | `PUT` | `/rest/v1/<name>/{id}` | 200 and the replaced entity |
//! | `DELETE` | `/rest/v1/<name>/{id}` | 200, or 404 when nothing was deleted |
//!
//! Failures render as `{"error": "<message>"}`: request errors are 400,
//! missing records 404 and everything else 500.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crudgate_axum::{CorsConfig, Gateway};
//! use crudgate_query::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Gateway::new(Arc::new(MemoryStore::new()))
//!         .resource::<User>("users")
//!         .cors(CorsConfig::default())
//!         .into_service()
//!         .unwrap();
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod cors;
pub mod error;
pub mod handlers;
pub mod routes;

pub use cors::{CorsConfig, DEFAULT_ORIGIN};
pub use error::{ApiError, ApiResult};
pub use routes::{API_PREFIX, Gateway, Resource, crud_routes};
