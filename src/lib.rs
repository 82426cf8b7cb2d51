//! # crudgate
//!
//! Generic CRUD over HTTP for document stores.
//!
//! crudgate exposes entities as REST resources and compiles arbitrary query
//! strings into operator-aware store queries:
//!
//! ```text
//! GET /rest/v1/users?username_startswith=ad&birthdate_after=1990-01-01T00:00:00Z&sort=-birthdate&pageSize=20
//! ```
//!
//! - [`query`]: descriptors, the filter compiler, the `Entity` capability and
//!   the in-memory store
//! - [`mongodb`]: the MongoDB store adapter
//! - [`axum`]: generic CRUD handlers and the gateway router
//! - [`models`]: the entities served by the `crudgate` binary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crudgate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let users = Repository::<User>::new(store.clone());
//!     users.create(&mut User::new("ada", "ada@example.com")).await?;
//!
//!     let found = users
//!         .query(&QueryParams::parse("username_contains=AD"))
//!         .await?
//!         .collect_all()
//!         .await?;
//!     assert_eq!(found.len(), 1);
//!
//!     let app = crudgate::server::app(store, CorsConfig::default())?;
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     ::axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]

pub mod cli;
pub mod error;
pub mod models;
pub mod server;

/// Query compilation and store abstractions.
pub mod query {
    pub use crudgate_query::*;
}

/// MongoDB store adapter.
pub mod mongodb {
    pub use crudgate_mongodb::*;
}

/// HTTP handlers and routing.
pub mod axum {
    pub use crudgate_axum::*;
}

pub use crudgate_query::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::models::User;
    pub use crudgate_axum::{CorsConfig, Gateway};
    pub use crudgate_mongodb::{MongoClient, MongoConfig, MongoStore};
    pub use crudgate_query::prelude::*;
}

// Re-export key types at the crate root
pub use error::{ServerError, ServerResult};
pub use models::User;
