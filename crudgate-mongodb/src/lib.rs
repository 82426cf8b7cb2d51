//! # crudgate-mongodb
//!
//! MongoDB store adapter for crudgate.
//!
//! This crate provides:
//! - Connection configuration and a shared, pooled client
//! - Rendering of compiled filters, sort keys and pagination into MongoDB
//!   query documents and find options
//! - `MongoStore`, a `DocumentStore` over MongoDB collections
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crudgate_mongodb::{MongoClient, MongoConfig, MongoStore};
//! use crudgate_query::{QueryParams, Repository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MongoConfig::builder()
//!         .uri("mongodb://localhost:27017")
//!         .database("core")
//!         .build()?;
//!     let client = MongoClient::connect(config).await?;
//!
//!     let users = Repository::<User>::new(Arc::new(MongoStore::new(client)));
//!     let page = users
//!         .query(&QueryParams::parse("age_gte=18&sort=-age"))
//!         .await?
//!         .collect_all()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use crudgate_mongodb::filter::filter_to_document;
//! use crudgate_mongodb::doc;
//! use crudgate_query::{EntityDescriptor, FieldType, Filter, QueryParams};
//!
//! let users = EntityDescriptor::builder("User")
//!     .field("age", "age", FieldType::Integer)
//!     .build();
//! let filter = Filter::compile(&users, &QueryParams::parse("age_gte=18&age_lt=65")).unwrap();
//!
//! assert_eq!(
//!     filter_to_document(&filter),
//!     doc! { "$and": [ { "age": { "$gte": 18_i64 } }, { "age": { "$lt": 65_i64 } } ] }
//! );
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod store;
pub mod types;

pub use bson::oid::ObjectId;
pub use bson::{Bson, Document, doc};
pub use client::MongoClient;
pub use config::{MongoConfig, MongoConfigBuilder};
pub use error::{MongoError, MongoResult};
pub use filter::{filter_to_document, find_options, sort_to_document};
pub use store::MongoStore;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::MongoClient;
    pub use crate::config::{MongoConfig, MongoConfigBuilder};
    pub use crate::error::{MongoError, MongoResult};
    pub use crate::store::MongoStore;
    pub use bson::oid::ObjectId;
    pub use bson::{Bson, Document, doc};
}
