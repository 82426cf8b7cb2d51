//! # crudgate-query
//!
//! Query-string filter compiler and store abstractions for crudgate.
//!
//! This crate turns arbitrary HTTP query parameters into a structured,
//! operator-aware query against a document store, without per-entity query
//! code:
//! - Entity descriptors (wire name, storage name, value type per field)
//! - Operator suffixes (`_eq`, `_ne`, `_gt`, `_gte`, `_lt`, `_lte`,
//!   `_contains`, `_startswith`, `_endswith`, `_between`, `_after`, `_before`)
//! - Value coercion to the field's declared type
//! - Same-field conjunctions
//! - Multi-key sorting and page-based pagination
//! - The `Entity` capability, the `DocumentStore` trait, a typed
//!   `Repository` and a lazy `EntityCursor`
//! - An in-memory store
//!
//! ## Compiling a query
//!
//! ```rust
//! use crudgate_query::{EntityDescriptor, FieldType, QueryOptions, QueryParams};
//! use crudgate_query::filter::{FieldFilter, Predicate};
//!
//! let users = EntityDescriptor::builder("User")
//!     .field("username", "username", FieldType::Text)
//!     .field("age", "age", FieldType::Integer)
//!     .build();
//!
//! let params = QueryParams::parse("username_startswith=ad&age_gte=18&age_lt=65&sort=-age");
//! let options = QueryOptions::compile_for(&params, &users).unwrap();
//!
//! assert!(matches!(
//!     options.filter().get("username"),
//!     Some(FieldFilter::Single(Predicate::Matches(_)))
//! ));
//! assert_eq!(options.filter().get("age").unwrap().predicates().len(), 2);
//! assert_eq!(options.sort()[0].field(), "age");
//! assert_eq!((options.skip(), options.limit()), (0, 10));
//! ```
//!
//! ## Errors
//!
//! Every filter problem is detected before the store is touched:
//!
//! ```rust
//! use crudgate_query::{EntityDescriptor, ErrorCode, FieldType, QueryOptions, QueryParams};
//!
//! let users = EntityDescriptor::builder("User")
//!     .field("name", "name", FieldType::Text)
//!     .build();
//!
//! let err = QueryOptions::compile_for(&QueryParams::parse("name_xyz=foo"), &users).unwrap_err();
//! assert_eq!(err.code, ErrorCode::InvalidOperator);
//! assert_eq!(err.to_string(), "invalid filter operator: xyz");
//! ```

pub mod coerce;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod filter;
pub mod logging;
pub mod memory;
pub mod operator;
pub mod options;
pub mod params;
pub mod store;

pub use coerce::Value;
pub use descriptor::{EntityDescriptor, EntityDescriptorBuilder, FieldDescriptor, FieldType};
pub use entity::{CollectionName, Entity};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use filter::{Anchor, FieldFilter, Filter, Predicate, TextPattern};
pub use memory::MemoryStore;
pub use operator::Operator;
pub use options::{Pagination, QueryOptions, SortDirection, SortField};
pub use params::QueryParams;
pub use store::{DocumentStore, EntityCursor, RecordStream, Repository};

// Re-export logging utilities
pub use logging::{get_log_format, get_log_level, init as init_logging, is_debug_enabled};

// Record types shared with store adapters and entity implementations
pub use bson::oid::ObjectId;
pub use bson::{Bson, Document, doc};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::descriptor::{EntityDescriptor, FieldType};
    pub use crate::entity::{CollectionName, Entity, hex_key};
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::filter::Filter;
    pub use crate::memory::MemoryStore;
    pub use crate::options::QueryOptions;
    pub use crate::params::QueryParams;
    pub use crate::store::{DocumentStore, EntityCursor, Repository};
    pub use bson::oid::ObjectId;
    pub use bson::{Document, doc};
}
