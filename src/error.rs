//! Server error types and result alias.

use crudgate_mongodb::MongoError;
use crudgate_query::QueryError;
use thiserror::Error;

/// Result type alias for server startup.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting or serving.
#[derive(Error, Debug)]
pub enum ServerError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Query layer error
    #[error(transparent)]
    Query(#[from] QueryError),

    /// MongoDB error
    #[error("MongoDB error: {0}")]
    Mongo(#[from] MongoError),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
