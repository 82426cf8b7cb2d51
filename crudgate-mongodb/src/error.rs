//! Error types for MongoDB operations.

use crudgate_query::QueryError;
use thiserror::Error;

/// Result type for MongoDB operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors raised by the MongoDB adapter.
#[derive(Error, Debug)]
pub enum MongoError {
    /// MongoDB driver error.
    #[error("mongodb error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server returned an unexpected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl MongoError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create an unexpected response error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Driver(e) => matches!(
                *e.kind,
                mongodb::error::ErrorKind::ServerSelection { .. }
                    | mongodb::error::ErrorKind::Io(_)
                    | mongodb::error::ErrorKind::ConnectionPoolCleared { .. }
            ),
            _ => false,
        }
    }
}

impl From<MongoError> for QueryError {
    fn from(err: MongoError) -> Self {
        if err.is_connection_error() {
            return QueryError::connection(err.to_string()).with_source(err);
        }
        match err {
            MongoError::Driver(e) => QueryError::database(e.to_string()).with_source(e),
            MongoError::Config(msg) => QueryError::configuration(msg),
            MongoError::Connection(msg) => QueryError::connection(msg),
            MongoError::UnexpectedResponse(msg) => QueryError::database(msg),
        }
    }
}
