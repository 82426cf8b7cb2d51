//! Error types for filter compilation and store operations.
//!
//! Every failure carries an [`ErrorCode`] for programmatic handling plus a
//! human-readable message. The HTTP boundary decides status codes from the
//! code's category; this crate never does.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: Q{category}{number}
//! - 1xxx: Request errors (bad operator, bad value, bad key, bad payload)
//! - 2xxx: Lookup errors (record not found)
//! - 3xxx: Entity definition errors (descriptor cannot be derived)
//! - 4xxx: Store errors (connection, database)
//! - 5xxx: Data errors (encode, decode)
//! - 6xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use crudgate_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::invalid_operator("name_xyz", "xyz");
//! assert_eq!(err.code, ErrorCode::InvalidOperator);
//! assert!(err.is_client_error());
//! assert!(err.to_string().contains("xyz"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request errors (1xxx)
    /// Unrecognized operator suffix on a filter parameter (Q1001).
    InvalidOperator = 1001,
    /// Value is not an RFC 3339 date-time (Q1002).
    InvalidDateFormat = 1002,
    /// Value is not a base-10 float (Q1003).
    InvalidFloatFormat = 1003,
    /// Value is not a base-10 integer (Q1004).
    InvalidIntegerFormat = 1004,
    /// Value is not a 24-hex object id (Q1005).
    InvalidKeyFormat = 1005,
    /// Malformed `between` value (Q1006).
    InvalidBetweenValue = 1006,
    /// Malformed record key in a path (Q1007).
    InvalidKey = 1007,
    /// Malformed request payload (Q1008).
    InvalidPayload = 1008,

    // Lookup errors (2xxx)
    /// Record not found (Q2001).
    RecordNotFound = 2001,

    // Entity definition errors (3xxx)
    /// Entity descriptor could not be derived from a value (Q3001).
    NotAStruct = 3001,

    // Store errors (4xxx)
    /// Store connection failed (Q4001).
    ConnectionFailed = 4001,
    /// General store error (Q4002).
    DatabaseError = 4002,

    // Data errors (5xxx)
    /// Entity could not be encoded into a record (Q5001).
    SerializationError = 5001,
    /// Record could not be decoded into an entity (Q5002).
    DeserializationError = 5002,

    // Configuration errors (6xxx)
    /// Invalid configuration (Q6001).
    InvalidConfiguration = 6001,

    // Internal errors (9xxx)
    /// Internal error (Q9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "Q1001").
    pub fn code(&self) -> String {
        format!("Q{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidOperator => "Invalid filter operator",
            Self::InvalidDateFormat => "Invalid date format",
            Self::InvalidFloatFormat => "Invalid float format",
            Self::InvalidIntegerFormat => "Invalid integer format",
            Self::InvalidKeyFormat => "Invalid key format",
            Self::InvalidBetweenValue => "Invalid between value",
            Self::InvalidKey => "Invalid record key",
            Self::InvalidPayload => "Invalid request payload",
            Self::RecordNotFound => "Record not found",
            Self::NotAStruct => "Entity is not a struct",
            Self::ConnectionFailed => "Store connection failed",
            Self::DatabaseError => "Store error",
            Self::SerializationError => "Serialization error",
            Self::DeserializationError => "Deserialization error",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }

    /// Whether the code describes a problem with the incoming request.
    pub fn is_request_error(&self) -> bool {
        (1000..2000).contains(&(*self as u16))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity involved.
    pub entity: Option<String>,
    /// The query parameter involved.
    pub parameter: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

/// Errors that can occur while compiling queries or talking to a store.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the query parameter.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.context.parameter = Some(parameter.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an invalid operator error.
    pub fn invalid_operator(param: impl Into<String>, operator: impl Into<String>) -> Self {
        let operator = operator.into();
        Self::new(
            ErrorCode::InvalidOperator,
            format!("invalid filter operator: {}", operator),
        )
        .with_parameter(param)
        .with_suggestion(
            "use one of eq, ne, gt, after, gte, lt, before, lte, contains, startswith, endswith, between",
        )
    }

    /// Create an invalid date format error.
    pub fn invalid_date(param: impl Into<String>, detail: impl fmt::Display) -> Self {
        let param = param.into();
        Self::new(
            ErrorCode::InvalidDateFormat,
            format!("invalid date format for {}: {}", param, detail),
        )
        .with_parameter(param)
        .with_suggestion("dates use RFC 3339, e.g. 2020-01-01T00:00:00Z")
    }

    /// Create an invalid float format error.
    pub fn invalid_float(param: impl Into<String>, detail: impl fmt::Display) -> Self {
        let param = param.into();
        Self::new(
            ErrorCode::InvalidFloatFormat,
            format!("invalid float format for {}: {}", param, detail),
        )
        .with_parameter(param)
    }

    /// Create an invalid integer format error.
    pub fn invalid_integer(param: impl Into<String>, detail: impl fmt::Display) -> Self {
        let param = param.into();
        Self::new(
            ErrorCode::InvalidIntegerFormat,
            format!("invalid integer format for {}: {}", param, detail),
        )
        .with_parameter(param)
    }

    /// Create an invalid key format error for a filter value.
    pub fn invalid_key_format(param: impl Into<String>, detail: impl fmt::Display) -> Self {
        let param = param.into();
        Self::new(
            ErrorCode::InvalidKeyFormat,
            format!("invalid key format for {}: {}", param, detail),
        )
        .with_parameter(param)
    }

    /// Create an invalid between value error.
    pub fn invalid_between(param: impl Into<String>, detail: impl Into<String>) -> Self {
        let param = param.into();
        Self::new(
            ErrorCode::InvalidBetweenValue,
            format!("invalid between value for {}: {}", param, detail.into()),
        )
        .with_parameter(param)
        .with_suggestion("between takes two RFC 3339 date-times separated by a comma")
    }

    /// Create an invalid record key error.
    pub fn invalid_key(key: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidKey, format!("invalid id: {}", key))
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPayload, message)
    }

    /// Create a not found error.
    pub fn not_found(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::RecordNotFound,
            format!("no {} record found", entity),
        )
        .with_entity(entity)
    }

    /// Create a not-a-struct error.
    pub fn not_a_struct(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::NotAStruct,
            format!("{} must be a struct to derive filterable fields", entity),
        )
        .with_entity(entity)
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConnectionFailed,
            format!("connection error: {}", message.into()),
        )
    }

    /// Create a general store error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message)
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DeserializationError,
            format!("failed to decode record: {}", message.into()),
        )
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::Internal,
            format!("internal error: {}", message.into()),
        )
    }

    // ============== Error Checks ==============

    /// Check if the error was caused by the incoming request.
    pub fn is_client_error(&self) -> bool {
        self.code.is_request_error()
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        self.code == ErrorCode::ConnectionFailed
    }

    /// Display the error with its code, context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.code.code(), self.message);

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  -> While: {}\n", op));
        }
        if let Some(ref entity) = self.context.entity {
            output.push_str(&format!("  -> Entity: {}\n", entity));
        }
        if let Some(ref param) = self.context.parameter {
            output.push_str(&format!("  -> Parameter: {}\n", param));
        }
        for suggestion in &self.context.suggestions {
            output.push_str(&format!("  hint: {}\n", suggestion));
        }

        output
    }
}

impl From<bson::ser::Error> for QueryError {
    fn from(err: bson::ser::Error) -> Self {
        QueryError::serialization(err.to_string()).with_source(err)
    }
}

impl From<bson::de::Error> for QueryError {
    fn from(err: bson::de::Error) -> Self {
        QueryError::deserialization(err.to_string()).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::InvalidOperator.code(), "Q1001");
        assert_eq!(ErrorCode::NotAStruct.code(), "Q3001");
        assert_eq!(ErrorCode::RecordNotFound.to_string(), "Q2001");
    }

    #[test]
    fn test_request_error_classification() {
        assert!(QueryError::invalid_operator("a_b", "b").is_client_error());
        assert!(QueryError::invalid_date("at", "bad").is_client_error());
        assert!(QueryError::invalid_float("x", "bad").is_client_error());
        assert!(QueryError::invalid_between("at_between", "x").is_client_error());
        assert!(QueryError::invalid_key("zz").is_client_error());
        assert!(!QueryError::not_a_struct("User").is_client_error());
        assert!(!QueryError::database("boom").is_client_error());
        assert!(!QueryError::not_found("User").is_client_error());
    }

    #[test]
    fn test_messages_name_parameter() {
        let err = QueryError::invalid_date("birthdate_gt", "premature end of input");
        assert_eq!(
            err.to_string(),
            "invalid date format for birthdate_gt: premature end of input"
        );
        assert_eq!(err.context.parameter.as_deref(), Some("birthdate_gt"));

        let err = QueryError::invalid_float("score", "invalid float literal");
        assert!(err.to_string().starts_with("invalid float format for score"));
    }

    #[test]
    fn test_display_full() {
        let err = QueryError::invalid_operator("name_xyz", "xyz").with_entity("User");
        let full = err.display_full();
        assert!(full.contains("Q1001"));
        assert!(full.contains("Entity: User"));
        assert!(full.contains("Parameter: name_xyz"));
        assert!(full.contains("hint:"));
    }

    #[test]
    fn test_not_found() {
        let err = QueryError::not_found("User");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no User record found");
    }
}
