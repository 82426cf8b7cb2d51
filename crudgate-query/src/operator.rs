//! Filter operator suffixes.
//!
//! A filter parameter is either a bare wire name (`age`, meaning `eq`) or a
//! wire name followed by `_` and one of the recognized suffixes
//! (`age_gte`, `name_contains`, `birthdate_between`, ...).

use std::fmt;
use std::str::FromStr;

use crate::descriptor::{EntityDescriptor, FieldDescriptor};
use crate::error::{QueryError, QueryResult};

/// Comparison operator requested by a filter parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `eq` or a bare wire name.
    Eq,
    /// `ne`.
    Ne,
    /// `gt` or `after`.
    Gt,
    /// `gte`.
    Gte,
    /// `lt` or `before`.
    Lt,
    /// `lte`.
    Lte,
    /// `contains`: case-insensitive substring.
    Contains,
    /// `startswith`: case-insensitive prefix.
    StartsWith,
    /// `endswith`: case-insensitive suffix.
    EndsWith,
    /// `between`: closed date-time interval.
    Between,
}

impl Operator {
    /// Canonical suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Between => "between",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized operator suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" | "after" => Self::Gt,
            "gte" => Self::Gte,
            "lt" | "before" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "between" => Self::Between,
            other => return Err(UnknownOperator(other.to_string())),
        })
    }
}

/// A query parameter resolved against a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParam<'a> {
    /// The targeted field.
    pub field: &'a FieldDescriptor,
    /// The requested operator.
    pub operator: Operator,
}

/// Resolve which field and operator a parameter targets.
///
/// Returns `Ok(None)` for parameters that target no filterable field; those
/// are left to other consumers (sorting, pagination) or ignored. An
/// unrecognized suffix on a matching field is an `InvalidOperator` error.
pub fn parse_param<'a>(
    descriptor: &'a EntityDescriptor,
    param: &str,
) -> QueryResult<Option<ParsedParam<'a>>> {
    let Some((field, suffix)) = descriptor.match_param(param) else {
        return Ok(None);
    };

    let operator = match suffix {
        None => Operator::Eq,
        Some(suffix) => suffix
            .parse()
            .map_err(|UnknownOperator(op)| QueryError::invalid_operator(param, op))?,
    };

    Ok(Some(ParsedParam { field, operator }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;
    use crate::error::ErrorCode;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::builder("User")
            .field("name", "name", FieldType::Text)
            .field("birthdate", "birthdate", FieldType::DateTime)
            .build()
    }

    #[test]
    fn test_suffix_aliases() {
        assert_eq!("after".parse::<Operator>().unwrap(), Operator::Gt);
        assert_eq!("before".parse::<Operator>().unwrap(), Operator::Lt);
        assert_eq!("startswith".parse::<Operator>().unwrap(), Operator::StartsWith);
        assert!("Eq".parse::<Operator>().is_err());
    }

    #[test]
    fn test_bare_name_is_eq() {
        let d = descriptor();
        let parsed = parse_param(&d, "name").unwrap().unwrap();
        assert_eq!(parsed.operator, Operator::Eq);
        assert_eq!(parsed.field.storage_name(), "name");
    }

    #[test]
    fn test_suffixed_name() {
        let d = descriptor();
        let parsed = parse_param(&d, "birthdate_after").unwrap().unwrap();
        assert_eq!(parsed.operator, Operator::Gt);
        assert_eq!(parsed.field.wire_name(), "birthdate");
    }

    #[test]
    fn test_unknown_suffix_names_operator() {
        let d = descriptor();
        let err = parse_param(&d, "name_xyz").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOperator);
        assert!(err.message.contains("xyz"));
        assert_eq!(err.context.parameter.as_deref(), Some("name_xyz"));
    }

    #[test]
    fn test_unrelated_param_is_ignored() {
        let d = descriptor();
        assert!(parse_param(&d, "page").unwrap().is_none());
        assert!(parse_param(&d, "nickname").unwrap().is_none());
    }
}
