//! Compiled filters: predicates keyed by storage field name.
//!
//! ```rust
//! use crudgate_query::descriptor::{EntityDescriptor, FieldType};
//! use crudgate_query::filter::{FieldFilter, Filter, Predicate};
//! use crudgate_query::{QueryParams, Value};
//!
//! let people = EntityDescriptor::builder("Person")
//!     .field("age", "age", FieldType::Integer)
//!     .build();
//!
//! let params = QueryParams::parse("age_gte=18&age_lte=65&age_ne=30");
//! let filter = Filter::compile(&people, &params).unwrap();
//!
//! let Some(FieldFilter::All(predicates)) = filter.get("age") else { panic!() };
//! assert_eq!(predicates, &vec![
//!     Predicate::Gte(Value::Integer(18)),
//!     Predicate::Lte(Value::Integer(65)),
//!     Predicate::Ne(Value::Integer(30)),
//! ]);
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::trace;

use crate::coerce::{Value, coerce, escape_pattern, parse_between};
use crate::descriptor::{EntityDescriptor, FieldDescriptor};
use crate::error::QueryResult;
use crate::operator::{Operator, parse_param};
use crate::params::QueryParams;

/// Where a [`TextPattern`] literal must sit in the matched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Anywhere.
    Anywhere,
    /// At the start.
    Start,
    /// At the end.
    End,
}

/// A case-insensitive text pattern over a literal.
///
/// Carries both the escaped pattern source handed to document databases and
/// the case-folded literal used to match text in process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPattern {
    anchor: Anchor,
    pattern: String,
    folded: String,
}

impl TextPattern {
    fn new(anchor: Anchor, literal: &str) -> Self {
        let escaped = escape_pattern(literal);
        let pattern = match anchor {
            Anchor::Anywhere => escaped,
            Anchor::Start => format!("^{escaped}"),
            Anchor::End => format!("{escaped}$"),
        };
        Self {
            anchor,
            pattern,
            folded: literal.to_lowercase(),
        }
    }

    /// Substring match of a literal.
    pub fn contains(literal: &str) -> Self {
        Self::new(Anchor::Anywhere, literal)
    }

    /// Prefix match of a literal.
    pub fn starts_with(literal: &str) -> Self {
        Self::new(Anchor::Start, literal)
    }

    /// Suffix match of a literal.
    pub fn ends_with(literal: &str) -> Self {
        Self::new(Anchor::End, literal)
    }

    /// Where the literal must sit.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Pattern options understood by document stores (`i`: ignore case).
    pub fn options(&self) -> &'static str {
        "i"
    }

    /// Whether `text` matches, ignoring case for every Unicode letter.
    pub fn is_match(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        match self.anchor {
            Anchor::Anywhere => text.contains(&self.folded),
            Anchor::Start => text.starts_with(&self.folded),
            Anchor::End => text.ends_with(&self.folded),
        }
    }
}

/// A single comparison condition on one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Equals the value.
    Eq(Value),
    /// Does not equal the value.
    Ne(Value),
    /// Greater than.
    Gt(Value),
    /// Greater than or equal.
    Gte(Value),
    /// Less than.
    Lt(Value),
    /// Less than or equal.
    Lte(Value),
    /// Case-insensitive pattern match.
    Matches(TextPattern),
    /// Closed date-time interval.
    Between(DateTime<Utc>, DateTime<Utc>),
}

impl Predicate {
    /// Build the predicate a parameter asks for.
    ///
    /// Pattern operators use the raw string; `between` parses its own
    /// date-time pair; every other operator coerces the value to the field's
    /// declared type.
    pub fn compile(
        field: &FieldDescriptor,
        operator: Operator,
        param: &str,
        raw: &str,
    ) -> QueryResult<Self> {
        let typed = || coerce(field.field_type(), param, raw);

        Ok(match operator {
            Operator::Eq => Self::Eq(typed()?),
            Operator::Ne => Self::Ne(typed()?),
            Operator::Gt => Self::Gt(typed()?),
            Operator::Gte => Self::Gte(typed()?),
            Operator::Lt => Self::Lt(typed()?),
            Operator::Lte => Self::Lte(typed()?),
            Operator::Contains => Self::Matches(TextPattern::contains(raw)),
            Operator::StartsWith => Self::Matches(TextPattern::starts_with(raw)),
            Operator::EndsWith => Self::Matches(TextPattern::ends_with(raw)),
            Operator::Between => {
                let (start, end) = parse_between(param, raw)?;
                Self::Between(start, end)
            }
        })
    }
}

/// The condition on one storage field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Exactly one predicate.
    Single(Predicate),
    /// A conjunction of predicates, in arrival order.
    All(Vec<Predicate>),
}

impl FieldFilter {
    /// Predicates making up this condition.
    pub fn predicates(&self) -> &[Predicate] {
        match self {
            Self::Single(p) => std::slice::from_ref(p),
            Self::All(ps) => ps,
        }
    }

    fn and(&mut self, predicate: Predicate) {
        let all = match std::mem::replace(self, Self::All(Vec::new())) {
            Self::Single(first) => vec![first, predicate],
            Self::All(mut all) => {
                all.push(predicate);
                all
            }
        };
        *self = Self::All(all);
    }
}

/// Conditions keyed by storage field name.
///
/// Every field must satisfy its condition; the empty filter matches all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: IndexMap<String, FieldFilter>,
}

impl Filter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile query parameters against a descriptor.
    ///
    /// Only the first value of each parameter name is used. Any operator or
    /// value error aborts compilation; no partial filter is returned.
    pub fn compile(descriptor: &EntityDescriptor, params: &QueryParams) -> QueryResult<Self> {
        let mut filter = Self::new();

        for (param, raw) in params.first_values() {
            let Some(parsed) = parse_param(descriptor, param)? else {
                continue;
            };
            let predicate = Predicate::compile(parsed.field, parsed.operator, param, raw)?;
            trace!(
                param,
                field = parsed.field.storage_name(),
                operator = %parsed.operator,
                "compiled predicate"
            );
            filter.push(parsed.field.storage_name(), predicate);
        }

        Ok(filter)
    }

    /// Add a predicate, combining with any existing condition on the field.
    pub fn push(&mut self, field: impl Into<String>, predicate: Predicate) {
        match self.fields.entry(field.into()) {
            Entry::Occupied(mut entry) => entry.get_mut().and(predicate),
            Entry::Vacant(entry) => {
                entry.insert(FieldFilter::Single(predicate));
            }
        }
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.push(field, predicate);
        self
    }

    /// Condition on a storage field.
    pub fn get(&self, field: &str) -> Option<&FieldFilter> {
        self.fields.get(field)
    }

    /// Conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldFilter)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of constrained fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;
    use crate::error::ErrorCode;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::builder("User")
            .field("username", "username", FieldType::Text)
            .field("age", "age", FieldType::Integer)
            .field("score", "score", FieldType::Float)
            .field("birthdate", "birth_date", FieldType::DateTime)
            .build()
    }

    fn compile(query: &str) -> QueryResult<Filter> {
        Filter::compile(&descriptor(), &QueryParams::parse(query))
    }

    #[test]
    fn test_single_predicate_per_operator() {
        let cases = [
            ("username=ada", Predicate::Eq(Value::from("ada"))),
            ("username_eq=ada", Predicate::Eq(Value::from("ada"))),
            ("username_ne=ada", Predicate::Ne(Value::from("ada"))),
            ("score_gt=1.5", Predicate::Gt(Value::Float(1.5))),
            ("score_gte=1.5", Predicate::Gte(Value::Float(1.5))),
            ("score_lt=1.5", Predicate::Lt(Value::Float(1.5))),
            ("score_lte=1.5", Predicate::Lte(Value::Float(1.5))),
        ];

        for (query, expected) in cases {
            let filter = compile(query).unwrap();
            assert_eq!(filter.len(), 1, "{query}");
            let (_, condition) = filter.iter().next().unwrap();
            assert_eq!(condition, &FieldFilter::Single(expected), "{query}");
        }
    }

    #[test]
    fn test_after_before_aliases() {
        let filter = compile("birthdate_after=2000-01-01T00:00:00Z").unwrap();
        assert_eq!(
            filter.get("birth_date"),
            Some(&FieldFilter::Single(Predicate::Gt(Value::DateTime(
                Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
            ))))
        );

        let filter = compile("birthdate_before=2000-01-01T00:00:00Z").unwrap();
        assert!(matches!(
            filter.get("birth_date"),
            Some(FieldFilter::Single(Predicate::Lt(Value::DateTime(_))))
        ));
    }

    #[test]
    fn test_pattern_operators_escape_input() {
        let filter = compile("username_contains=a.b").unwrap();
        let Some(FieldFilter::Single(Predicate::Matches(p))) = filter.get("username") else {
            panic!("expected pattern predicate");
        };
        assert_eq!(p.as_str(), r"a\.b");
        assert_eq!(p.options(), "i");

        let filter = compile("username_startswith=a+b").unwrap();
        let Some(FieldFilter::Single(Predicate::Matches(p))) = filter.get("username") else {
            panic!("expected pattern predicate");
        };
        assert_eq!(p.as_str(), "^a b");

        let filter = compile("username_endswith=x$").unwrap();
        let Some(FieldFilter::Single(Predicate::Matches(p))) = filter.get("username") else {
            panic!("expected pattern predicate");
        };
        assert_eq!(p.as_str(), r"x\$$");
    }

    #[test]
    fn test_text_pattern_ignores_case_beyond_ascii() {
        let pattern = TextPattern::contains("JÜRG");
        assert!(pattern.is_match("Jürgen"));
        assert!(!pattern.is_match("Jurgen"));

        assert!(TextPattern::starts_with("ÉL").is_match("élodie"));
        assert!(!TextPattern::starts_with("ÉL").is_match("Mél"));
        assert!(TextPattern::ends_with("ØRN").is_match("Bjørn"));
        assert!(TextPattern::contains("a.b").is_match("xA.By"));
        assert!(!TextPattern::contains("a.b").is_match("axb"));
        assert_eq!(TextPattern::ends_with("x").anchor(), Anchor::End);
    }

    #[test]
    fn test_pattern_operators_skip_type_coercion() {
        let filter = compile("score_contains=1.").unwrap();
        assert!(matches!(
            filter.get("score"),
            Some(FieldFilter::Single(Predicate::Matches(_)))
        ));
    }

    #[test]
    fn test_between_is_date_interval_on_any_field() {
        let filter = compile("age_between=2020-01-01T00:00:00Z,2020-12-31T23:59:59Z").unwrap();
        assert_eq!(
            filter.get("age"),
            Some(&FieldFilter::Single(Predicate::Between(
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2020, 12, 31, 23, 59, 59).unwrap(),
            )))
        );

        let err = compile("age_between=onlyone").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidBetweenValue);
    }

    #[test]
    fn test_same_field_predicates_conjoin() {
        let filter = compile("age_gte=18&age_lte=65&age_ne=30").unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(
            filter.get("age"),
            Some(&FieldFilter::All(vec![
                Predicate::Gte(Value::Integer(18)),
                Predicate::Lte(Value::Integer(65)),
                Predicate::Ne(Value::Integer(30)),
            ]))
        );
    }

    #[test]
    fn test_field_order_follows_parameters() {
        let filter = compile("score_gt=1&username=a&score_lt=9").unwrap();
        let fields: Vec<_> = filter.iter().map(|(k, _)| k).collect();
        assert_eq!(fields, vec!["score", "username"]);
        assert_eq!(filter.get("score").unwrap().predicates().len(), 2);
    }

    #[test]
    fn test_repeated_parameter_uses_first_value() {
        let filter = compile("age=1&age=2").unwrap();
        assert_eq!(
            filter.get("age"),
            Some(&FieldFilter::Single(Predicate::Eq(Value::Integer(1))))
        );
    }

    #[test]
    fn test_errors_abort_whole_filter() {
        let err = compile("username=a&username_xyz=foo").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOperator);
        assert!(err.message.contains("xyz"));

        let err = compile("score_gt=high").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFloatFormat);

        let err = compile("birthdate=yesterday").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDateFormat);
    }

    #[test]
    fn test_non_field_params_are_ignored() {
        let filter = compile("sort=-age&page=2&pageSize=5&unknown=1").unwrap();
        assert!(filter.is_empty());
    }
}
