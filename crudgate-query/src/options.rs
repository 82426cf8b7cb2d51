//! Query options: filter, sort and pagination in one immutable bundle.
//!
//! ```rust
//! use crudgate_query::descriptor::{EntityDescriptor, FieldType};
//! use crudgate_query::options::{QueryOptions, SortDirection};
//! use crudgate_query::QueryParams;
//!
//! let users = EntityDescriptor::builder("User")
//!     .field("username", "username", FieldType::Text)
//!     .field("birthdate", "birthdate", FieldType::DateTime)
//!     .build();
//!
//! let params = QueryParams::parse("sort=-birthdate&sort=username&pageSize=5&page=3");
//! let options = QueryOptions::compile_for(&params, &users).unwrap();
//!
//! assert_eq!(options.sort()[0].field(), "birthdate");
//! assert_eq!(options.sort()[0].direction(), SortDirection::Descending);
//! assert_eq!(options.sort()[1].direction(), SortDirection::Ascending);
//! assert_eq!(options.skip(), 10);
//! assert_eq!(options.limit(), 5);
//! ```

use std::borrow::Borrow;
use std::fmt;

use tracing::debug;

use crate::descriptor::EntityDescriptor;
use crate::error::QueryResult;
use crate::filter::Filter;
use crate::params::QueryParams;

/// Name of the repeatable sort parameter.
pub const SORT_PARAM: &str = "sort";
/// Name of the page number parameter.
pub const PAGE_PARAM: &str = "page";
/// Name of the page size parameter.
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

impl SortDirection {
    /// Numeric form used by document stores (`1` / `-1`).
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        })
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    field: String,
    direction: SortDirection,
}

impl SortField {
    /// Create a sort key on a storage field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Ascending sort on a storage field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    /// Descending sort on a storage field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Parse a `sort` parameter value (`field` or `-field`).
    ///
    /// Known wire names are translated to storage names; anything else is
    /// used as given. Returns `None` for an empty value.
    pub fn parse(value: &str, descriptor: &EntityDescriptor) -> Option<Self> {
        let (name, direction) = match value.strip_prefix('-') {
            Some(name) => (name, SortDirection::Descending),
            None => (value, SortDirection::Ascending),
        };
        if name.is_empty() {
            return None;
        }
        let field = descriptor.storage_name(name).unwrap_or(name);
        Some(Self::new(field, direction))
    }

    /// Storage field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Sort direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Page-based pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    page_size: u64,
}

impl Pagination {
    /// Default 1-based page number.
    pub const DEFAULT_PAGE: u64 = 1;
    /// Default page size.
    pub const DEFAULT_PAGE_SIZE: u64 = 10;

    /// Create pagination; zero values fall back to the defaults.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: if page == 0 { Self::DEFAULT_PAGE } else { page },
            page_size: if page_size == 0 {
                Self::DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    /// Read `page` and `pageSize`.
    ///
    /// Missing, malformed or non-positive values silently fall back to the
    /// defaults, each independently of the other.
    pub fn from_params(params: &QueryParams) -> Self {
        let read = |name: &str| {
            params
                .first(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };
        Self::new(read(PAGE_PARAM), read(PAGE_SIZE_PARAM))
    }

    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Page size.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Records to skip.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Maximum records to return.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_PAGE_SIZE)
    }
}

/// The filter, sort and pagination handed to a store.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    filter: Filter,
    sort: Vec<SortField>,
    pagination: Pagination,
}

impl QueryOptions {
    /// Assemble options from parts.
    pub fn new(filter: Filter, sort: Vec<SortField>, pagination: Pagination) -> Self {
        Self {
            filter,
            sort,
            pagination,
        }
    }

    /// Compile query parameters, resolving the descriptor only when needed.
    ///
    /// An empty parameter set yields the default options without calling
    /// `resolve`. Filter errors fail the whole compilation; pagination errors
    /// never do.
    pub fn compile<F, D>(params: &QueryParams, resolve: F) -> QueryResult<Self>
    where
        F: FnOnce() -> QueryResult<D>,
        D: Borrow<EntityDescriptor>,
    {
        if params.is_empty() {
            return Ok(Self::default());
        }

        let resolved = resolve()?;
        let descriptor = resolved.borrow();
        let filter = Filter::compile(descriptor, params)?;
        let sort = params
            .all(SORT_PARAM)
            .into_iter()
            .filter_map(|value| SortField::parse(value, descriptor))
            .collect();
        let pagination = Pagination::from_params(params);

        let options = Self::new(filter, sort, pagination);
        debug!(
            entity = descriptor.name(),
            fields = options.filter.len(),
            sort_keys = options.sort.len(),
            skip = options.skip(),
            limit = options.limit(),
            "compiled query options"
        );
        Ok(options)
    }

    /// Compile against an already resolved descriptor.
    pub fn compile_for(params: &QueryParams, descriptor: &EntityDescriptor) -> QueryResult<Self> {
        Self::compile(params, || Ok(descriptor))
    }

    /// The compiled filter.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Sort keys in priority order.
    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    /// Pagination.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Records to skip.
    pub fn skip(&self) -> u64 {
        self.pagination.skip()
    }

    /// Maximum records to return.
    pub fn limit(&self) -> u64 {
        self.pagination.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::FieldType;
    use crate::error::{ErrorCode, QueryError};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn users() -> EntityDescriptor {
        EntityDescriptor::builder("User")
            .field("username", "username", FieldType::Text)
            .field("birthdate", "birth_date", FieldType::DateTime)
            .build()
    }

    #[test]
    fn test_sort_order_and_direction() {
        let d = users();
        let params = QueryParams::parse("sort=-birthdate&sort=username");
        let options = QueryOptions::compile_for(&params, &d).unwrap();

        assert_eq!(
            options.sort(),
            &[SortField::desc("birth_date"), SortField::asc("username")]
        );
    }

    #[test]
    fn test_sort_unknown_field_is_passed_through() {
        let d = users();
        let params = QueryParams::parse("sort=-createdAt&sort=-&sort=");
        let options = QueryOptions::compile_for(&params, &d).unwrap();
        assert_eq!(options.sort(), &[SortField::desc("createdAt")]);
    }

    #[test]
    fn test_pagination() {
        let p = Pagination::from_params(&QueryParams::parse("pageSize=5&page=3"));
        assert_eq!((p.skip(), p.limit()), (10, 5));

        let p = Pagination::from_params(&QueryParams::parse("pageSize=abc"));
        assert_eq!((p.page(), p.page_size()), (1, 10));

        let p = Pagination::from_params(&QueryParams::parse("pageSize=abc&page=3"));
        assert_eq!((p.page(), p.page_size()), (3, 10));

        let p = Pagination::from_params(&QueryParams::parse("page=-2&pageSize=0"));
        assert_eq!((p.page(), p.page_size()), (1, 10));
    }

    #[test]
    fn test_empty_query_skips_introspection() {
        let calls = Cell::new(0);
        let options = QueryOptions::compile(&QueryParams::new(), || {
            calls.set(calls.get() + 1);
            Err::<EntityDescriptor, _>(QueryError::not_a_struct("Never"))
        })
        .unwrap();

        assert_eq!(calls.get(), 0);
        assert_eq!(options, QueryOptions::default());
        assert!(options.filter().is_empty());
        assert!(options.sort().is_empty());
        assert_eq!((options.skip(), options.limit()), (0, 10));
    }

    #[test]
    fn test_descriptor_failure_propagates() {
        let err = QueryOptions::compile(&QueryParams::parse("username=a"), || {
            Err::<EntityDescriptor, _>(QueryError::not_a_struct("Label"))
        })
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAStruct);
    }

    #[test]
    fn test_bad_pagination_does_not_mask_filter_error() {
        let d = users();
        let err = QueryOptions::compile_for(&QueryParams::parse("pageSize=x&username_bad=1"), &d)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOperator);
    }
}
