//! Rendering of compiled query options into MongoDB query documents.
//!
//! | predicate | rendered |
//! |---|---|
//! | `Eq(v)` ... `Lte(v)` | `{field: {$eq: v}}` ... `{field: {$lte: v}}` |
//! | `Matches(p)` | `{field: {$regex: p, $options: "i"}}` |
//! | `Between(a, b)` | `{field: {$gte: a, $lte: b}}` |
//!
//! A field with several predicates contributes one `{field: {...}}` clause
//! per predicate to a top-level `$and`, in arrival order.

use bson::{Bson, Document, doc};
use crudgate_query::{FieldFilter, Filter, Predicate, QueryOptions, SortField};
use mongodb::options::FindOptions;

use crate::types::{datetime_to_bson, value_to_bson};

/// Render one predicate as an operator document.
pub fn predicate_to_document(predicate: &Predicate) -> Document {
    match predicate {
        Predicate::Eq(v) => doc! { "$eq": value_to_bson(v) },
        Predicate::Ne(v) => doc! { "$ne": value_to_bson(v) },
        Predicate::Gt(v) => doc! { "$gt": value_to_bson(v) },
        Predicate::Gte(v) => doc! { "$gte": value_to_bson(v) },
        Predicate::Lt(v) => doc! { "$lt": value_to_bson(v) },
        Predicate::Lte(v) => doc! { "$lte": value_to_bson(v) },
        Predicate::Matches(pattern) => doc! {
            "$regex": pattern.as_str(),
            "$options": pattern.options(),
        },
        Predicate::Between(start, end) => doc! {
            "$gte": datetime_to_bson(*start),
            "$lte": datetime_to_bson(*end),
        },
    }
}

/// Render a compiled filter as a query document.
pub fn filter_to_document(filter: &Filter) -> Document {
    let mut query = Document::new();
    let mut conjunction: Vec<Bson> = Vec::new();

    for (field, condition) in filter.iter() {
        match condition {
            FieldFilter::Single(predicate) => {
                query.insert(field, predicate_to_document(predicate));
            }
            FieldFilter::All(predicates) => {
                conjunction.extend(predicates.iter().map(|predicate| {
                    let mut clause = Document::new();
                    clause.insert(field, predicate_to_document(predicate));
                    Bson::Document(clause)
                }));
            }
        }
    }

    if !conjunction.is_empty() {
        query.insert("$and", conjunction);
    }
    query
}

/// Render sort keys as an ordered `{field: 1 | -1}` document.
pub fn sort_to_document(sort: &[SortField]) -> Option<Document> {
    if sort.is_empty() {
        return None;
    }
    let mut doc = Document::new();
    for key in sort {
        doc.insert(key.field(), key.direction().as_i32());
    }
    Some(doc)
}

/// Driver find options carrying sort, skip and limit.
pub fn find_options(options: &QueryOptions) -> FindOptions {
    let mut find = FindOptions::default();
    find.sort = sort_to_document(options.sort());
    if options.skip() > 0 {
        find.skip = Some(options.skip());
    }
    if options.limit() > 0 {
        find.limit = Some(i64::try_from(options.limit()).unwrap_or(i64::MAX));
    }
    find
}
