//! In-process document store.
//!
//! Evaluates compiled filters directly against stored documents, with the
//! same matching rules a document database applies: `ne` matches records
//! lacking the field, every other predicate requires it, and patterns only
//! match strings.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::coerce::Value;
use crate::entity::CollectionName;
use crate::error::{QueryError, QueryResult};
use crate::filter::{Filter, Predicate};
use crate::options::{QueryOptions, SortDirection, SortField};
use crate::store::{DocumentStore, RecordStream};

const KEY_FIELD: &str = "_id";

type Records = IndexMap<ObjectId, Document>;

/// A [`DocumentStore`] keeping records in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionName, Records>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: CollectionName) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map_or(0, IndexMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: CollectionName, options: &QueryOptions) -> QueryResult<RecordStream> {
        let mut matched: Vec<Document> = {
            let collections = self.collections.read();
            collections
                .get(&collection)
                .map(|records| {
                    records
                        .values()
                        .filter(|doc| satisfies(options.filter(), doc))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        if !options.sort().is_empty() {
            matched.sort_by(|a, b| compare_by(options.sort(), a, b));
        }

        let skip = usize::try_from(options.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(options.limit()).unwrap_or(usize::MAX);
        let page: Vec<Document> = matched.into_iter().skip(skip).take(limit).collect();

        debug!(
            %collection,
            returned = page.len(),
            skip,
            limit,
            "memory find"
        );
        Ok(stream::iter(page.into_iter().map(Ok)).boxed())
    }

    async fn find_by_key(&self, collection: CollectionName, key: ObjectId) -> QueryResult<Option<Document>> {
        Ok(self
            .collections
            .read()
            .get(&collection)
            .and_then(|records| records.get(&key))
            .cloned())
    }

    async fn insert(&self, collection: CollectionName, record: Document) -> QueryResult<ObjectId> {
        let key = match record.get(KEY_FIELD) {
            Some(Bson::ObjectId(oid)) => *oid,
            Some(other) => {
                return Err(QueryError::invalid_payload(format!(
                    "{KEY_FIELD} must be an object id, got {other}"
                )));
            }
            None => ObjectId::new(),
        };

        let mut collections = self.collections.write();
        let records = collections.entry(collection).or_default();
        if records.contains_key(&key) {
            return Err(QueryError::database(format!("duplicate key {key} in {collection}")));
        }
        records.insert(key, keyed(key, record));
        Ok(key)
    }

    async fn replace(&self, collection: CollectionName, key: ObjectId, record: Document) -> QueryResult<u64> {
        let mut collections = self.collections.write();
        let Some(existing) = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(&key))
        else {
            return Ok(0);
        };

        let replacement = keyed(key, record);
        if *existing == replacement {
            return Ok(0);
        }
        *existing = replacement;
        Ok(1)
    }

    async fn delete(&self, collection: CollectionName, key: ObjectId) -> QueryResult<u64> {
        let removed = self
            .collections
            .write()
            .get_mut(&collection)
            .and_then(|records| records.shift_remove(&key));
        Ok(u64::from(removed.is_some()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Put `_id` first and drop any other `_id` the record carries.
fn keyed(key: ObjectId, record: Document) -> Document {
    let mut doc = Document::new();
    doc.insert(KEY_FIELD, key);
    doc.extend(record.into_iter().filter(|(k, _)| k != KEY_FIELD));
    doc
}

fn satisfies(filter: &Filter, doc: &Document) -> bool {
    filter.iter().all(|(field, condition)| {
        let value = doc.get(field);
        condition
            .predicates()
            .iter()
            .all(|predicate| accepts(predicate, value))
    })
}

fn accepts(predicate: &Predicate, value: Option<&Bson>) -> bool {
    match (predicate, value) {
        (Predicate::Ne(expected), Some(actual)) => {
            compare(actual, expected) != Some(Ordering::Equal)
        }
        (Predicate::Ne(_), None) => true,
        (_, None) => false,
        (Predicate::Eq(expected), Some(actual)) => {
            compare(actual, expected) == Some(Ordering::Equal)
        }
        (Predicate::Gt(expected), Some(actual)) => {
            compare(actual, expected) == Some(Ordering::Greater)
        }
        (Predicate::Gte(expected), Some(actual)) => matches!(
            compare(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        (Predicate::Lt(expected), Some(actual)) => {
            compare(actual, expected) == Some(Ordering::Less)
        }
        (Predicate::Lte(expected), Some(actual)) => matches!(
            compare(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        (Predicate::Matches(pattern), Some(Bson::String(s))) => pattern.is_match(s),
        (Predicate::Matches(_), Some(_)) => false,
        (Predicate::Between(start, end), Some(Bson::DateTime(actual))) => {
            let millis = actual.timestamp_millis();
            start.timestamp_millis() <= millis && millis <= end.timestamp_millis()
        }
        (Predicate::Between(..), Some(_)) => false,
    }
}

/// Compare a stored value with a filter value; `None` when the types differ.
fn compare(actual: &Bson, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Bson::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Bson::ObjectId(a), Value::Key(b)) => Some(a.bytes().cmp(&b.bytes())),
        (Bson::DateTime(a), Value::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        (Bson::Int32(a), Value::Integer(b)) => Some(i64::from(*a).cmp(b)),
        (Bson::Int64(a), Value::Integer(b)) => Some(a.cmp(b)),
        (actual, expected) => number(actual)?.partial_cmp(&expected_number(expected)?),
    }
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(d) => Some(*d),
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        _ => None,
    }
}

fn expected_number(value: &Value) -> Option<f64> {
    match value {
        Value::Float(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

fn compare_by(sort: &[SortField], a: &Document, b: &Document) -> Ordering {
    sort.iter()
        .map(|key| {
            let ordering = compare_stored(a.get(key.field()), b.get(key.field()));
            match key.direction() {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Total order over stored values: missing and null first, then numbers,
/// strings, object ids, booleans and date-times.
fn compare_stored(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (a, b) = (a.unwrap_or(&Bson::Null), b.unwrap_or(&Bson::Null));
    match type_rank(a).cmp(&type_rank(b)) {
        Ordering::Equal => {}
        unequal => return unequal,
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (x, y) => match (number(x), number(y)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}

fn type_rank(value: &Bson) -> u8 {
    match value {
        Bson::Null | Bson::Undefined => 0,
        Bson::Double(_) | Bson::Int32(_) | Bson::Int64(_) | Bson::Decimal128(_) => 1,
        Bson::String(_) | Bson::Symbol(_) => 2,
        Bson::Document(_) => 3,
        Bson::Array(_) => 4,
        Bson::Binary(_) => 5,
        Bson::ObjectId(_) => 6,
        Bson::Boolean(_) => 7,
        Bson::DateTime(_) => 8,
        Bson::Timestamp(_) => 9,
        _ => 10,
    }
}
