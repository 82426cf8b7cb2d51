//! `DocumentStore` implementation over MongoDB collections.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use crudgate_query::{
    CollectionName, DocumentStore, QueryError, QueryOptions, QueryResult, RecordStream,
};
use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use crate::client::MongoClient;
use crate::error::MongoError;
use crate::filter::{filter_to_document, find_options};

/// A [`DocumentStore`] backed by a MongoDB deployment.
///
/// Each entity type lives in the collection its `NAMESPACE` and
/// `COLLECTION` name. Result streams wrap driver cursors; dropping a stream
/// kills the server-side cursor.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: MongoClient,
}

impl MongoStore {
    /// Create a store over a client.
    pub fn new(client: MongoClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

fn by_key(key: ObjectId) -> Document {
    doc! { "_id": key }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: CollectionName, options: &QueryOptions) -> QueryResult<RecordStream> {
        let filter = filter_to_document(options.filter());
        let find = find_options(options);
        debug!(
            %collection,
            filter = %filter,
            sort = ?find.sort,
            skip = ?find.skip,
            limit = ?find.limit,
            "mongodb find"
        );

        let cursor = self
            .client
            .collection(collection)
            .find(filter, find)
            .await
            .map_err(MongoError::from)?;

        Ok(cursor
            .map_err(|e| QueryError::from(MongoError::from(e)))
            .boxed())
    }

    async fn find_by_key(&self, collection: CollectionName, key: ObjectId) -> QueryResult<Option<Document>> {
        debug!(%collection, %key, "mongodb find_one");
        let record = self
            .client
            .collection(collection)
            .find_one(by_key(key), None)
            .await
            .map_err(MongoError::from)?;
        Ok(record)
    }

    async fn insert(&self, collection: CollectionName, record: Document) -> QueryResult<ObjectId> {
        let result = self
            .client
            .collection(collection)
            .insert_one(record, None)
            .await
            .map_err(MongoError::from)?;

        match result.inserted_id {
            Bson::ObjectId(key) => {
                debug!(%collection, %key, "mongodb insert_one");
                Ok(key)
            }
            other => Err(MongoError::unexpected(format!("inserted id is not an object id: {other}")).into()),
        }
    }

    async fn replace(&self, collection: CollectionName, key: ObjectId, mut record: Document) -> QueryResult<u64> {
        record.remove("_id");
        let result = self
            .client
            .collection(collection)
            .replace_one(by_key(key), record, None)
            .await
            .map_err(MongoError::from)?;
        debug!(
            %collection,
            %key,
            matched = result.matched_count,
            modified = result.modified_count,
            "mongodb replace_one"
        );
        Ok(result.modified_count)
    }

    async fn delete(&self, collection: CollectionName, key: ObjectId) -> QueryResult<u64> {
        let result = self
            .client
            .collection(collection)
            .delete_one(by_key(key), None)
            .await
            .map_err(MongoError::from)?;
        debug!(%collection, %key, deleted = result.deleted_count, "mongodb delete_one");
        Ok(result.deleted_count)
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
