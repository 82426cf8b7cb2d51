//! Store abstraction, typed repository and lazy entity cursor.
//!
//! A [`DocumentStore`] speaks raw documents addressed by
//! [`CollectionName`]; a [`Repository`] binds one to an [`Entity`] type and
//! handles encoding and decoding.

use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use bson::Document;
use bson::oid::ObjectId;
use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, warn};

use crate::descriptor::EntityDescriptor;
use crate::entity::{CollectionName, Entity};
use crate::error::{QueryError, QueryResult};
use crate::options::QueryOptions;
use crate::params::QueryParams;

/// A finite, forward-only stream of raw records.
pub type RecordStream = BoxStream<'static, QueryResult<Document>>;

/// A document store holding keyed records.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Records matching the options' filter, sorted and paginated.
    async fn find(&self, collection: CollectionName, options: &QueryOptions) -> QueryResult<RecordStream>;

    /// The record with the given key.
    async fn find_by_key(&self, collection: CollectionName, key: ObjectId) -> QueryResult<Option<Document>>;

    /// Insert a record and return its generated key.
    async fn insert(&self, collection: CollectionName, record: Document) -> QueryResult<ObjectId>;

    /// Replace the record with the given key; returns the modified count.
    async fn replace(&self, collection: CollectionName, key: ObjectId, record: Document) -> QueryResult<u64>;

    /// Delete the record with the given key; returns the deleted count.
    async fn delete(&self, collection: CollectionName, key: ObjectId) -> QueryResult<u64>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Typed CRUD over an injected store.
///
/// The entity descriptor is built on the first non-empty query and shared
/// by every clone of the repository.
pub struct Repository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    descriptor: Arc<OnceLock<EntityDescriptor>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            descriptor: Arc::clone(&self.descriptor),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> std::fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &E::collection())
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl<E: Entity> Repository<E> {
    /// Bind a store to the entity type.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            descriptor: Arc::default(),
            _entity: PhantomData,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The entity's descriptor, built on first use.
    ///
    /// A failed build is not cached; the next call tries again.
    pub fn descriptor(&self) -> QueryResult<&EntityDescriptor> {
        if let Some(descriptor) = self.descriptor.get() {
            return Ok(descriptor);
        }
        let built = E::descriptor()?;
        debug!(entity = built.name(), fields = built.len(), "built descriptor");
        Ok(self.descriptor.get_or_init(|| built))
    }

    /// Insert an entity, assigning the generated key to it.
    pub async fn create(&self, entity: &mut E) -> QueryResult<ObjectId> {
        let record = entity.to_document()?;
        let key = self.store.insert(E::collection(), record).await?;
        entity.set_key(key);
        debug!(collection = %E::collection(), %key, "created record");
        Ok(key)
    }

    /// Look up an entity by key.
    pub async fn read(&self, key: ObjectId) -> QueryResult<E> {
        let record = self
            .store
            .find_by_key(E::collection(), key)
            .await?
            .ok_or_else(|| QueryError::not_found(E::COLLECTION).with_context(format!("key {key}")))?;
        E::from_document(record)
    }

    /// Compile a query string against the entity and open a cursor.
    ///
    /// Filter errors are raised here, before the store is touched. The
    /// descriptor is only built when the query is non-empty.
    pub async fn query(&self, params: &QueryParams) -> QueryResult<EntityCursor<E>> {
        let options = QueryOptions::compile(params, || self.descriptor())?;
        self.find(&options).await
    }

    /// Open a cursor over entities matching prepared options.
    pub async fn find(&self, options: &QueryOptions) -> QueryResult<EntityCursor<E>> {
        let records = self.store.find(E::collection(), options).await?;
        Ok(EntityCursor::new(records))
    }

    /// Replace the entity stored under `key`; the entity takes that key.
    pub async fn update(&self, key: ObjectId, entity: &mut E) -> QueryResult<u64> {
        entity.set_key(key);
        let record = entity.to_document()?;
        let modified = self.store.replace(E::collection(), key, record).await?;
        debug!(collection = %E::collection(), %key, modified, "replaced record");
        Ok(modified)
    }

    /// Delete the entity stored under `key`.
    pub async fn delete(&self, key: ObjectId) -> QueryResult<u64> {
        let deleted = self.store.delete(E::collection(), key).await?;
        debug!(collection = %E::collection(), %key, deleted, "deleted record");
        Ok(deleted)
    }
}

/// Forward-only, single-pass sequence of decoded entities.
///
/// Dropping the cursor releases the underlying store cursor, so every exit
/// path (completion, decode error, early return, dropped request) cleans up.
pub struct EntityCursor<E: Entity> {
    records: Option<RecordStream>,
    yielded: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityCursor<E> {
    /// Wrap a raw record stream.
    pub fn new(records: RecordStream) -> Self {
        Self {
            records: Some(records),
            yielded: 0,
            _entity: PhantomData,
        }
    }

    /// Next decoded entity, or `None` once exhausted.
    ///
    /// The first store or decode error closes the cursor.
    pub async fn next(&mut self) -> Option<QueryResult<E>> {
        let records = self.records.as_mut()?;
        let item = match records.next().await? {
            Ok(record) => E::from_document(record),
            Err(e) => Err(e),
        };
        match &item {
            Ok(_) => self.yielded += 1,
            Err(e) => {
                warn!(collection = %E::collection(), error = %e, "cursor failed");
                self.close();
            }
        }
        Some(item)
    }

    /// Drain the cursor into a vector, stopping at the first error.
    pub async fn collect_all(mut self) -> QueryResult<Vec<E>> {
        let mut entities = Vec::new();
        while let Some(item) = self.next().await {
            entities.push(item?);
        }
        self.close();
        Ok(entities)
    }

    /// Release the underlying cursor. Further calls to `next` yield `None`.
    pub fn close(&mut self) {
        if self.records.take().is_some() {
            debug!(collection = %E::collection(), yielded = self.yielded, "cursor closed");
        }
    }

    /// Whether the cursor has been closed.
    pub fn is_closed(&self) -> bool {
        self.records.is_none()
    }

    /// Entities yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }
}

impl<E: Entity> std::fmt::Debug for EntityCursor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCursor")
            .field("collection", &E::collection())
            .field("closed", &self.is_closed())
            .field("yielded", &self.yielded)
            .finish()
    }
}
