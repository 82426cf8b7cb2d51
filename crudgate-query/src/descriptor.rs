//! Entity descriptors: the per-type table of filterable fields.
//!
//! A descriptor maps each field's wire name (as it appears in query strings
//! and JSON payloads) to its storage name (as the document store knows it)
//! and its declared value type. Descriptors are built once per entity type,
//! usually at startup, and shared read-only across requests.
//!
//! ```rust
//! use crudgate_query::descriptor::{EntityDescriptor, FieldType};
//!
//! let users = EntityDescriptor::builder("User")
//!     .field("id", "_id", FieldType::Key)
//!     .field("username", "username", FieldType::Text)
//!     .field("birthdate,omitempty", "birthdate", FieldType::DateTime)
//!     .field("internal", "", FieldType::Text) // no storage name: not filterable
//!     .build();
//!
//! assert_eq!(users.len(), 3);
//! assert_eq!(users.storage_name("id"), Some("_id"));
//! assert!(users.field("internal").is_none());
//! ```

use serde::Serialize;
use smol_str::SmolStr;
use tracing::trace;

use crate::error::{QueryError, QueryResult};

/// Declared value type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// Raw string, passed through unchanged.
    #[default]
    Text,
    /// Base-10 signed integer.
    Integer,
    /// Base-10 floating point number.
    Float,
    /// RFC 3339 date-time.
    DateTime,
    /// Object identifier (24 hex characters).
    Key,
}

impl FieldType {
    fn from_bson(value: &bson::Bson) -> Self {
        use bson::Bson;

        match value {
            Bson::DateTime(_) => Self::DateTime,
            Bson::Double(_) => Self::Float,
            Bson::Int32(_) | Bson::Int64(_) => Self::Integer,
            Bson::ObjectId(_) => Self::Key,
            _ => Self::Text,
        }
    }
}

/// One filterable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    wire_name: SmolStr,
    storage_name: SmolStr,
    field_type: FieldType,
}

impl FieldDescriptor {
    /// Create a field descriptor.
    pub fn new(
        wire_name: impl Into<SmolStr>,
        storage_name: impl Into<SmolStr>,
        field_type: FieldType,
    ) -> Self {
        Self {
            wire_name: wire_name.into(),
            storage_name: storage_name.into(),
            field_type,
        }
    }

    /// Name used in query strings and payloads.
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Name used in store filters.
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    /// Declared value type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// Ordered table of an entity's filterable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: SmolStr,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    /// Start building a descriptor for the named entity.
    pub fn builder(name: impl Into<SmolStr>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Derive a descriptor from a sample value's serialized shape.
    ///
    /// Every top-level key becomes a field whose wire and storage names are
    /// the key itself and whose type follows the serialized value. Fails with
    /// `NotAStruct` when the value does not serialize to a document.
    pub fn infer<T: Serialize>(name: impl Into<SmolStr>, sample: &T) -> QueryResult<Self> {
        let name = name.into();
        let bson::Bson::Document(doc) = bson::to_bson(sample)? else {
            return Err(QueryError::not_a_struct(name.as_str()));
        };

        let mut builder = Self::builder(name);
        for (key, value) in &doc {
            builder = builder.field(key.as_str(), key.as_str(), FieldType::from_bson(value));
        }
        Ok(builder.build())
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filterable fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of filterable fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entity has no filterable fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by wire name.
    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.wire_name == wire_name)
    }

    /// Storage name for a wire name.
    pub fn storage_name(&self, wire_name: &str) -> Option<&str> {
        self.field(wire_name).map(FieldDescriptor::storage_name)
    }

    /// Find the field a query parameter targets.
    ///
    /// A parameter targets a field when it equals the wire name or starts
    /// with the wire name followed by `_`. The longest matching wire name
    /// wins, so `name_first_eq` targets `name_first` rather than `name`.
    /// Returns the field and the operator suffix, if any.
    pub fn match_param<'p>(&self, param: &'p str) -> Option<(&FieldDescriptor, Option<&'p str>)> {
        self.fields
            .iter()
            .filter_map(|field| {
                let wire = field.wire_name();
                if param == wire {
                    return Some((field, None));
                }
                param
                    .strip_prefix(wire)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|suffix| (field, Some(suffix)))
            })
            .max_by_key(|(field, _)| field.wire_name.len())
    }
}

/// Builder for [`EntityDescriptor`].
#[derive(Debug, Clone)]
pub struct EntityDescriptorBuilder {
    name: SmolStr,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptorBuilder {
    /// Add a field.
    ///
    /// Names are read like struct tags: only the part before the first `,`
    /// counts. A field missing either name is skipped.
    pub fn field(mut self, wire: &str, storage: &str, field_type: FieldType) -> Self {
        let wire = tag_name(wire);
        let storage = tag_name(storage);
        if wire.is_empty() || storage.is_empty() {
            trace!(entity = %self.name, wire, storage, "skipping untagged field");
            return self;
        }
        self.fields.push(FieldDescriptor::new(wire, storage, field_type));
        self
    }

    /// Build the descriptor.
    pub fn build(self) -> EntityDescriptor {
        EntityDescriptor {
            name: self.name,
            fields: self.fields,
        }
    }
}

fn tag_name(tag: &str) -> &str {
    tag.split(',').next().unwrap_or_default().trim()
}
