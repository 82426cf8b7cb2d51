//! The capability every servable entity type implements.

use bson::Document;
use bson::oid::ObjectId;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::descriptor::EntityDescriptor;
use crate::error::QueryResult;

/// A record type that can be stored, looked up by key and filtered.
///
/// Wire encoding (JSON payloads) goes through serde; storage encoding goes
/// through [`to_document`](Entity::to_document) and
/// [`from_document`](Entity::from_document), so the two may differ (for
/// example `id` on the wire and `_id` in the store).
///
/// ```rust
/// use crudgate_query::descriptor::{EntityDescriptor, FieldType};
/// use crudgate_query::entity::{Entity, hex_key};
/// use crudgate_query::{Document, ObjectId, QueryResult, doc};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct Note {
///     #[serde(default, with = "hex_key", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     text: String,
/// }
///
/// impl Entity for Note {
///     const NAMESPACE: &'static str = "app";
///     const COLLECTION: &'static str = "notes";
///
///     fn descriptor() -> QueryResult<EntityDescriptor> {
///         Ok(EntityDescriptor::builder("Note")
///             .field("id", "_id", FieldType::Key)
///             .field("text", "text", FieldType::Text)
///             .build())
///     }
///
///     fn key(&self) -> Option<ObjectId> {
///         self.id
///     }
///
///     fn set_key(&mut self, key: ObjectId) {
///         self.id = Some(key);
///     }
///
///     fn to_document(&self) -> QueryResult<Document> {
///         Ok(doc! { "text": &self.text })
///     }
///
///     fn from_document(doc: Document) -> QueryResult<Self> {
///         Ok(Self {
///             id: doc.get_object_id("_id").ok(),
///             text: doc.get_str("text").unwrap_or_default().to_string(),
///         })
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    /// Database (namespace) holding the collection.
    const NAMESPACE: &'static str;
    /// Collection (item group) holding the records.
    const COLLECTION: &'static str;

    /// The filterable field table.
    fn descriptor() -> QueryResult<EntityDescriptor>;

    /// The record key, once assigned.
    fn key(&self) -> Option<ObjectId>;

    /// Assign the record key.
    fn set_key(&mut self, key: ObjectId);

    /// Encode for storage. The key is not part of the encoded document.
    fn to_document(&self) -> QueryResult<Document>;

    /// Decode a stored document, including its `_id`.
    fn from_document(doc: Document) -> QueryResult<Self>;

    /// Store location of this entity type.
    fn collection() -> CollectionName {
        CollectionName::new(Self::NAMESPACE, Self::COLLECTION)
    }
}

/// Namespace plus collection name addressing a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionName {
    /// Database (namespace).
    pub namespace: &'static str,
    /// Collection.
    pub collection: &'static str,
}

impl CollectionName {
    /// Create a collection name.
    pub const fn new(namespace: &'static str, collection: &'static str) -> Self {
        Self {
            namespace,
            collection,
        }
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.collection)
    }
}

/// Serde helpers for an optional [`ObjectId`] carried as a 24-hex string.
///
/// Use with `#[serde(default, with = "hex_key")]`.
pub mod hex_key {
    use bson::oid::ObjectId;
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serialize as a hex string, or `null` when absent.
    pub fn serialize<S: Serializer>(key: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error> {
        match key {
            Some(oid) => serializer.serialize_str(&oid.to_hex()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize from a hex string or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ObjectId>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|hex| ObjectId::parse_str(&hex).map_err(de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Keyed {
        #[serde(default, with = "hex_key", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
    }

    #[test]
    fn test_hex_key_json() {
        let oid = ObjectId::parse_str("65a1b2c3d4e5f60718293a4b").unwrap();
        let json = serde_json::to_string(&Keyed { id: Some(oid) }).unwrap();
        assert_eq!(json, r#"{"id":"65a1b2c3d4e5f60718293a4b"}"#);

        let back: Keyed = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, Some(oid));

        let missing: Keyed = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.id, None);

        assert!(serde_json::from_str::<Keyed>(r#"{"id":"zz"}"#).is_err());
    }

    #[test]
    fn test_collection_name_display() {
        assert_eq!(CollectionName::new("core", "users").to_string(), "core.users");
    }
}
