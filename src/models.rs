//! Entities served by the gateway.

use chrono::{DateTime, Utc};
use crudgate_query::entity::hex_key;
use crudgate_query::{
    Bson, Document, Entity, EntityDescriptor, FieldType, ObjectId, QueryError, QueryResult, doc,
};
use serde::{Deserialize, Serialize};

/// A user account, stored in `core.users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Record key, a 24-hex string on the wire.
    #[serde(default, with = "hex_key", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Date of birth.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<DateTime<Utc>>,
}

impl User {
    /// Create a user without a key or birthdate.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            birthdate: None,
        }
    }

    /// Set the birthdate.
    pub fn born(mut self, birthdate: DateTime<Utc>) -> Self {
        self.birthdate = Some(birthdate);
        self
    }
}

impl Entity for User {
    const NAMESPACE: &'static str = "core";
    const COLLECTION: &'static str = "users";

    fn descriptor() -> QueryResult<EntityDescriptor> {
        Ok(EntityDescriptor::builder("User")
            .field("id", "_id", FieldType::Key)
            .field("username", "username", FieldType::Text)
            .field("email", "email", FieldType::Text)
            .field("birthdate", "birthdate", FieldType::DateTime)
            .build())
    }

    fn key(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_key(&mut self, key: ObjectId) {
        self.id = Some(key);
    }

    fn to_document(&self) -> QueryResult<Document> {
        let mut record = doc! {
            "username": &self.username,
            "email": &self.email,
        };
        if let Some(birthdate) = self.birthdate {
            record.insert("birthdate", bson::DateTime::from_chrono(birthdate));
        }
        Ok(record)
    }

    fn from_document(record: Document) -> QueryResult<Self> {
        let invalid = |e: bson::document::ValueAccessError| {
            QueryError::deserialization(format!("invalid user record: {e}"))
        };
        let birthdate = match record.get("birthdate") {
            None | Some(Bson::Null) => None,
            Some(Bson::DateTime(at)) => Some(at.to_chrono()),
            Some(other) => {
                return Err(QueryError::deserialization(format!(
                    "invalid user record: birthdate is {:?}",
                    other.element_type()
                )));
            }
        };
        Ok(Self {
            id: record.get_object_id("_id").ok(),
            username: record.get_str("username").map_err(invalid)?.to_string(),
            email: record.get_str("email").map_err(invalid)?.to_string(),
            birthdate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_round_trip_keeps_key_out() {
        let mut user = User::new("ada", "ada@example.com")
            .born(Utc.with_ymd_and_hms(1815, 12, 10, 0, 0, 0).unwrap());
        let key = ObjectId::new();
        user.set_key(key);

        let mut record = user.to_document().unwrap();
        assert!(!record.contains_key("_id"));
        record.insert("_id", key);
        assert_eq!(User::from_document(record).unwrap(), user);
    }

    #[test]
    fn test_missing_birthdate() {
        let user = User::from_document(doc! { "username": "linus", "email": "l@example.com" }).unwrap();
        assert_eq!(user.birthdate, None);
        assert_eq!(user.id, None);
    }

    #[test]
    fn test_bad_record() {
        let err = User::from_document(doc! { "username": "x", "email": 3 }).unwrap_err();
        assert_eq!(err.code, crudgate_query::ErrorCode::DeserializationError);

        let err = User::from_document(doc! { "username": "x", "email": "e", "birthdate": "soon" })
            .unwrap_err();
        assert_eq!(err.code, crudgate_query::ErrorCode::DeserializationError);
    }

    #[test]
    fn test_json_shape() {
        let key = ObjectId::parse_str("65a1b2c3d4e5f6a7b8c9d0e1").unwrap();
        let mut user = User::new("grace", "grace@example.com");
        user.set_key(key);
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({
                "id": "65a1b2c3d4e5f6a7b8c9d0e1",
                "username": "grace",
                "email": "grace@example.com",
            })
        );
    }

    #[test]
    fn test_descriptor() {
        let descriptor = User::descriptor().unwrap();
        assert_eq!(descriptor.fields().len(), 4);
        assert_eq!(User::collection().to_string(), "core.users");
    }
}
