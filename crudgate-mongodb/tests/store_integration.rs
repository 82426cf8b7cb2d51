//! Integration tests against a live MongoDB deployment.
//!
//! Set `CRUDGATE_TEST_MONGODB_URI` to run them; without it every test
//! returns early.

use crudgate_mongodb::{MongoClient, MongoConfig, MongoStore, doc};
use crudgate_query::{CollectionName, DocumentStore, EntityDescriptor, FieldType, QueryOptions, QueryParams};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;

const PEOPLE: CollectionName = CollectionName::new("crudgate_test", "people");

async fn store() -> Option<MongoStore> {
    let uri = std::env::var("CRUDGATE_TEST_MONGODB_URI").ok()?;
    let config = MongoConfig::builder()
        .uri(uri)
        .database("crudgate_test")
        .build()
        .unwrap();
    let client = MongoClient::connect(config).await.unwrap();
    client
        .collection(PEOPLE)
        .delete_many(doc! {}, None)
        .await
        .unwrap();
    Some(MongoStore::new(client))
}

fn people() -> EntityDescriptor {
    EntityDescriptor::builder("Person")
        .field("name", "name", FieldType::Text)
        .field("age", "age", FieldType::Integer)
        .build()
}

#[tokio::test]
async fn test_crud_round_trip() {
    let Some(store) = store().await else { return };

    let key = store.insert(PEOPLE, doc! { "name": "Ada", "age": 36 }).await.unwrap();
    let found = store.find_by_key(PEOPLE, key).await.unwrap().unwrap();
    assert_eq!(found.get_str("name").unwrap(), "Ada");

    assert_eq!(
        store.replace(PEOPLE, key, doc! { "name": "Ada", "age": 37 }).await.unwrap(),
        1
    );
    assert_eq!(store.delete(PEOPLE, key).await.unwrap(), 1);
    assert_eq!(store.delete(PEOPLE, key).await.unwrap(), 0);
}

#[tokio::test]
async fn test_find_with_conjunction_sort_and_page() {
    let Some(store) = store().await else { return };

    for (name, age) in [("Ada", 36), ("Alan", 41), ("Grace", 85), ("Linus", 30)] {
        store.insert(PEOPLE, doc! { "name": name, "age": age }).await.unwrap();
    }

    let params = QueryParams::parse("age_gte=31&age_lte=90&age_ne=41&sort=-age&pageSize=1&page=2");
    let options = QueryOptions::compile_for(&params, &people()).unwrap();
    let records: Vec<_> = store
        .find(PEOPLE, &options)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let names: Vec<_> = records.iter().map(|d| d.get_str("name").unwrap()).collect();
    assert_eq!(names, vec!["Ada"]);
}
