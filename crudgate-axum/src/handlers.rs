//! Generic CRUD handlers.
//!
//! Every handler works for any [`Entity`]; the resource state carries the
//! typed repository.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, RawQuery, State};
use crudgate_query::{Entity, ObjectId, QueryError, QueryParams};
use http::StatusCode;
use serde_json::{Value as JsonValue, json};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::routes::Resource;

/// Parse a path key, rejecting anything that is not a 24-hex object id.
pub fn parse_key(raw: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::from(QueryError::invalid_key(raw)))
}

/// `POST /`: insert the body and return it with its generated key.
pub async fn create<E: Entity>(
    State(resource): State<Resource<E>>,
    payload: Result<Json<E>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<E>)> {
    let Json(mut entity) = payload?;
    resource.repository().create(&mut entity).await?;
    Ok((StatusCode::CREATED, Json(entity)))
}

/// `GET /{id}`: fetch one entity.
pub async fn read<E: Entity>(
    State(resource): State<Resource<E>>,
    Path(id): Path<String>,
) -> ApiResult<Json<E>> {
    let key = parse_key(&id)?;
    let entity = resource.repository().read(key).await?;
    Ok(Json(entity))
}

/// `GET /`: list entities matching the query string.
///
/// The whole cursor is drained into the response; a record that fails to
/// decode aborts the request with a 500.
pub async fn read_by_filter<E: Entity>(
    State(resource): State<Resource<E>>,
    RawQuery(query): RawQuery,
) -> ApiResult<Json<Vec<E>>> {
    let params = QueryParams::parse(query.as_deref().unwrap_or_default());
    let entities = resource.repository().query(&params).await?.collect_all().await?;
    debug!(resource = resource.name(), count = entities.len(), "listed records");
    Ok(Json(entities))
}

/// `PUT /{id}`: replace an entity with the body.
pub async fn update<E: Entity>(
    State(resource): State<Resource<E>>,
    Path(id): Path<String>,
    payload: Result<Json<E>, JsonRejection>,
) -> ApiResult<Json<E>> {
    let key = parse_key(&id)?;
    let Json(mut entity) = payload?;
    resource.repository().update(key, &mut entity).await?;
    Ok(Json(entity))
}

/// `DELETE /{id}`: delete an entity.
pub async fn delete<E: Entity>(
    State(resource): State<Resource<E>>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<JsonValue>)> {
    let key = parse_key(&id)?;
    let deleted = resource.repository().delete(key).await?;
    Ok(deletion_response(deleted))
}

/// Response body for a delete that removed `deleted` records.
pub fn deletion_response(deleted: u64) -> (StatusCode, Json<JsonValue>) {
    match deleted {
        0 => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No entity found to delete" })),
        ),
        1 => (StatusCode::OK, Json(json!({ "message": "Deleted 1 entry" }))),
        n => (
            StatusCode::OK,
            Json(json!({ "message": format!("Deleted {n} entries") })),
        ),
    }
}
