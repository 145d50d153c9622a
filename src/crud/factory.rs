/**
 * Generic CRUD Handler Factory
 *
 * This module defines the `Resource` trait and a set of generic Axum
 * handlers parameterized over it. Each entity (tours, users, reviews)
 * implements `Resource` once and gets validated create/read/update/delete/
 * list endpoints with the shared response envelope for free.
 *
 * # Response Envelope
 *
 * ```json
 * { "status": "success", "data": { "tour": { ... } } }            // single
 * { "status": "success", "results": 2, "data": { "tours": [..] } } // list
 * ```
 *
 * # Side Effects
 *
 * Handlers only touch the target entity. Cross-entity effects (the review
 * → tour rating recomputation) live inside the entity's own `Resource`
 * implementation, so they run no matter which handler performs the write.
 */

use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::crud::query::{project_fields, Field, ListQuery};
use crate::error::ApiError;

/// An entity type served by the generic CRUD handlers
///
/// Implementations provide the table metadata, the filter/sort allow-list,
/// and the five storage operations. The generic handlers supply request
/// parsing, validation of the list grammar, and response shaping.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Singular name used in messages and single-record envelopes ("tour")
    const NAME: &'static str;

    /// Table (and collection envelope) name ("tours")
    const TABLE: &'static str;

    /// Columns that may appear in filters, sort keys, and projections
    const FIELDS: &'static [Field];

    /// The serialized record returned by reads
    type Record: Serialize + Send + Unpin + for<'r> FromRow<'r, PgRow>;

    /// Request body for `create_one`
    type Create: DeserializeOwned + Send + 'static;

    /// Request body for `update_one`
    type Update: DeserializeOwned + Send + 'static;

    /// Validate and persist a new record
    async fn insert(pool: &PgPool, input: Self::Create) -> Result<Self::Record, ApiError>;

    /// Fetch a record by id
    async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self::Record>, ApiError>;

    /// Partially update a record by id, re-running validation
    async fn update_by_id(
        pool: &PgPool,
        id: Uuid,
        input: Self::Update,
    ) -> Result<Option<Self::Record>, ApiError>;

    /// Delete a record by id; returns whether anything was deleted
    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool, ApiError>;

    /// List records for a validated query
    async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self::Record>, ApiError>;
}

/// Create a new record from the request body
///
/// Returns 201 with the created record in the envelope.
pub async fn create_one<R: Resource>(
    State(pool): State<PgPool>,
    Json(input): Json<R::Create>,
) -> Result<Response, ApiError> {
    let record = R::insert(&pool, input).await?;
    tracing::info!("Created {}", R::NAME);

    let body = json!({
        "status": "success",
        "data": { R::NAME: record },
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// Fetch a single record by id
pub async fn get_one<R: Resource>(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let record = R::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(R::NAME))?;

    Ok(Json(json!({
        "status": "success",
        "data": { R::NAME: record },
    })))
}

/// List records with filtering, sorting, projection, and pagination
///
/// The raw query-string pairs are parsed against the resource's allow-list
/// before any SQL is built; see `crud::query` for the grammar.
pub async fn get_all<R: Resource>(
    State(pool): State<PgPool>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::parse(&params, R::FIELDS)?;
    list_response::<R>(&pool, &query).await
}

/// Partially update a record by id
pub async fn update_one<R: Resource>(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(input): Json<R::Update>,
) -> Result<Json<Value>, ApiError> {
    let record = R::update_by_id(&pool, id, input)
        .await?
        .ok_or_else(|| ApiError::not_found(R::NAME))?;
    tracing::info!("Updated {} {}", R::NAME, id);

    Ok(Json(json!({
        "status": "success",
        "data": { R::NAME: record },
    })))
}

/// Delete a record by id, responding 204 with no content
pub async fn delete_one<R: Resource>(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !R::delete_by_id(&pool, id).await? {
        return Err(ApiError::not_found(R::NAME));
    }
    tracing::info!("Deleted {} {}", R::NAME, id);

    Ok(StatusCode::NO_CONTENT)
}

/// Run a validated list query and shape the collection envelope
///
/// Shared by `get_all` and the alias endpoints that build their query
/// programmatically (e.g. top-5-cheap).
pub async fn list_response<R: Resource>(
    pool: &PgPool,
    query: &ListQuery,
) -> Result<Json<Value>, ApiError> {
    let records = R::list(pool, query).await?;

    let mut values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!("Failed to serialize {} list: {:?}", R::TABLE, e);
            ApiError::internal("Failed to serialize response")
        })?;

    if let Some(fields) = &query.fields {
        project_fields(&mut values, fields);
    }

    Ok(Json(json!({
        "status": "success",
        "results": values.len(),
        "data": { R::TABLE: values },
    })))
}
