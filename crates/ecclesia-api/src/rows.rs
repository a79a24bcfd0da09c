//! Handlers for the flat table endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{table}` | Query params are equality filters; `order=<column>` and `lineage=true` are reserved |
//! | `POST`   | `/{table}` | Body: a row; validated, returns 201 + stored row |
//! | `GET`    | `/{table}/{id}` | Optional `?lineage=true`; 404 if not found |
//! | `PATCH`  | `/{table}/{id}` | Body: the columns to overwrite; the merged row is validated like a POST |
//! | `DELETE` | `/{table}/{id}` | 204; 409 while the row still has children |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use ecclesia_core::{
  record::{validate_patch, validate_row},
  store::DataService,
  table::{self, Row, Table},
};
use uuid::Uuid;

use crate::error::ApiError;

/// Parse the `{table}` path segment.
pub(crate) fn table(name: &str) -> Result<Table, ApiError> {
  name
    .parse()
    .map_err(|_| ApiError::NotFound(format!("no table named {name:?}")))
}

fn flag(value: Option<&String>) -> Result<bool, ApiError> {
  match value.map(String::as_str) {
    None | Some("false") => Ok(false),
    Some("true") => Ok(true),
    Some(other) => Err(ApiError::BadRequest(format!("expected true or false, got {other:?}"))),
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /{table}[?column=value...][&order=column][&lineage=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(name): Path<String>,
  Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Row>>, ApiError>
where
  S: DataService,
{
  let table = table(&name)?;
  let lineage = flag(params.remove("lineage").as_ref())?;
  let order_by = params.remove("order");

  let query = table::Query { eq: params, order_by, lineage };
  let rows = store
    .select(table, &query)
    .await
    .map_err(ApiError::store::<S>)?;
  Ok(Json(rows))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /{table}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(name): Path<String>,
  Json(row): Json<Row>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DataService,
{
  let table = table(&name)?;
  let row = validate_row(table, &row).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let stored = store
    .insert(table, row)
    .await
    .map_err(ApiError::store::<S>)?;
  Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct GetParams {
  #[serde(default)]
  pub lineage: bool,
}

/// `GET /{table}/{id}[?lineage=true]`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path((name, id)): Path<(String, Uuid)>,
  Query(params): Query<GetParams>,
) -> Result<Json<Row>, ApiError>
where
  S: DataService,
{
  let table = table(&name)?;
  let mut query = table::Query::by_id(id);
  query.lineage = params.lineage;

  let row = store
    .select(table, &query)
    .await
    .map_err(ApiError::store::<S>)?
    .into_iter()
    .next()
    .ok_or_else(|| ApiError::NotFound(format!("{table} {id} not found")))?;
  Ok(Json(row))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /{table}/{id}`
pub async fn patch_one<S>(
  State(store): State<Arc<S>>,
  Path((name, id)): Path<(String, Uuid)>,
  Json(patch): Json<Row>,
) -> Result<Json<Row>, ApiError>
where
  S: DataService,
{
  let table = table(&name)?;
  let current = store
    .select(table, &table::Query::by_id(id))
    .await
    .map_err(ApiError::store::<S>)?
    .into_iter()
    .next()
    .ok_or_else(|| ApiError::NotFound(format!("{table} {id} not found")))?;
  let row = validate_patch(table, &current, &patch)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let row = store
    .update(table, id, row)
    .await
    .map_err(ApiError::store::<S>)?;
  Ok(Json(row))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /{table}/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path((name, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: DataService,
{
  let table = table(&name)?;
  store
    .delete(table, id)
    .await
    .map_err(ApiError::store::<S>)?;
  Ok(StatusCode::NO_CONTENT)
}
