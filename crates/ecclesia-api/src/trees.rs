//! `GET /{table}/{id}/tree`: the nested selects behind the region and
//! district overviews. Only `regions` and `districts` have one.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use ecclesia_core::{
  store::DataService,
  table::{Row, Table},
};
use uuid::Uuid;

use crate::{error::ApiError, rows::table};

/// `GET /regions/{id}/tree` or `GET /districts/{id}/tree`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path((name, id)): Path<(String, Uuid)>,
) -> Result<Json<Row>, ApiError>
where
  S: DataService,
{
  let table = table(&name)?;
  let tree = match table {
    Table::Regions => store.region_tree(id).await,
    Table::Districts => store.district_tree(id).await,
    other => return Err(ApiError::NotFound(format!("{other} have no tree"))),
  }
  .map_err(ApiError::store::<S>)?
  .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", table.noun())))?;

  Ok(Json(tree))
}
