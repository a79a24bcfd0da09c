//! [`SqliteStore`]: the SQLite implementation of [`DataService`].

use std::path::Path;

use ecclesia_core::{
  store::{DataService, Failure},
  table::{Query, Row, Table},
};
use rusqlite::types::Value as Sql;
use serde_json::Value as Json;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{from_sql, to_sql},
  schema::{Column, Kind, SCHEMA, column, columns},
};

// ─── Statements ──────────────────────────────────────────────────────────────

/// A prepared-to-run select: SQL text, positional parameters, and the
/// name and kind of each output column.
struct Select {
  sql:    String,
  params: Vec<String>,
  out:    Vec<Column>,
}

fn known(table: Table, name: &str) -> Result<Column> {
  column(table, name).ok_or_else(|| Error::UnknownColumn {
    table,
    column: name.to_owned(),
  })
}

fn field_list(table: Table) -> Vec<String> {
  columns(table).iter().map(|(name, _)| format!("t.{name}")).collect()
}

fn order_clause(table: Table, order_by: Option<&str>) -> Result<String> {
  Ok(match order_by {
    Some(name) => match known(table, name)? {
      (name, Kind::Text) => format!("t.{name} COLLATE NOCASE, t.rowid"),
      (name, _) => format!("t.{name}, t.rowid"),
    },
    None => "t.rowid".to_owned(),
  })
}

fn build_select(table: Table, query: &Query) -> Result<Select> {
  let mut fields = field_list(table);
  let mut out = columns(table).to_vec();
  let mut joins = "";

  if query.lineage {
    match table {
      Table::Districts => {
        joins = "LEFT JOIN regions r ON r.id = t.region_id";
        fields.push("r.name".to_owned());
        out.push(("region_name", Kind::Text));
      }
      Table::Parishes => {
        joins = "LEFT JOIN districts d ON d.id = t.district_id
                 LEFT JOIN regions r ON r.id = d.region_id";
        fields.extend(["d.name".to_owned(), "r.name".to_owned()]);
        out.extend([("district_name", Kind::Text), ("region_name", Kind::Text)]);
      }
      _ => {}
    }
  }

  let mut conds = Vec::new();
  let mut params = Vec::new();
  for (name, value) in &query.eq {
    let (name, _) = known(table, name)?;
    params.push(value.clone());
    conds.push(format!("t.{name} = ?{}", params.len()));
  }
  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  let order = order_clause(table, query.order_by.as_deref())?;
  let sql = format!(
    "SELECT {} FROM {table} t {joins} {where_clause} ORDER BY {order}",
    fields.join(", ")
  );
  Ok(Select { sql, params, out })
}

/// Parishes of a district, each with the number of its members.
fn parish_nodes_select(district_id: Uuid) -> Select {
  let mut out = columns(Table::Parishes).to_vec();
  out.push(("member_count", Kind::Integer));
  let sql = format!(
    "SELECT {}, COUNT(m.id)
     FROM parishes t
     LEFT JOIN members m ON m.parish_id = t.id
     WHERE t.district_id = ?1
     GROUP BY t.id
     ORDER BY t.name COLLATE NOCASE, t.rowid",
    field_list(Table::Parishes).join(", ")
  );
  Select { sql, params: vec![district_id.to_string()], out }
}

fn decode_row(table: Table, out: &[Column], values: Vec<Sql>) -> Result<Row> {
  out
    .iter()
    .zip(values)
    .map(|(&(name, kind), value)| Ok((name.to_owned(), from_sql(table, name, kind, value)?)))
    .collect()
}

/// Encode every entry of `row` except `id` as `(column, value)`.
fn encode_fields(table: Table, row: &Row) -> Result<Vec<(&'static str, Sql)>> {
  row
    .iter()
    .filter(|(key, _)| key.as_str() != "id")
    .map(|(key, value)| {
      let (name, kind) = known(table, key)?;
      Ok((name, to_sql(table, name, kind, value)?))
    })
    .collect()
}

fn row_id(table: Table, row: &Row) -> Result<Uuid> {
  match row.get("id") {
    None | Some(Json::Null) => Ok(Uuid::new_v4()),
    Some(Json::String(s)) => s.parse().map_err(|e: uuid::Error| Error::Column {
      table,
      column: "id".to_owned(),
      reason: e.to_string(),
    }),
    Some(other) => Err(Error::Column {
      table,
      column: "id".to_owned(),
      reason: format!("unexpected {other}"),
    }),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The back-office tables in a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn run_select(&self, table: Table, select: Select) -> Result<Vec<Row>> {
    let Select { sql, params, out } = select;
    let width = out.len();

    let raw: Vec<Vec<Sql>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            (0..width)
              .map(|i| row.get::<_, Sql>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw
      .into_iter()
      .map(|values| decode_row(table, &out, values))
      .collect()
  }

  async fn get_row(&self, table: Table, id: Uuid, lineage: bool) -> Result<Option<Row>> {
    let mut query = Query::by_id(id);
    query.lineage = lineage;
    let select = build_select(table, &query)?;
    Ok(self.run_select(table, select).await?.into_iter().next())
  }

  async fn execute(&self, sql: String, params: Vec<Sql>) -> Result<usize> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?))
      .await?;
    Ok(changed)
  }

  async fn district_node(&self, mut district: Row, id: Uuid) -> Result<Row> {
    let parishes = self
      .run_select(Table::Parishes, parish_nodes_select(id))
      .await?;
    district.insert(
      "parishes".to_owned(),
      Json::Array(parishes.into_iter().map(Json::Object).collect()),
    );
    Ok(district)
  }
}

// ─── DataService impl ────────────────────────────────────────────────────────

impl DataService for SqliteStore {
  type Error = Error;

  fn failure(err: &Error) -> Failure {
    match err {
      Error::NotFound { .. } => Failure::NotFound,
      Error::UnknownColumn { .. } | Error::Column { .. } => Failure::Invalid,
      Error::Constraint(_) => Failure::Conflict,
      Error::Database(_) | Error::Json(_) => Failure::Internal,
    }
  }

  async fn select(&self, table: Table, query: &Query) -> Result<Vec<Row>> {
    let select = build_select(table, query)?;
    self.run_select(table, select).await
  }

  async fn insert(&self, table: Table, row: Row) -> Result<Row> {
    let id = row_id(table, &row)?;
    let fields = encode_fields(table, &row)?;

    let mut names = vec!["id"];
    let mut values = vec![Sql::Text(id.to_string())];
    for (name, value) in fields {
      names.push(name);
      values.push(value);
    }
    let placeholders: Vec<_> = (1..=values.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "INSERT INTO {table} ({}) VALUES ({})",
      names.join(", "),
      placeholders.join(", ")
    );

    self.execute(sql, values).await?;
    tracing::debug!(%table, %id, "inserted");
    self
      .get_row(table, id, false)
      .await?
      .ok_or(Error::NotFound { table, id })
  }

  async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row> {
    let fields = encode_fields(table, &patch)?;
    if !fields.is_empty() {
      let mut sets = Vec::new();
      let mut values = Vec::new();
      for (name, value) in fields {
        values.push(value);
        sets.push(format!("{name} = ?{}", values.len()));
      }
      values.push(Sql::Text(id.to_string()));
      let sql = format!(
        "UPDATE {table} SET {} WHERE id = ?{}",
        sets.join(", "),
        values.len()
      );
      if self.execute(sql, values).await? == 0 {
        return Err(Error::NotFound { table, id });
      }
      tracing::debug!(%table, %id, "updated");
    }
    self
      .get_row(table, id, false)
      .await?
      .ok_or(Error::NotFound { table, id })
  }

  async fn delete(&self, table: Table, id: Uuid) -> Result<()> {
    let sql = format!("DELETE FROM {table} WHERE id = ?1");
    if self.execute(sql, vec![Sql::Text(id.to_string())]).await? == 0 {
      return Err(Error::NotFound { table, id });
    }
    tracing::debug!(%table, %id, "deleted");
    Ok(())
  }

  async fn region_tree(&self, region_id: Uuid) -> Result<Option<Row>> {
    let Some(mut region) = self.get_row(Table::Regions, region_id, false).await? else {
      return Ok(None);
    };

    let query = Query::children_of(Table::Districts, region_id).order_by("name");
    let districts = self.select(Table::Districts, &query).await?;
    let mut nodes = Vec::with_capacity(districts.len());
    for district in districts {
      let id = row_id(Table::Districts, &district)?;
      nodes.push(Json::Object(self.district_node(district, id).await?));
    }

    region.insert("districts".to_owned(), Json::Array(nodes));
    Ok(Some(region))
  }

  async fn district_tree(&self, district_id: Uuid) -> Result<Option<Row>> {
    match self.get_row(Table::Districts, district_id, true).await? {
      Some(district) => Ok(Some(self.district_node(district, district_id).await?)),
      None => Ok(None),
    }
  }
}
