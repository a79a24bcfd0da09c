//! Conversion between JSON row values and SQLite column values.
//!
//! Text, integer and real columns hold their JSON scalar directly; JSON
//! columns hold the compact text encoding. UUIDs and dates are already
//! strings on the JSON side and are stored as such.

use ecclesia_core::table::Table;
use rusqlite::types::Value as Sql;
use serde_json::Value as Json;

use crate::{Error, Result, schema::Kind};

fn bad(table: Table, column: &str, reason: impl Into<String>) -> Error {
  Error::Column { table, column: column.to_owned(), reason: reason.into() }
}

/// Encode a JSON value for `table.column`.
pub fn to_sql(table: Table, column: &str, kind: Kind, value: &Json) -> Result<Sql> {
  Ok(match (kind, value) {
    (Kind::Json, Json::Null) => Sql::Text("[]".to_owned()),
    (Kind::Json, other) => Sql::Text(other.to_string()),
    (_, Json::Null) => Sql::Null,

    (Kind::Text, Json::String(s)) => Sql::Text(s.clone()),
    (Kind::Text, Json::Number(n)) => Sql::Text(n.to_string()),
    (Kind::Text, Json::Bool(b)) => Sql::Text(b.to_string()),

    (Kind::Integer, Json::Number(n)) => Sql::Integer(
      n.as_i64()
        .ok_or_else(|| bad(table, column, format!("{n} is not an integer")))?,
    ),
    (Kind::Integer, Json::String(s)) => Sql::Integer(
      s.trim()
        .parse()
        .map_err(|_| bad(table, column, format!("{s:?} is not an integer")))?,
    ),

    (Kind::Real, Json::Number(n)) => Sql::Real(
      n.as_f64()
        .ok_or_else(|| bad(table, column, format!("{n} is not a number")))?,
    ),
    (Kind::Real, Json::String(s)) => Sql::Real(
      s.trim()
        .parse()
        .map_err(|_| bad(table, column, format!("{s:?} is not a number")))?,
    ),

    (_, other) => return Err(bad(table, column, format!("unexpected {other}"))),
  })
}

/// Decode a stored value back to JSON.
pub fn from_sql(table: Table, column: &str, kind: Kind, value: Sql) -> Result<Json> {
  Ok(match (kind, value) {
    (_, Sql::Null) => Json::Null,
    (Kind::Json, Sql::Text(text)) => serde_json::from_str(&text)?,
    (_, Sql::Text(text)) => Json::String(text),
    (_, Sql::Integer(i)) => Json::from(i),
    (_, Sql::Real(f)) => serde_json::Number::from_f64(f)
      .map(Json::Number)
      .unwrap_or(Json::Null),
    (_, Sql::Blob(_)) => return Err(bad(table, column, "unexpected blob")),
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn integers_accept_numeric_strings() {
    let v = to_sql(Table::CensusRecords, "head_count", Kind::Integer, &json!("42")).unwrap();
    assert_eq!(v, Sql::Integer(42));
    assert!(to_sql(Table::CensusRecords, "head_count", Kind::Integer, &json!(4.5)).is_err());
  }

  #[test]
  fn json_columns_store_text() {
    let v = to_sql(Table::Members, "ministries", Kind::Json, &json!(["Elder"])).unwrap();
    assert_eq!(v, Sql::Text("[\"Elder\"]".into()));
    let back = from_sql(Table::Members, "ministries", Kind::Json, v).unwrap();
    assert_eq!(back, json!(["Elder"]));
  }

  #[test]
  fn objects_are_rejected_for_scalar_columns() {
    let err = to_sql(Table::Regions, "name", Kind::Text, &json!({"a": 1})).unwrap_err();
    assert!(matches!(err, Error::Column { .. }));
  }
}
