//! Typed records and their insert/update inputs.
//!
//! Rows leave the data service as untyped JSON maps; every entity has a
//! [`Record`] type they are decoded into exactly once, and a [`NewRecord`]
//! input type that is validated before anything is sent.

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{
  Error, Result,
  activity::NewPastoralActivity,
  asset::NewAsset,
  census::NewCensusRecord,
  member::NewMember,
  org::{NewCommunity, NewDistrict, NewParish, NewRegion},
  table::{Row, Table},
  worship::NewReligiousService,
};

/// A persisted entity decoded from a data-service row.
pub trait Record:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  const TABLE: Table;

  fn id(&self) -> Uuid;

  /// The owning entity's id (region for a district, parish for a member…).
  fn parent_id(&self) -> Option<Uuid>;

  fn from_row(row: Row) -> Result<Self> {
    serde_json::from_value(serde_json::Value::Object(row))
      .map_err(|source| Error::Decode { table: Self::TABLE, source })
  }
}

/// Input to an insert or a full-field update of a [`Record`].
pub trait NewRecord: Serialize + Send + Sync {
  type Record: Record;

  /// Boundary checks; a failure never reaches the data service.
  fn validate(&self) -> Result<()> { Ok(()) }

  /// The row sent to the data service.
  fn to_row(&self) -> Result<Row> {
    match serde_json::to_value(self)? {
      serde_json::Value::Object(row) => Ok(row),
      other => Err(Error::validation(format!(
        "{} input did not serialise to an object: {other}",
        Self::Record::TABLE.noun()
      ))),
    }
  }
}

/// Decode `row` as the insert input for `table`, run its checks, and return
/// the row as the typed input would have produced it.
///
/// Used by transports that accept raw rows (the JSON API) so that the same
/// boundary rules and derived columns apply whichever client submitted it.
pub fn validate_row(table: Table, row: &Row) -> Result<Row> {
  fn check<N: NewRecord + DeserializeOwned>(row: &Row) -> Result<Row> {
    let input: N = serde_json::from_value(serde_json::Value::Object(row.clone()))
      .map_err(|e| Error::validation(e.to_string()))?;
    input.validate()?;
    input.to_row()
  }

  match table {
    Table::Regions => check::<NewRegion>(row),
    Table::Districts => check::<NewDistrict>(row),
    Table::Parishes => check::<NewParish>(row),
    Table::Members => check::<NewMember>(row),
    Table::CensusRecords => check::<NewCensusRecord>(row),
    Table::Assets => check::<NewAsset>(row),
    Table::Services => check::<NewReligiousService>(row),
    Table::Activities => check::<NewPastoralActivity>(row),
    Table::Communities => check::<NewCommunity>(row),
  }
}

/// Columns the store fills or derives; a patch may not set them.
fn fixed_columns(table: Table) -> &'static [&'static str] {
  match table {
    Table::Members => &["id", "role"],
    _ => &["id"],
  }
}

/// Overlay `patch` on the stored `current` row and check the result as
/// [`validate_row`] checks an insert. The returned row is complete, so
/// derived columns are recomputed from the merged values.
pub fn validate_patch(table: Table, current: &Row, patch: &Row) -> Result<Row> {
  let mut merged = current.clone();
  for (column, value) in patch {
    if fixed_columns(table).contains(&column.as_str()) {
      return Err(Error::validation(format!("{table}.{column} cannot be set directly")));
    }
    if !current.contains_key(column) {
      return Err(Error::validation(format!("{table} has no column {column:?}")));
    }
    merged.insert(column.clone(), value.clone());
  }
  validate_row(table, &merged)
}

/// Shared "at least `min` visible characters" rule.
pub(crate) fn require_len(field: &str, value: &str, min: usize) -> Result<()> {
  if value.trim().chars().count() < min {
    let unit = if min == 1 { "character" } else { "characters" };
    return Err(Error::validation(format!(
      "{field} must contain at least {min} {unit}"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn row(value: serde_json::Value) -> Row {
    match value {
      serde_json::Value::Object(row) => row,
      _ => unreachable!(),
    }
  }

  #[test]
  fn raw_member_row_gains_its_derived_role() {
    let input = row(json!({
      "parish_id": Uuid::new_v4(),
      "last_name": "Kouamé",
      "first_names": "Marie",
      "membership_date": "2023-01-08",
      "ministries": ["Elder"],
    }));
    let stored = validate_row(Table::Members, &input).unwrap();
    assert_eq!(stored["role"], json!("Elder"));
  }

  fn stored_member() -> Row {
    let mut current = validate_row(Table::Members, &row(json!({
      "parish_id": Uuid::new_v4(),
      "last_name": "Kouamé",
      "first_names": "Marie",
      "membership_date": "2023-01-08",
      "ministries": ["Usher"],
    })))
    .unwrap();
    current.insert("id".into(), json!(Uuid::new_v4()));
    current
  }

  #[test]
  fn patched_ministries_rederive_the_role() {
    let current = stored_member();
    assert_eq!(current["role"], json!("Member"));

    let merged =
      validate_patch(Table::Members, &current, &row(json!({ "ministries": ["Elder"] }))).unwrap();
    assert_eq!(merged["role"], json!("Elder"));
    assert_eq!(merged["last_name"], json!("Kouamé"));
  }

  #[test]
  fn patch_cannot_set_role_id_or_unknown_columns() {
    let current = stored_member();
    for patch in [
      json!({ "role": "Bishop" }),
      json!({ "id": Uuid::new_v4() }),
      json!({ "nickname": "Mimi" }),
    ] {
      let err = validate_patch(Table::Members, &current, &row(patch.clone())).unwrap_err();
      assert!(matches!(err, Error::Validation(_)), "{patch}");
    }
  }

  #[test]
  fn patch_runs_insert_checks() {
    let current = stored_member();
    let err =
      validate_patch(Table::Members, &current, &row(json!({ "last_name": "K" }))).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }

  #[test]
  fn missing_required_field_is_a_validation_error() {
    let input = row(json!({ "name": "Daloa" }));
    let err = validate_row(Table::Regions, &input).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
  }
}
