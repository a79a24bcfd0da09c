//! Table names, untyped rows, and the filtered-select query shape exchanged
//! with a [`DataService`](crate::store::DataService).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row as it crosses the data-service boundary: column name → JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

// ─── Table ───────────────────────────────────────────────────────────────────

/// Every table the back office reads or writes.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
  Regions,
  Districts,
  Parishes,
  Members,
  CensusRecords,
  Assets,
  Services,
  Activities,
  Communities,
}

impl Table {
  /// The parent table and the foreign-key column pointing at it.
  /// `None` for the top of the hierarchy.
  pub fn parent(self) -> Option<(Table, &'static str)> {
    match self {
      Self::Regions => None,
      Self::Districts => Some((Self::Regions, "region_id")),
      Self::Parishes => Some((Self::Districts, "district_id")),
      Self::Members
      | Self::CensusRecords
      | Self::Assets
      | Self::Services
      | Self::Activities
      | Self::Communities => Some((Self::Parishes, "parish_id")),
    }
  }

  /// Foreign-key column of this table, if it has a parent.
  pub fn parent_column(self) -> Option<&'static str> {
    self.parent().map(|(_, column)| column)
  }

  /// Whether rows in this table feed the member roll-ups of the
  /// region/district trees.
  pub fn feeds_trees(self) -> bool {
    matches!(
      self,
      Self::Regions | Self::Districts | Self::Parishes | Self::Members
    )
  }

  /// Singular human label, used in notifications.
  pub fn noun(self) -> &'static str {
    match self {
      Self::Regions => "region",
      Self::Districts => "district",
      Self::Parishes => "parish",
      Self::Members => "member",
      Self::CensusRecords => "census record",
      Self::Assets => "asset",
      Self::Services => "religious service",
      Self::Activities => "pastoral activity",
      Self::Communities => "community",
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`DataService::select`](crate::store::DataService::select).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
  /// Equality filters, column → value. All must match.
  #[serde(default)]
  pub eq:       BTreeMap<String, String>,
  /// Column to sort ascending by. Rows come back in insertion order when
  /// unset.
  pub order_by: Option<String>,
  /// Join one level of parent naming data onto each row (`region_name` on
  /// districts; `district_name` and `region_name` on parishes).
  #[serde(default)]
  pub lineage:  bool,
}

impl Query {
  /// Every row of the table.
  pub fn all() -> Self { Self::default() }

  /// Rows whose `table` foreign key equals `parent_id`. For a table without
  /// a parent this is the same as [`Query::all`].
  pub fn children_of(table: Table, parent_id: Uuid) -> Self {
    match table.parent_column() {
      Some(column) => Self::all().eq(column, parent_id.to_string()),
      None => Self::all(),
    }
  }

  /// The single row with primary key `id`.
  pub fn by_id(id: Uuid) -> Self { Self::all().eq("id", id.to_string()) }

  pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
    self.eq.insert(column.into(), value.into());
    self
  }

  pub fn order_by(mut self, column: impl Into<String>) -> Self {
    self.order_by = Some(column.into());
    self
  }

  pub fn with_lineage(mut self) -> Self {
    self.lineage = true;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_names_round_trip_through_strum() {
    assert_eq!(Table::CensusRecords.as_ref(), "census_records");
    assert_eq!("parishes".parse::<Table>().unwrap(), Table::Parishes);
    assert!("sacraments".parse::<Table>().is_err());
  }

  #[test]
  fn children_of_uses_foreign_key_column() {
    let parish = Uuid::new_v4();
    let q = Query::children_of(Table::Members, parish);
    assert_eq!(q.eq.get("parish_id"), Some(&parish.to_string()));

    let top = Query::children_of(Table::Regions, parish);
    assert!(top.eq.is_empty());
  }
}
