//! In-memory collaborators for unit tests.

use std::{
  collections::HashMap,
  future::{Future, ready},
  sync::{
    Mutex, MutexGuard,
    atomic::{AtomicUsize, Ordering},
  },
};

use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  notify::{NoticeKind, Notifier},
  store::DataService,
  table::{Query, Row, Table},
};

// ─── Notifier ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingNotifier {
  notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
  pub fn notices(&self) -> Vec<(NoticeKind, String)> {
    self.notices.lock().unwrap().clone()
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, kind: NoticeKind, message: &str) {
    self.notices.lock().unwrap().push((kind, message.to_owned()));
  }
}

// ─── Data service ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(String);

type Tables = HashMap<Table, Vec<Row>>;

/// A `DataService` over plain vectors, with the foreign-key and lineage
/// behaviour of the real store and an injectable failure.
#[derive(Debug, Default)]
pub struct MemoryService {
  tables: Mutex<Tables>,
  fail:   Mutex<Option<String>>,
  calls:  AtomicUsize,
}

fn text(value: Option<&Value>) -> String {
  match value {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Null) | None => String::new(),
    Some(other) => other.to_string(),
  }
}

fn rows(tables: &Tables, table: Table) -> impl Iterator<Item = &Row> {
  tables.get(&table).into_iter().flatten()
}

fn find<'t>(tables: &'t Tables, table: Table, id: &str) -> Option<&'t Row> {
  rows(tables, table).find(|row| text(row.get("id")) == id)
}

fn name_of(tables: &Tables, table: Table, id: &str) -> Value {
  find(tables, table, id)
    .and_then(|row| row.get("name").cloned())
    .unwrap_or(Value::Null)
}

fn with_lineage(tables: &Tables, table: Table, row: &Row) -> Row {
  let mut row = row.clone();
  match table {
    Table::Districts => {
      let region = name_of(tables, Table::Regions, &text(row.get("region_id")));
      row.insert("region_name".into(), region);
    }
    Table::Parishes => {
      let district_id = text(row.get("district_id"));
      let region_id = find(tables, Table::Districts, &district_id)
        .map(|d| text(d.get("region_id")))
        .unwrap_or_default();
      row.insert("district_name".into(), name_of(tables, Table::Districts, &district_id));
      row.insert("region_name".into(), name_of(tables, Table::Regions, &region_id));
    }
    _ => {}
  }
  row
}

fn district_node(tables: &Tables, district: &Row) -> Row {
  let id = text(district.get("id"));
  let parishes: Vec<Value> = rows(tables, Table::Parishes)
    .filter(|p| text(p.get("district_id")) == id)
    .map(|p| {
      let parish_id = text(p.get("id"));
      let count = rows(tables, Table::Members)
        .filter(|m| text(m.get("parish_id")) == parish_id)
        .count();
      let mut p = p.clone();
      p.insert("member_count".into(), json!(count));
      Value::Object(p)
    })
    .collect();
  let mut node = district.clone();
  node.insert("parishes".into(), Value::Array(parishes));
  node
}

impl MemoryService {
  /// Number of data-service calls made so far.
  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  /// Make the next call fail with `message`.
  pub fn fail_next(&self, message: &str) {
    *self.fail.lock().unwrap() = Some(message.to_owned());
  }

  fn begin(&self) -> Result<MutexGuard<'_, Tables>, FakeError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(message) = self.fail.lock().unwrap().take() {
      return Err(FakeError(message));
    }
    Ok(self.tables.lock().unwrap())
  }

  fn select_now(&self, table: Table, query: &Query) -> Result<Vec<Row>, FakeError> {
    let tables = self.begin()?;
    let mut out: Vec<Row> = rows(&tables, table)
      .filter(|row| query.eq.iter().all(|(col, val)| text(row.get(col)) == *val))
      .map(|row| {
        if query.lineage {
          with_lineage(&tables, table, row)
        } else {
          row.clone()
        }
      })
      .collect();
    if let Some(column) = &query.order_by {
      out.sort_by_key(|row| text(row.get(column)));
    }
    Ok(out)
  }

  fn insert_now(&self, table: Table, mut row: Row) -> Result<Row, FakeError> {
    let mut tables = self.begin()?;
    if let Some((parent, column)) = table.parent() {
      let parent_id = text(row.get(column));
      if find(&tables, parent, &parent_id).is_none() {
        return Err(FakeError(format!("foreign key violation on {column}")));
      }
    }
    row
      .entry("id")
      .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    tables.entry(table).or_default().push(row.clone());
    Ok(row)
  }

  fn update_now(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, FakeError> {
    let mut tables = self.begin()?;
    let id = id.to_string();
    let row = tables
      .get_mut(&table)
      .and_then(|rows| rows.iter_mut().find(|r| text(r.get("id")) == id))
      .ok_or_else(|| FakeError(format!("{table} {id} not found")))?;
    for (column, value) in patch {
      if column != "id" {
        row.insert(column, value);
      }
    }
    Ok(row.clone())
  }

  fn delete_now(&self, table: Table, id: Uuid) -> Result<(), FakeError> {
    let mut tables = self.begin()?;
    let id = id.to_string();
    let has_children = tables.keys().any(|child| {
      child.parent().is_some_and(|(parent, column)| {
        parent == table
          && rows(&tables, *child).any(|r| text(r.get(column)) == id)
      })
    });
    if has_children {
      return Err(FakeError(format!("{table} {id} still has children")));
    }
    let list = tables.entry(table).or_default();
    let before = list.len();
    list.retain(|r| text(r.get("id")) != id);
    if list.len() == before {
      return Err(FakeError(format!("{table} {id} not found")));
    }
    Ok(())
  }

  fn region_tree_now(&self, id: Uuid) -> Result<Option<Row>, FakeError> {
    let tables = self.begin()?;
    let id = id.to_string();
    let Some(region) = find(&tables, Table::Regions, &id) else {
      return Ok(None);
    };
    let districts: Vec<Value> = rows(&tables, Table::Districts)
      .filter(|d| text(d.get("region_id")) == id)
      .map(|d| Value::Object(district_node(&tables, d)))
      .collect();
    let mut region = region.clone();
    region.insert("districts".into(), Value::Array(districts));
    Ok(Some(region))
  }

  fn district_tree_now(&self, id: Uuid) -> Result<Option<Row>, FakeError> {
    let tables = self.begin()?;
    Ok(
      find(&tables, Table::Districts, &id.to_string())
        .map(|d| district_node(&tables, &with_lineage(&tables, Table::Districts, d))),
    )
  }
}

impl DataService for MemoryService {
  type Error = FakeError;

  fn select<'a>(
    &'a self,
    table: Table,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Row>, FakeError>> + Send + 'a {
    ready(self.select_now(table, query))
  }

  fn insert(
    &self,
    table: Table,
    row: Row,
  ) -> impl Future<Output = Result<Row, FakeError>> + Send + '_ {
    ready(self.insert_now(table, row))
  }

  fn update(
    &self,
    table: Table,
    id: Uuid,
    patch: Row,
  ) -> impl Future<Output = Result<Row, FakeError>> + Send + '_ {
    ready(self.update_now(table, id, patch))
  }

  fn delete(
    &self,
    table: Table,
    id: Uuid,
  ) -> impl Future<Output = Result<(), FakeError>> + Send + '_ {
    ready(self.delete_now(table, id))
  }

  fn region_tree(
    &self,
    region_id: Uuid,
  ) -> impl Future<Output = Result<Option<Row>, FakeError>> + Send + '_ {
    ready(self.region_tree_now(region_id))
  }

  fn district_tree(
    &self,
    district_id: Uuid,
  ) -> impl Future<Output = Result<Option<Row>, FakeError>> + Send + '_ {
    ready(self.district_tree_now(district_id))
  }
}

// ─── Seed data ───────────────────────────────────────────────────────────────

pub mod seed {
  use chrono::NaiveDate;

  use super::*;
  use crate::{
    member::NewMember,
    org::{NewDistrict, NewParish, NewRegion},
    record::{NewRecord, Record},
  };

  /// Ids of the seeded hierarchy.
  ///
  /// Abidjan ─┬─ Cocody ───┬─ Bethel (3 members)
  ///          │            └─ Siloé (no members)
  ///          └─ Yopougon ─── Emmaüs (1 member)
  pub struct Hierarchy {
    pub region:         Uuid,
    pub district:       Uuid,
    pub other_district: Uuid,
    pub parish:         Uuid,
    pub empty_parish:   Uuid,
    pub other_parish:   Uuid,
  }

  async fn put<N: NewRecord>(svc: &MemoryService, input: N) -> Uuid {
    let row = svc
      .insert(<N::Record as Record>::TABLE, input.to_row().unwrap())
      .await
      .unwrap();
    text(row.get("id")).parse().unwrap()
  }

  pub async fn hierarchy(svc: &MemoryService) -> Hierarchy {
    let region = put(svc, NewRegion {
      name:           "Abidjan".into(),
      code:           "REG-ABIDJ101".into(),
      superintendent: Some("Kouadio Ernest".into()),
    })
    .await;

    let district = |name: &str| NewDistrict {
      name: name.into(),
      code: String::new(),
      superintendent: None,
      region_id: region,
    };
    let cocody = put(svc, district("Cocody")).await;
    let yopougon = put(svc, district("Yopougon")).await;

    let parish = |name: &str, district_id| NewParish {
      name: name.into(),
      code: String::new(),
      pastor: None,
      district_id,
    };
    let bethel = put(svc, parish("Bethel", cocody)).await;
    let siloe = put(svc, parish("Siloé", cocody)).await;
    let emmaus = put(svc, parish("Emmaüs", yopougon)).await;

    let joined = NaiveDate::from_ymd_opt(2022, 1, 16).unwrap();
    for (last, first) in [("Aka", "Marc"), ("Diallo", "Fatou"), ("Ehui", "Serge")] {
      put(svc, NewMember::new(bethel, last, first, joined)).await;
    }
    put(svc, NewMember::new(emmaus, "Gnagne", "Paul", joined)).await;

    Hierarchy {
      region,
      district: cocody,
      other_district: yopougon,
      parish: bethel,
      empty_parish: siloe,
      other_parish: emmaus,
    }
  }
}
