//! Pastoral activities logged against a parish.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  record::{NewRecord, Record, require_len},
  table::Table,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PastoralActivity {
  pub id:         Uuid,
  pub parish_id:  Uuid,
  /// Free-text activity type, e.g. "Visitation" or "Baptism class".
  pub kind:       String,
  pub date:       NaiveDate,
  pub location:   Option<String>,
  pub community:  Option<String>,
  pub comments:   Option<String>,
  pub extra_info: Option<String>,
}

impl Record for PastoralActivity {
  const TABLE: Table = Table::Activities;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.parish_id) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPastoralActivity {
  pub parish_id:  Uuid,
  pub kind:       String,
  pub date:       NaiveDate,
  pub location:   Option<String>,
  pub community:  Option<String>,
  pub comments:   Option<String>,
  pub extra_info: Option<String>,
}

impl NewRecord for NewPastoralActivity {
  type Record = PastoralActivity;

  fn validate(&self) -> Result<()> { require_len("activity type", &self.kind, 1) }
}
