//! Recurring religious services held by a parish.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  record::{NewRecord, Record, require_len},
  table::Table,
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ServiceDay {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
  Sunday,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReligiousService {
  pub id:           Uuid,
  pub parish_id:    Uuid,
  pub name:         String,
  pub day:          ServiceDay,
  pub date:         NaiveDate,
  pub starts_at:    NaiveTime,
  pub ends_at:      NaiveTime,
  pub location:     Option<String>,
  pub responsible:  Option<String>,
  pub description:  Option<String>,
  pub community_id: Option<Uuid>,
}

impl Record for ReligiousService {
  const TABLE: Table = Table::Services;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.parish_id) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReligiousService {
  pub parish_id:    Uuid,
  pub name:         String,
  pub day:          ServiceDay,
  pub date:         NaiveDate,
  pub starts_at:    NaiveTime,
  pub ends_at:      NaiveTime,
  pub location:     Option<String>,
  pub responsible:  Option<String>,
  pub description:  Option<String>,
  pub community_id: Option<Uuid>,
}

impl NewRecord for NewReligiousService {
  type Record = ReligiousService;

  fn validate(&self) -> Result<()> {
    require_len("service name", &self.name, 1)?;
    if self.ends_at <= self.starts_at {
      return Err(Error::validation(format!(
        "service ends at {} but starts at {}",
        self.ends_at.format("%H:%M"),
        self.starts_at.format("%H:%M")
      )));
    }
    Ok(())
  }
}
