//! Dated head-counts per parish community.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  record::{NewRecord, Record, require_len},
  table::Table,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CensusRecord {
  pub id:          Uuid,
  pub parish_id:   Uuid,
  /// Name of the counted community.
  pub community:   String,
  pub head_count:  u32,
  pub recorded_on: NaiveDate,
}

impl Record for CensusRecord {
  const TABLE: Table = Table::CensusRecords;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.parish_id) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCensusRecord {
  pub parish_id:   Uuid,
  pub community:   String,
  pub head_count:  u32,
  pub recorded_on: NaiveDate,
}

/// The four groups a census form is filled in by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusTally {
  pub men:   u32,
  pub women: u32,
  pub boys:  u32,
  pub girls: u32,
}

impl CensusTally {
  pub fn total(&self) -> u32 {
    self
      .men
      .saturating_add(self.women)
      .saturating_add(self.boys)
      .saturating_add(self.girls)
  }
}

impl NewCensusRecord {
  pub fn from_tally(
    parish_id: Uuid,
    community: impl Into<String>,
    tally: CensusTally,
    recorded_on: NaiveDate,
  ) -> Self {
    Self {
      parish_id,
      community: community.into(),
      head_count: tally.total(),
      recorded_on,
    }
  }
}

impl NewRecord for NewCensusRecord {
  type Record = CensusRecord;

  fn validate(&self) -> Result<()> { require_len("community", &self.community, 1) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tally_sums_all_groups() {
    let tally = CensusTally { men: 12, women: 20, boys: 7, girls: 9 };
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let input = NewCensusRecord::from_tally(Uuid::new_v4(), "Saint-Paul", tally, date);
    assert_eq!(input.head_count, 48);
  }

  #[test]
  fn blank_community_is_rejected() {
    let input = NewCensusRecord {
      parish_id:   Uuid::new_v4(),
      community:   "  ".into(),
      head_count:  3,
      recorded_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    };
    assert!(input.validate().is_err());
  }
}
