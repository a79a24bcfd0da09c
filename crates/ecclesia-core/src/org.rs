//! The organizational hierarchy: regions own districts, districts own
//! parishes, parishes are split into named communities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  member::Member,
  record::{NewRecord, Record, require_len},
  table::Table,
};

/// Rendered in place of a name that is absent or whose parent row is gone.
pub const UNASSIGNED: &str = "Unassigned";

/// Rendered in place of a joined parent name that did not resolve.
pub const UNSPECIFIED: &str = "Unspecified";

// ─── Region ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
  pub id:             Uuid,
  pub name:           String,
  /// Generated once at creation (see [`crate::code`]); display data only.
  pub code:           String,
  pub superintendent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegion {
  pub name:           String,
  pub code:           String,
  pub superintendent: Option<String>,
}

impl Record for Region {
  const TABLE: Table = Table::Regions;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { None }
}

impl NewRecord for NewRegion {
  type Record = Region;

  fn validate(&self) -> Result<()> { require_len("region name", &self.name, 1) }
}

// ─── District ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
  pub id:             Uuid,
  pub name:           String,
  pub code:           String,
  pub superintendent: Option<String>,
  pub region_id:      Uuid,
  /// Joined from the parent region when fetched with lineage.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub region_name:    Option<String>,
}

impl District {
  pub fn region_label(&self) -> &str {
    self.region_name.as_deref().unwrap_or(UNSPECIFIED)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDistrict {
  pub name:           String,
  pub code:           String,
  pub superintendent: Option<String>,
  pub region_id:      Uuid,
}

impl Record for District {
  const TABLE: Table = Table::Districts;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.region_id) }
}

impl NewRecord for NewDistrict {
  type Record = District;

  fn validate(&self) -> Result<()> { require_len("district name", &self.name, 1) }
}

// ─── Parish ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parish {
  pub id:            Uuid,
  pub name:          String,
  pub code:          String,
  pub pastor:        Option<String>,
  pub district_id:   Uuid,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub district_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub region_name:   Option<String>,
}

impl Parish {
  /// `Region › District › Parish`, with missing links shown as
  /// [`UNSPECIFIED`].
  pub fn breadcrumb(&self) -> String {
    format!(
      "{} › {} › {}",
      self.region_name.as_deref().unwrap_or(UNSPECIFIED),
      self.district_name.as_deref().unwrap_or(UNSPECIFIED),
      self.name
    )
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParish {
  pub name:        String,
  pub code:        String,
  pub pastor:      Option<String>,
  pub district_id: Uuid,
}

impl Record for Parish {
  const TABLE: Table = Table::Parishes;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.district_id) }
}

impl NewRecord for NewParish {
  type Record = Parish;

  fn validate(&self) -> Result<()> { require_len("parish name", &self.name, 1) }
}

// ─── Community ───────────────────────────────────────────────────────────────

/// A named subdivision of a parish, used for census and asset ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
  pub id:        Uuid,
  pub parish_id: Uuid,
  pub name:      String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommunity {
  pub parish_id: Uuid,
  pub name:      String,
}

impl Record for Community {
  const TABLE: Table = Table::Communities;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.parish_id) }
}

impl NewRecord for NewCommunity {
  type Record = Community;

  fn validate(&self) -> Result<()> { require_len("community name", &self.name, 1) }
}

// ─── Nested trees ────────────────────────────────────────────────────────────

/// A region with its districts, as returned by a nested select.
///
/// `districts` is `None` when the relation was not materialized; the
/// aggregator treats that the same as an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionTree {
  #[serde(flatten)]
  pub region:    Region,
  #[serde(default)]
  pub districts: Option<Vec<DistrictTree>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictTree {
  #[serde(flatten)]
  pub district: District,
  #[serde(default)]
  pub parishes: Option<Vec<ParishNode>>,
}

/// A parish inside a tree, carrying either a precomputed member count, the
/// member rows themselves, or neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParishNode {
  #[serde(flatten)]
  pub parish:       Parish,
  #[serde(default)]
  pub member_count: Option<u64>,
  #[serde(default)]
  pub members:      Option<Vec<Member>>,
}

// ─── Selector search ─────────────────────────────────────────────────────────

/// An entity listed in a region, district or parish selector.
pub trait Named {
  fn name(&self) -> &str;
  fn code(&self) -> &str;
}

macro_rules! named {
  ($($ty:ty),*) => {$(
    impl Named for $ty {
      fn name(&self) -> &str { &self.name }
      fn code(&self) -> &str { &self.code }
    }
  )*};
}

named!(Region, District, Parish);

/// Items whose name or code contains `needle`, ignoring case. A blank
/// needle keeps everything.
pub fn search<'a, T: Named>(items: &'a [T], needle: &str) -> Vec<&'a T> {
  let needle = needle.trim().to_lowercase();
  items
    .iter()
    .filter(|item| {
      needle.is_empty()
        || item.name().to_lowercase().contains(&needle)
        || item.code().to_lowercase().contains(&needle)
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn region(name: &str, code: &str) -> Region {
    Region {
      id:             Uuid::new_v4(),
      name:           name.into(),
      code:           code.into(),
      superintendent: None,
    }
  }

  #[test]
  fn search_matches_name_or_code_ignoring_case() {
    let regions = [region("Gagnoa", "REG-GAGNO12"), region("Daloa", "REG-DALOA7")];
    let hits: Vec<_> = search(&regions, "gag").iter().map(|r| r.name.as_str()).collect();
    assert_eq!(hits, vec!["Gagnoa"]);
    assert_eq!(search(&regions, "daloa7").len(), 1);
    assert_eq!(search(&regions, "  ").len(), 2);
    assert!(search(&regions, "bouna").is_empty());
  }

  #[test]
  fn breadcrumb_marks_missing_lineage() {
    let parish = Parish {
      id:            Uuid::new_v4(),
      name:          "Sion".into(),
      code:          String::new(),
      pastor:        None,
      district_id:   Uuid::new_v4(),
      district_name: Some("Divo".into()),
      region_name:   None,
    };
    assert_eq!(parish.breadcrumb(), "Unspecified › Divo › Sion");
  }
}
