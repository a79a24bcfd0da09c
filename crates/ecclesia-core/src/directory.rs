//! The servant directory: every superintendent and pastor named on a
//! region, district or parish, with where they serve.

use serde::Serialize;

use crate::{
  org::{District, Parish, Region, UNSPECIFIED},
  selection::{EntityKind, EntityRef},
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, strum::Display,
)]
pub enum ServantRole {
  #[strum(to_string = "Regional Superintendent")]
  RegionalSuperintendent,
  #[strum(to_string = "District Superintendent")]
  DistrictSuperintendent,
  #[strum(to_string = "Senior Pastor")]
  SeniorPastor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServantEntry {
  #[serde(skip)]
  pub serves:    EntityRef,
  pub full_name: String,
  pub role:      ServantRole,
  /// Name of the region, district or parish served.
  pub entity:    String,
  pub region:    String,
}

fn named(name: Option<&String>) -> Option<String> {
  name.map(|n| n.trim()).filter(|n| !n.is_empty()).map(str::to_owned)
}

/// Build the directory, sorted by name. Entities without a named servant
/// are skipped.
pub fn build_directory(
  regions: &[Region],
  districts: &[District],
  parishes: &[Parish],
) -> Vec<ServantEntry> {
  let regions = regions.iter().filter_map(|r| {
    Some(ServantEntry {
      serves:    EntityRef { kind: EntityKind::Region, id: r.id },
      full_name: named(r.superintendent.as_ref())?,
      role:      ServantRole::RegionalSuperintendent,
      entity:    r.name.clone(),
      region:    r.name.clone(),
    })
  });
  let districts = districts.iter().filter_map(|d| {
    Some(ServantEntry {
      serves:    EntityRef { kind: EntityKind::District, id: d.id },
      full_name: named(d.superintendent.as_ref())?,
      role:      ServantRole::DistrictSuperintendent,
      entity:    d.name.clone(),
      region:    d.region_label().to_owned(),
    })
  });
  let parishes = parishes.iter().filter_map(|p| {
    Some(ServantEntry {
      serves:    EntityRef { kind: EntityKind::Parish, id: p.id },
      full_name: named(p.pastor.as_ref())?,
      role:      ServantRole::SeniorPastor,
      entity:    p.name.clone(),
      region:    p.region_name.clone().unwrap_or_else(|| UNSPECIFIED.to_owned()),
    })
  });

  let mut entries: Vec<_> = regions.chain(districts).chain(parishes).collect();
  entries.sort_by_cached_key(|e| e.full_name.to_lowercase());
  entries
}

/// Directory filter; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryFilter {
  /// Case-insensitive substring of the servant's name.
  pub name:   String,
  pub role:   Option<ServantRole>,
  pub region: Option<String>,
  pub entity: Option<String>,
}

impl DirectoryFilter {
  pub fn matches(&self, entry: &ServantEntry) -> bool {
    let needle = self.name.trim().to_lowercase();
    entry.full_name.to_lowercase().contains(&needle)
      && self.role.is_none_or(|role| role == entry.role)
      && self.region.as_ref().is_none_or(|r| *r == entry.region)
      && self.entity.as_ref().is_none_or(|e| *e == entry.entity)
  }

  pub fn apply<'a>(&self, entries: &'a [ServantEntry]) -> Vec<&'a ServantEntry> {
    entries.iter().filter(|e| self.matches(e)).collect()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn fixture() -> (Vec<Region>, Vec<District>, Vec<Parish>) {
    let region = Region {
      id:             Uuid::new_v4(),
      name:           "Abidjan".into(),
      code:           "REG-ABIDJ1".into(),
      superintendent: Some("Kouadio Ernest".into()),
    };
    let district = District {
      id:             Uuid::new_v4(),
      name:           "Cocody".into(),
      code:           "DIS-COCOD2".into(),
      superintendent: None,
      region_id:      region.id,
      region_name:    Some("Abidjan".into()),
    };
    let parish = Parish {
      id:            Uuid::new_v4(),
      name:          "Bethel".into(),
      code:          "PAR-BETHE3".into(),
      pastor:        Some("Assi Brou".into()),
      district_id:   district.id,
      district_name: Some("Cocody".into()),
      region_name:   None,
    };
    (vec![region], vec![district], vec![parish])
  }

  #[test]
  fn unnamed_servants_are_skipped() {
    let (r, d, p) = fixture();
    let entries = build_directory(&r, &d, &p);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].full_name, "Assi Brou");
    assert_eq!(entries[0].region, UNSPECIFIED);
    assert_eq!(entries[1].role, ServantRole::RegionalSuperintendent);
  }

  #[test]
  fn filter_by_name_and_entity() {
    let (r, d, p) = fixture();
    let entries = build_directory(&r, &d, &p);

    let by_name = DirectoryFilter { name: "KOUA".into(), ..Default::default() };
    assert_eq!(by_name.apply(&entries).len(), 1);

    let by_entity = DirectoryFilter { entity: Some("Bethel".into()), ..Default::default() };
    let found = by_entity.apply(&entries);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].role, ServantRole::SeniorPastor);

    assert_eq!(DirectoryFilter::default().apply(&entries).len(), 2);
  }
}
