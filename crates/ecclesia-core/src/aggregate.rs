//! Roll-up counts over already-fetched data.
//!
//! Everything here is a pure function of its input: no queries, no errors.
//! A branch that was not materialized (a district without a `parishes`
//! relation, a parish without counts) contributes zero.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  census::CensusRecord,
  org::{District, DistrictTree, ParishNode, Region, RegionTree},
};

// ─── Member counts ───────────────────────────────────────────────────────────

/// The precomputed count if the fetch provided one, else the number of
/// member rows, else zero.
pub fn parish_member_count(node: &ParishNode) -> u64 {
  node
    .member_count
    .or_else(|| node.members.as_ref().map(|m| m.len() as u64))
    .unwrap_or(0)
}

pub fn member_count_of_parishes<'a>(
  parishes: impl IntoIterator<Item = &'a ParishNode>,
) -> u64 {
  parishes.into_iter().map(parish_member_count).sum()
}

pub fn district_member_count(tree: &DistrictTree) -> u64 {
  member_count_of_parishes(tree.parishes.iter().flatten())
}

pub fn region_member_count(tree: &RegionTree) -> u64 {
  tree.districts.iter().flatten().map(district_member_count).sum()
}

// ─── Census ──────────────────────────────────────────────────────────────────

/// The authoritative record of each community: the one with the greatest
/// date. On equal dates the record met first in `records` wins. Output is
/// in order of each community's first appearance.
pub fn latest_census(records: &[CensusRecord]) -> Vec<&CensusRecord> {
  let mut latest: Vec<&CensusRecord> = Vec::new();
  let mut index: HashMap<&str, usize> = HashMap::new();

  for record in records {
    match index.get(record.community.as_str()) {
      Some(&i) => {
        if record.recorded_on > latest[i].recorded_on {
          latest[i] = record;
        }
      }
      None => {
        index.insert(&record.community, latest.len());
        latest.push(record);
      }
    }
  }
  latest
}

/// Sum of the latest head-count per community.
pub fn census_total(records: &[CensusRecord]) -> u64 {
  latest_census(records).iter().map(|r| u64::from(r.head_count)).sum()
}

// ─── Overviews ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParishLine {
  pub id:           Uuid,
  pub name:         String,
  pub code:         String,
  pub pastor:       Option<String>,
  pub member_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictLine {
  pub id:             Uuid,
  pub name:           String,
  pub code:           String,
  pub superintendent: Option<String>,
  pub parish_count:   usize,
  pub member_count:   u64,
}

/// The figures shown on a region's overview.
#[derive(Debug, Clone, Serialize)]
pub struct RegionOverview {
  pub region:         Region,
  pub district_count: usize,
  pub parish_count:   usize,
  pub member_count:   u64,
  pub districts:      Vec<DistrictLine>,
}

impl RegionOverview {
  pub fn from_tree(tree: &RegionTree) -> Self {
    let districts: Vec<_> = tree
      .districts
      .iter()
      .flatten()
      .map(|d| DistrictLine {
        id:             d.district.id,
        name:           d.district.name.clone(),
        code:           d.district.code.clone(),
        superintendent: d.district.superintendent.clone(),
        parish_count:   d.parishes.as_ref().map_or(0, Vec::len),
        member_count:   district_member_count(d),
      })
      .collect();

    Self {
      region:         tree.region.clone(),
      district_count: districts.len(),
      parish_count:   districts.iter().map(|d| d.parish_count).sum(),
      member_count:   districts.iter().map(|d| d.member_count).sum(),
      districts,
    }
  }
}

/// The figures shown on a district's overview.
#[derive(Debug, Clone, Serialize)]
pub struct DistrictOverview {
  pub district:     District,
  pub parish_count: usize,
  pub member_count: u64,
  pub parishes:     Vec<ParishLine>,
}

impl DistrictOverview {
  pub fn from_tree(tree: &DistrictTree) -> Self {
    let parishes: Vec<_> = tree
      .parishes
      .iter()
      .flatten()
      .map(|p| ParishLine {
        id:           p.parish.id,
        name:         p.parish.name.clone(),
        code:         p.parish.code.clone(),
        pastor:       p.parish.pastor.clone(),
        member_count: parish_member_count(p),
      })
      .collect();

    Self {
      district:     tree.district.clone(),
      parish_count: parishes.len(),
      member_count: parishes.iter().map(|p| p.member_count).sum(),
      parishes,
    }
  }
}
