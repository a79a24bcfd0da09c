//! Summary figures for a parish report, computed from fetched lists.

use std::collections::BTreeMap;

use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{
  activity::PastoralActivity,
  aggregate::census_total,
  asset::Asset,
  census::CensusRecord,
  member::{Member, MemberRole},
  worship::ReligiousService,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParishReport {
  pub member_count:   usize,
  /// Member count per role, every role present (zero if unused), in
  /// precedence order.
  pub roles:          Vec<(MemberRole, usize)>,
  /// Members per community; members without one under `None`.
  pub communities:    BTreeMap<Option<String>, usize>,
  pub census_total:   u64,
  pub service_count:  usize,
  pub activity_count: usize,
  pub asset_count:    usize,
  pub asset_value:    f64,
}

impl ParishReport {
  pub fn compute(
    members: &[Member],
    census: &[CensusRecord],
    services: &[ReligiousService],
    activities: &[PastoralActivity],
    assets: &[Asset],
  ) -> Self {
    let roles = MemberRole::iter()
      .map(|role| (role, members.iter().filter(|m| m.role == role).count()))
      .collect();

    let mut communities = BTreeMap::new();
    for member in members {
      *communities.entry(member.community.clone()).or_insert(0) += 1;
    }

    Self {
      member_count: members.len(),
      roles,
      communities,
      census_total: census_total(census),
      service_count: services.len(),
      activity_count: activities.len(),
      asset_count: assets.len(),
      asset_value: assets.iter().map(|a| a.value).sum(),
    }
  }
}
