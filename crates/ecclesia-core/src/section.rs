//! Display sections and the router that maps `(section, entity)` to the
//! view responsible for it.

use uuid::Uuid;

use crate::{
  query::QueryKey,
  selection::{EntityKind, EntityRef},
  table::Table,
};

// ─── Section ─────────────────────────────────────────────────────────────────

/// A display section. Parsed leniently: any unrecognised text becomes
/// [`Section::Unknown`] and routes to the placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, strum::EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Section {
  #[default]
  Overview,
  Districts,
  Parishes,
  Members,
  Census,
  PastoralActivity,
  Services,
  Assets,
  Finance,
  Report,
  Directory,
  Servants,
  Activities,
  Reports,
  Settings,
  #[strum(default)]
  Unknown(String),
}

impl Section {
  pub fn parse(text: &str) -> Self {
    text
      .trim()
      .parse()
      .unwrap_or_else(|_| Self::Unknown(text.to_owned()))
  }

  /// The identifier `parse` accepts.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Overview => "overview",
      Self::Districts => "districts",
      Self::Parishes => "parishes",
      Self::Members => "members",
      Self::Census => "census",
      Self::PastoralActivity => "pastoral-activity",
      Self::Services => "services",
      Self::Assets => "assets",
      Self::Finance => "finance",
      Self::Report => "report",
      Self::Directory => "directory",
      Self::Servants => "servants",
      Self::Activities => "activities",
      Self::Reports => "reports",
      Self::Settings => "settings",
      Self::Unknown(text) => text,
    }
  }

  /// Menu label.
  pub fn label(&self) -> &str {
    match self {
      Self::Overview => "Overview",
      Self::Districts => "Districts",
      Self::Parishes => "Parishes",
      Self::Members => "Members",
      Self::Census => "Congregation size",
      Self::PastoralActivity => "Pastoral activity",
      Self::Services => "Religious services",
      Self::Assets => "Assets",
      Self::Finance => "Finance",
      Self::Report => "Report",
      Self::Directory => "Directory",
      Self::Servants => "Servants",
      Self::Activities => "Activities",
      Self::Reports => "Reports",
      Self::Settings => "Settings",
      Self::Unknown(text) => text,
    }
  }

  /// Single-glyph menu icon.
  pub fn icon(&self) -> &'static str {
    match self {
      Self::Overview => "◉",
      Self::Districts | Self::Parishes | Self::Assets => "▦",
      Self::Members | Self::Servants => "☺",
      Self::Census => "◔",
      Self::PastoralActivity | Self::Activities => "▣",
      Self::Services => "✝",
      Self::Finance | Self::Report | Self::Reports => "▤",
      Self::Directory => "☷",
      Self::Settings => "⚙",
      Self::Unknown(_) => "?",
    }
  }
}

impl std::fmt::Display for Section {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The sections offered for an entity kind, in menu order.
pub fn sections_for(kind: EntityKind) -> &'static [Section] {
  use Section::*;
  match kind {
    EntityKind::Region => {
      &[Overview, Districts, Servants, Activities, Reports, Settings]
    }
    EntityKind::District => {
      &[Overview, Parishes, Members, Activities, Reports, Settings]
    }
    EntityKind::Parish => &[
      Overview,
      Members,
      Census,
      PastoralActivity,
      Services,
      Assets,
      Finance,
      Report,
      Directory,
      Settings,
    ],
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The view responsible for a section of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  /// Nothing selected yet.
  SelectPrompt,
  RegionOverview(Uuid),
  RegionDistricts(Uuid),
  DistrictOverview(Uuid),
  DistrictParishes(Uuid),
  ParishOverview(Uuid),
  ParishMembers(Uuid),
  ParishCensus(Uuid),
  ParishActivities(Uuid),
  ParishServices(Uuid),
  ParishAssets(Uuid),
  ParishReport(Uuid),
  Directory,
  ParishSettings(Uuid),
  /// "Not yet available" for this section.
  Placeholder(Section),
}

/// Pick the view for `section` of `entity`. Never fails: unknown sections
/// and unimplemented combinations yield [`Route::Placeholder`].
pub fn route(section: &Section, entity: Option<EntityRef>) -> Route {
  let Some(EntityRef { kind, id }) = entity else {
    return Route::SelectPrompt;
  };

  match (kind, section) {
    (EntityKind::Region, Section::Overview) => Route::RegionOverview(id),
    (EntityKind::Region, Section::Districts) => Route::RegionDistricts(id),
    (EntityKind::District, Section::Overview) => Route::DistrictOverview(id),
    (EntityKind::District, Section::Parishes) => Route::DistrictParishes(id),
    (EntityKind::Parish, Section::Overview) => Route::ParishOverview(id),
    (EntityKind::Parish, Section::Members) => Route::ParishMembers(id),
    (EntityKind::Parish, Section::Census) => Route::ParishCensus(id),
    (EntityKind::Parish, Section::PastoralActivity) => Route::ParishActivities(id),
    (EntityKind::Parish, Section::Services) => Route::ParishServices(id),
    (EntityKind::Parish, Section::Assets) => Route::ParishAssets(id),
    (EntityKind::Parish, Section::Report) => Route::ParishReport(id),
    (EntityKind::Parish, Section::Directory) => Route::Directory,
    (EntityKind::Parish, Section::Settings) => Route::ParishSettings(id),
    (_, other) => Route::Placeholder(other.clone()),
  }
}

impl Route {
  /// The queries this view needs; fetched when it becomes active.
  pub fn queries(&self) -> Vec<QueryKey> {
    let of = QueryKey::children;
    match *self {
      Self::SelectPrompt | Self::Placeholder(_) => Vec::new(),
      Self::RegionOverview(id) | Self::RegionDistricts(id) => {
        vec![QueryKey::RegionTree(id)]
      }
      Self::DistrictOverview(id) | Self::DistrictParishes(id) => {
        vec![QueryKey::DistrictTree(id)]
      }
      Self::ParishOverview(id) => vec![
        QueryKey::Parish(id),
        of(Table::Members, id),
        of(Table::CensusRecords, id),
        of(Table::Communities, id),
      ],
      Self::ParishMembers(id) => vec![of(Table::Members, id)],
      Self::ParishCensus(id) => {
        vec![of(Table::CensusRecords, id), of(Table::Communities, id)]
      }
      Self::ParishActivities(id) => vec![of(Table::Activities, id)],
      Self::ParishServices(id) => vec![of(Table::Services, id)],
      Self::ParishAssets(id) => vec![of(Table::Assets, id)],
      Self::ParishReport(id) => vec![
        QueryKey::Parish(id),
        of(Table::Members, id),
        of(Table::CensusRecords, id),
        of(Table::Services, id),
        of(Table::Activities, id),
        of(Table::Assets, id),
      ],
      Self::Directory => vec![
        QueryKey::Regions,
        QueryKey::AllDistricts,
        QueryKey::AllParishes,
      ],
      Self::ParishSettings(id) => vec![QueryKey::Parish(id)],
    }
  }
}
