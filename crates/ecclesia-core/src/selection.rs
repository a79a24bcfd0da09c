//! Which entity is selected and which section of it is shown.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::section::Section;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Region,
  District,
  Parish,
}

/// The active entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
  pub kind: EntityKind,
  pub id:   Uuid,
}

/// The selection state. Parent identifiers on the deeper states are
/// context for display only; they are `None` when the caller does not
/// track the relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
  #[default]
  None,
  Region {
    region_id: Uuid,
  },
  District {
    region_id:   Option<Uuid>,
    district_id: Uuid,
  },
  Parish {
    district_id: Option<Uuid>,
    parish_id:   Uuid,
  },
}

impl Selection {
  pub fn active(&self) -> Option<EntityRef> {
    match *self {
      Self::None => None,
      Self::Region { region_id } => {
        Some(EntityRef { kind: EntityKind::Region, id: region_id })
      }
      Self::District { district_id, .. } => {
        Some(EntityRef { kind: EntityKind::District, id: district_id })
      }
      Self::Parish { parish_id, .. } => {
        Some(EntityRef { kind: EntityKind::Parish, id: parish_id })
      }
    }
  }

  pub fn region_id(&self) -> Option<Uuid> {
    match *self {
      Self::Region { region_id } => Some(region_id),
      Self::District { region_id, .. } => region_id,
      Self::None | Self::Parish { .. } => None,
    }
  }

  pub fn district_id(&self) -> Option<Uuid> {
    match *self {
      Self::District { district_id, .. } => Some(district_id),
      Self::Parish { district_id, .. } => district_id,
      Self::None | Self::Region { .. } => None,
    }
  }

  pub fn parish_id(&self) -> Option<Uuid> {
    match *self {
      Self::Parish { parish_id, .. } => Some(parish_id),
      _ => None,
    }
  }
}

/// The per-view session: selection plus active section. Read through the
/// accessors, written only through the transition methods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
  selection: Selection,
  section:   Section,
}

impl Session {
  /// Nothing selected, section `overview`.
  pub fn new() -> Self { Self::default() }

  pub fn selection(&self) -> Selection { self.selection }

  pub fn section(&self) -> &Section { &self.section }

  pub fn active(&self) -> Option<EntityRef> { self.selection.active() }

  /// Select a region; any district or parish selection is cleared.
  pub fn select_region(&mut self, region_id: Uuid) {
    self.selection = Selection::Region { region_id };
  }

  /// Select a district. `region_id` is its region when known; the region
  /// context follows it, or is cleared when `None`. The parish selection is
  /// cleared.
  pub fn select_district(&mut self, district_id: Uuid, region_id: Option<Uuid>) {
    self.selection = Selection::District { region_id, district_id };
  }

  /// Make a parish the active entity. `district_id` is display context.
  pub fn select_parish(&mut self, parish_id: Uuid, district_id: Option<Uuid>) {
    self.selection = Selection::Parish { district_id, parish_id };
  }

  pub fn clear(&mut self) { self.selection = Selection::None; }

  /// Change the active section. The selection is left as it is.
  pub fn set_section(&mut self, section: Section) { self.section = section; }
}
