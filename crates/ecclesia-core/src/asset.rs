//! Parish assets ("patrimoine").

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  record::{NewRecord, Record, require_len},
  table::Table,
};

// ─── Type ────────────────────────────────────────────────────────────────────

/// What kind of possession an asset is. Anything outside the known list is
/// kept verbatim as [`AssetType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetType {
  Land,
  House,
  Building,
  Vehicle,
  Furniture,
  Equipment,
  Document,
  Other(String),
}

impl AssetType {
  pub const KNOWN: [AssetType; 7] = [
    Self::Land,
    Self::House,
    Self::Building,
    Self::Vehicle,
    Self::Furniture,
    Self::Equipment,
    Self::Document,
  ];

  pub fn as_str(&self) -> &str {
    match self {
      Self::Land => "land",
      Self::House => "house",
      Self::Building => "building",
      Self::Vehicle => "vehicle",
      Self::Furniture => "furniture",
      Self::Equipment => "equipment",
      Self::Document => "document",
      Self::Other(text) => text,
    }
  }

  /// Resolve a form selection. `"other"` takes its value from the free-text
  /// field, which must then be non-empty.
  pub fn resolve(selected: &str, other_text: Option<&str>) -> Result<Self> {
    if selected == "other" {
      return match other_text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => Ok(Self::Other(text.to_owned())),
        None => Err(Error::validation("an \"other\" asset type needs a description")),
      };
    }
    Ok(Self::from(selected.to_owned()))
  }
}

impl From<String> for AssetType {
  fn from(s: String) -> Self {
    Self::KNOWN
      .into_iter()
      .find(|known| known.as_str() == s)
      .unwrap_or(Self::Other(s))
  }
}

impl From<AssetType> for String {
  fn from(t: AssetType) -> Self {
    match t {
      AssetType::Other(text) => text,
      known => known.as_str().to_owned(),
    }
  }
}

impl std::fmt::Display for AssetType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Condition / owner ───────────────────────────────────────────────────────

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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AssetCondition {
  Excellent,
  Good,
  Fair,
  Poor,
  OutOfService,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OwnerKind {
  #[default]
  Parish,
  Community,
}

/// Who holds an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOwner {
  Parish,
  /// A named community of the parish.
  Community(String),
}

// ─── Asset ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
  pub id:              Uuid,
  pub parish_id:       Uuid,
  pub designation:     String,
  pub asset_type:      AssetType,
  pub value:           f64,
  pub acquired_on:     Option<NaiveDate>,
  pub condition:       AssetCondition,
  pub owner_kind:      OwnerKind,
  pub owner_community: Option<String>,
  /// Supporting document URLs, in upload order.
  #[serde(default)]
  pub documents:       Vec<String>,
}

impl Asset {
  pub fn owner(&self) -> AssetOwner {
    match (self.owner_kind, &self.owner_community) {
      (OwnerKind::Community, Some(name)) => AssetOwner::Community(name.clone()),
      _ => AssetOwner::Parish,
    }
  }
}

impl Record for Asset {
  const TABLE: Table = Table::Assets;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.parish_id) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
  pub parish_id:       Uuid,
  pub designation:     String,
  pub asset_type:      AssetType,
  pub value:           f64,
  pub acquired_on:     Option<NaiveDate>,
  pub condition:       AssetCondition,
  pub owner_kind:      OwnerKind,
  pub owner_community: Option<String>,
  #[serde(default)]
  pub documents:       Vec<String>,
}

impl NewAsset {
  pub fn owned_by(mut self, owner: AssetOwner) -> Self {
    match owner {
      AssetOwner::Parish => {
        self.owner_kind = OwnerKind::Parish;
        self.owner_community = None;
      }
      AssetOwner::Community(name) => {
        self.owner_kind = OwnerKind::Community;
        self.owner_community = Some(name);
      }
    }
    self
  }
}

impl NewRecord for NewAsset {
  type Record = Asset;

  fn validate(&self) -> Result<()> {
    require_len("designation", &self.designation, 2)?;
    if let AssetType::Other(text) = &self.asset_type
      && text.trim().is_empty()
    {
      return Err(Error::validation("an \"other\" asset type needs a description"));
    }
    if !self.value.is_finite() || self.value < 0.0 {
      return Err(Error::validation(format!("invalid asset value: {}", self.value)));
    }
    if self.owner_kind == OwnerKind::Community
      && self.owner_community.as_deref().is_none_or(|c| c.trim().is_empty())
    {
      return Err(Error::validation("a community-owned asset needs a community"));
    }
    Ok(())
  }
}
