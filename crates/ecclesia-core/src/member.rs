//! Parish members and the role derived from their ministries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  record::{NewRecord, Record, require_len},
  table::{Row, Table},
};

// ─── Role ────────────────────────────────────────────────────────────────────

/// A member's standing, derived from ministry assignments. Declaration order
/// is precedence order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumIter,
)]
pub enum MemberRole {
  Elder,
  Deacon,
  #[serde(rename = "Ministry Lead")]
  #[strum(to_string = "Ministry Lead")]
  MinistryLead,
  #[default]
  Member,
}

impl MemberRole {
  /// First qualifying role in precedence order; plain `Member` otherwise.
  pub fn from_ministries<S: AsRef<str>>(ministries: &[S]) -> Self {
    [Self::Elder, Self::Deacon, Self::MinistryLead]
      .into_iter()
      .find(|role| {
        ministries
          .iter()
          .any(|m| role.ministry_names().contains(&m.as_ref().trim()))
      })
      .unwrap_or(Self::Member)
  }

  /// Ministry names granting this role. The French names are the ones the
  /// registry was first populated with.
  fn ministry_names(self) -> &'static [&'static str] {
    match self {
      Self::Elder => &["Elder", "Ancien"],
      Self::Deacon => &["Deacon", "Diacre"],
      Self::MinistryLead => &["Ministry Lead", "Responsable de ministère"],
      Self::Member => &[],
    }
  }
}

// ─── Member ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
  pub id:              Uuid,
  pub parish_id:       Uuid,
  pub last_name:       String,
  pub first_names:     String,
  #[serde(default)]
  pub role:            MemberRole,
  pub phone:           Option<String>,
  pub email:           Option<String>,
  pub address:         Option<String>,
  pub profession:      Option<String>,
  pub marital_status:  Option<String>,
  pub birth_date:      Option<NaiveDate>,
  pub birth_place:     Option<String>,
  pub baptism_date:    Option<NaiveDate>,
  pub baptism_place:   Option<String>,
  pub membership_date: NaiveDate,
  /// Name of the community the member belongs to within the parish.
  pub community:       Option<String>,
  #[serde(default)]
  pub ministries:      Vec<String>,
  pub observations:    Option<String>,
}

impl Member {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.last_name, self.first_names)
  }
}

impl Record for Member {
  const TABLE: Table = Table::Members;

  fn id(&self) -> Uuid { self.id }

  fn parent_id(&self) -> Option<Uuid> { Some(self.parish_id) }
}

/// Insert/update input for a [`Member`]. The role is not accepted from
/// callers; it is derived from `ministries` when the row is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
  pub parish_id:       Uuid,
  pub last_name:       String,
  pub first_names:     String,
  pub phone:           Option<String>,
  pub email:           Option<String>,
  pub address:         Option<String>,
  pub profession:      Option<String>,
  pub marital_status:  Option<String>,
  pub birth_date:      Option<NaiveDate>,
  pub birth_place:     Option<String>,
  pub baptism_date:    Option<NaiveDate>,
  pub baptism_place:   Option<String>,
  pub membership_date: NaiveDate,
  pub community:       Option<String>,
  #[serde(default)]
  pub ministries:      Vec<String>,
  pub observations:    Option<String>,
}

impl NewMember {
  /// Required fields only; everything optional left empty.
  pub fn new(
    parish_id: Uuid,
    last_name: impl Into<String>,
    first_names: impl Into<String>,
    membership_date: NaiveDate,
  ) -> Self {
    Self {
      parish_id,
      last_name: last_name.into(),
      first_names: first_names.into(),
      phone: None,
      email: None,
      address: None,
      profession: None,
      marital_status: None,
      birth_date: None,
      birth_place: None,
      baptism_date: None,
      baptism_place: None,
      membership_date,
      community: None,
      ministries: Vec::new(),
      observations: None,
    }
  }

  pub fn role(&self) -> MemberRole { MemberRole::from_ministries(&self.ministries) }
}

impl NewRecord for NewMember {
  type Record = Member;

  fn validate(&self) -> Result<()> {
    require_len("last name", &self.last_name, 2)?;
    require_len("first names", &self.first_names, 2)?;
    if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty())
      && !email.contains('@')
    {
      return Err(Error::validation(format!("invalid email address: {email:?}")));
    }
    Ok(())
  }

  fn to_row(&self) -> Result<Row> {
    let mut row = match serde_json::to_value(self)? {
      serde_json::Value::Object(row) => row,
      _ => return Err(Error::validation("member input is not an object")),
    };
    row.insert("role".into(), serde_json::to_value(self.role())?);
    Ok(row)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deacon_outranks_other_ministries() {
    assert_eq!(MemberRole::from_ministries(&["Deacon", "Usher"]), MemberRole::Deacon);
  }

  #[test]
  fn elder_outranks_deacon_regardless_of_order() {
    assert_eq!(MemberRole::from_ministries(&["Elder", "Deacon"]), MemberRole::Elder);
    assert_eq!(MemberRole::from_ministries(&["Deacon", "Elder"]), MemberRole::Elder);
  }

  #[test]
  fn no_qualifying_ministry_is_plain_member() {
    assert_eq!(MemberRole::from_ministries(&["Usher", "Choir"]), MemberRole::Member);
    assert_eq!(MemberRole::from_ministries::<&str>(&[]), MemberRole::Member);
  }

  #[test]
  fn french_ministry_names_are_recognised() {
    assert_eq!(
      MemberRole::from_ministries(&["Chantre", "Responsable de ministère"]),
      MemberRole::MinistryLead
    );
    assert_eq!(MemberRole::from_ministries(&["Diacre"]), MemberRole::Deacon);
  }

  #[test]
  fn role_display_matches_serde_name() {
    assert_eq!(MemberRole::MinistryLead.to_string(), "Ministry Lead");
    assert_eq!(
      serde_json::to_value(MemberRole::MinistryLead).unwrap(),
      serde_json::json!("Ministry Lead")
    );
  }

  #[test]
  fn row_carries_derived_role() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
    let mut input = NewMember::new(Uuid::new_v4(), "Kouassi", "Jean", date);
    input.ministries = vec!["Usher".into(), "Elder".into()];
    let row = input.to_row().unwrap();
    assert_eq!(row["role"], serde_json::json!("Elder"));
  }

  #[test]
  fn short_names_are_rejected() {
    let date = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
    let input = NewMember::new(Uuid::new_v4(), "K", "Jean", date);
    assert!(matches!(input.validate(), Err(Error::Validation(_))));
  }
}
