//! Human-readable codes for regions, districts and parishes.
//!
//! A code is generated once, when the entity is created, and is display
//! data from then on. Shape: `PAR-` + up to five ASCII letters of the
//! upper-cased name + the first three characters of the parent id (`0`
//! without a parent) + a number below 1000. Regions have no parent part.

use rand_core::RngCore;
use uuid::Uuid;

use crate::selection::EntityKind;

fn prefix(kind: EntityKind) -> &'static str {
  match kind {
    EntityKind::Region => "REG-",
    EntityKind::District => "DIS-",
    EntityKind::Parish => "PAR-",
  }
}

/// A fresh code for an entity called `name`. Empty for a blank name.
pub fn generate_code(
  kind: EntityKind,
  name: &str,
  parent: Option<Uuid>,
  rng: &mut impl RngCore,
) -> String {
  if name.trim().is_empty() {
    return String::new();
  }

  let letters: String = name
    .to_uppercase()
    .chars()
    .filter(char::is_ascii_uppercase)
    .take(5)
    .collect();

  let parent = match kind {
    EntityKind::Region => String::new(),
    EntityKind::District | EntityKind::Parish => parent
      .map(|id| id.to_string()[..3].to_owned())
      .unwrap_or_else(|| "0".to_owned()),
  };

  format!("{}{letters}{parent}{}", prefix(kind), rng.next_u32() % 1000)
}
