//! Keyed query results.
//!
//! A [`QueryCache`] holds one slot per [`QueryKey`] the current view wants.
//! Fetches run elsewhere (a spawned task, a test) and hand their result back
//! through [`QueryCache::apply`] together with the [`Ticket`] they were
//! started with. Only the newest ticket for a wanted key is honoured: a slow
//! fetch for an abandoned selection, or one overtaken by a refetch after a
//! mutation, never overwrites what replaced it. A failed fetch notifies and
//! leaves the previous data in place.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
  activity::PastoralActivity,
  asset::Asset,
  census::CensusRecord,
  fetch::Fetched,
  member::Member,
  notify::{NoticeKind, Notifier},
  org::{Community, District, DistrictTree, Parish, Region, RegionTree},
  table::Table,
  worship::ReligiousService,
};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Identifies one fetch: what is read and for which parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
  Regions,
  AllDistricts,
  AllParishes,
  /// Rows of `table` owned by `parent`.
  Children { table: Table, parent: Uuid },
  /// A single parish with lineage.
  Parish(Uuid),
  RegionTree(Uuid),
  DistrictTree(Uuid),
}

impl QueryKey {
  pub fn children(table: Table, parent: Uuid) -> Self {
    Self::Children { table, parent }
  }

  /// Every table whose contents the result depends on, joined lineage
  /// names and nested counts included.
  pub fn reads(&self) -> &'static [Table] {
    const TREE: &[Table] =
      &[Table::Regions, Table::Districts, Table::Parishes, Table::Members];
    const DISTRICTS: &[Table] = &[Table::Districts, Table::Regions];
    const PARISHES: &[Table] = &[Table::Parishes, Table::Districts, Table::Regions];

    match self {
      Self::Regions => &[Table::Regions],
      Self::AllDistricts => DISTRICTS,
      Self::AllParishes | Self::Parish(_) => PARISHES,
      Self::RegionTree(_) | Self::DistrictTree(_) => TREE,
      Self::Children { table, .. } => match table {
        Table::Regions => &[Table::Regions],
        Table::Districts => DISTRICTS,
        Table::Parishes => PARISHES,
        Table::Members => &[Table::Members],
        Table::CensusRecords => &[Table::CensusRecords],
        Table::Assets => &[Table::Assets],
        Table::Services => &[Table::Services],
        Table::Activities => &[Table::Activities],
        Table::Communities => &[Table::Communities],
      },
    }
  }

  /// Plural label used in load-failure notices.
  pub fn label(&self) -> String {
    match self {
      Self::Regions => "regions".to_owned(),
      Self::AllDistricts => "districts".to_owned(),
      Self::AllParishes => "parishes".to_owned(),
      Self::Children { table, .. } => table.as_ref().replace('_', " "),
      Self::Parish(_) => "parish".to_owned(),
      Self::RegionTree(_) => "region overview".to_owned(),
      Self::DistrictTree(_) => "district overview".to_owned(),
    }
  }
}

/// What a successful mutation made stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
  pub table: Table,
}

impl Invalidation {
  pub fn of(table: Table) -> Self { Self { table } }

  /// Whether the result for `key` may have changed.
  pub fn covers(&self, key: &QueryKey) -> bool { key.reads().contains(&self.table) }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// A fetch the cache asked for. Results must be applied with the ticket
/// they were started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
  pub key:    QueryKey,
  generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
  data:  Option<Fetched>,
  stale: bool,
  error: Option<String>,
}

/// Outcome of [`QueryCache::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
  Stored,
  /// The key was no longer wanted, or a newer fetch superseded this one;
  /// nothing changed.
  Discarded,
  /// The fetch failed; the previous data was kept.
  Failed,
}

#[derive(Debug, Default)]
pub struct QueryCache {
  slots:     HashMap<QueryKey, Slot>,
  /// Keys of the current view, in the order they were asked for.
  wanted:    Vec<QueryKey>,
  /// Outstanding fetches, by the generation of the newest ticket.
  in_flight: HashMap<QueryKey, u64>,
  issued:    u64,
}

impl QueryCache {
  pub fn new() -> Self { Self::default() }

  /// Make `keys` the wanted set. Slots for other keys are dropped. Returns
  /// tickets for the keys that need a fetch (never loaded, or stale) and are
  /// not already being fetched.
  pub fn focus(&mut self, keys: impl IntoIterator<Item = QueryKey>) -> Vec<Ticket> {
    self.wanted.clear();
    for key in keys {
      if !self.wanted.contains(&key) {
        self.wanted.push(key);
      }
    }
    let wanted = &self.wanted;
    self.slots.retain(|key, _| wanted.contains(key));
    self.in_flight.retain(|key, _| wanted.contains(key));

    let due: Vec<_> = self
      .wanted
      .iter()
      .filter(|key| self.slots.get(key).is_none_or(|slot| slot.stale))
      .filter(|key| !self.in_flight.contains_key(key))
      .copied()
      .collect();
    due.into_iter().map(|key| self.issue(key)).collect()
  }

  fn issue(&mut self, key: QueryKey) -> Ticket {
    self.issued += 1;
    self.in_flight.insert(key, self.issued);
    Ticket { key, generation: self.issued }
  }

  /// Record the result of the fetch started with `ticket`.
  pub fn apply<E: std::fmt::Display>(
    &mut self,
    ticket: Ticket,
    result: Result<Fetched, E>,
    notifier: &dyn Notifier,
  ) -> Applied {
    let key = ticket.key;
    if self.in_flight.get(&key) != Some(&ticket.generation) {
      tracing::warn!(?key, "discarding result for abandoned or superseded query");
      return Applied::Discarded;
    }
    self.in_flight.remove(&key);

    let slot = self.slots.entry(key).or_default();
    slot.stale = false;
    match result {
      Ok(data) => {
        slot.data = Some(data);
        slot.error = None;
        Applied::Stored
      }
      Err(err) => {
        tracing::warn!(?key, %err, "fetch failed");
        notifier.notify(
          NoticeKind::Error,
          &format!("Could not load {}: {err}", key.label()),
        );
        slot.error = Some(err.to_string());
        Applied::Failed
      }
    }
  }

  /// Mark every slot covered by `invalidation` stale. Returns tickets for the
  /// wanted keys to refetch; their current data stays visible meanwhile and
  /// any fetch already running for them is superseded.
  pub fn invalidate(&mut self, invalidation: &Invalidation) -> Vec<Ticket> {
    let due: Vec<_> = self
      .wanted
      .iter()
      .filter(|key| invalidation.covers(key))
      .copied()
      .collect();
    self.restale(due)
  }

  /// Mark every wanted slot stale and return them all for refetching.
  pub fn refresh(&mut self) -> Vec<Ticket> {
    let due = self.wanted.clone();
    self.restale(due)
  }

  fn restale(&mut self, keys: Vec<QueryKey>) -> Vec<Ticket> {
    keys
      .into_iter()
      .map(|key| {
        if let Some(slot) = self.slots.get_mut(&key) {
          slot.stale = true;
        }
        self.issue(key)
      })
      .collect()
  }

  pub fn get(&self, key: &QueryKey) -> Option<&Fetched> {
    self.slots.get(key).and_then(|slot| slot.data.as_ref())
  }

  /// True while a fetch for `key` is outstanding.
  pub fn is_loading(&self, key: &QueryKey) -> bool { self.in_flight.contains_key(key) }

  /// Message of the last failed fetch for `key`, cleared by a success.
  pub fn error(&self, key: &QueryKey) -> Option<&str> {
    self.slots.get(key).and_then(|slot| slot.error.as_deref())
  }

  // ── Typed accessors ───────────────────────────────────────────────────
  //
  // A slot that is not loaded reads as empty.

  pub fn regions(&self) -> &[Region] {
    match self.get(&QueryKey::Regions) {
      Some(Fetched::Regions(rows)) => rows,
      _ => &[],
    }
  }

  pub fn all_districts(&self) -> &[District] {
    match self.get(&QueryKey::AllDistricts) {
      Some(Fetched::Districts(rows)) => rows,
      _ => &[],
    }
  }

  pub fn all_parishes(&self) -> &[Parish] {
    match self.get(&QueryKey::AllParishes) {
      Some(Fetched::Parishes(rows)) => rows,
      _ => &[],
    }
  }

  pub fn districts(&self, region_id: Uuid) -> &[District] {
    match self.get(&QueryKey::children(Table::Districts, region_id)) {
      Some(Fetched::Districts(rows)) => rows,
      _ => &[],
    }
  }

  pub fn parishes(&self, district_id: Uuid) -> &[Parish] {
    match self.get(&QueryKey::children(Table::Parishes, district_id)) {
      Some(Fetched::Parishes(rows)) => rows,
      _ => &[],
    }
  }

  pub fn parish(&self, parish_id: Uuid) -> Option<&Parish> {
    match self.get(&QueryKey::Parish(parish_id)) {
      Some(Fetched::Parish(parish)) => parish.as_ref(),
      _ => None,
    }
  }

  pub fn members(&self, parish_id: Uuid) -> &[Member] {
    match self.get(&QueryKey::children(Table::Members, parish_id)) {
      Some(Fetched::Members(rows)) => rows,
      _ => &[],
    }
  }

  pub fn census(&self, parish_id: Uuid) -> &[CensusRecord] {
    match self.get(&QueryKey::children(Table::CensusRecords, parish_id)) {
      Some(Fetched::Census(rows)) => rows,
      _ => &[],
    }
  }

  pub fn assets(&self, parish_id: Uuid) -> &[Asset] {
    match self.get(&QueryKey::children(Table::Assets, parish_id)) {
      Some(Fetched::Assets(rows)) => rows,
      _ => &[],
    }
  }

  pub fn services(&self, parish_id: Uuid) -> &[ReligiousService] {
    match self.get(&QueryKey::children(Table::Services, parish_id)) {
      Some(Fetched::Services(rows)) => rows,
      _ => &[],
    }
  }

  pub fn activities(&self, parish_id: Uuid) -> &[PastoralActivity] {
    match self.get(&QueryKey::children(Table::Activities, parish_id)) {
      Some(Fetched::Activities(rows)) => rows,
      _ => &[],
    }
  }

  pub fn communities(&self, parish_id: Uuid) -> &[Community] {
    match self.get(&QueryKey::children(Table::Communities, parish_id)) {
      Some(Fetched::Communities(rows)) => rows,
      _ => &[],
    }
  }

  pub fn region_tree(&self, region_id: Uuid) -> Option<&RegionTree> {
    match self.get(&QueryKey::RegionTree(region_id)) {
      Some(Fetched::RegionTree(tree)) => tree.as_ref(),
      _ => None,
    }
  }

  pub fn district_tree(&self, district_id: Uuid) -> Option<&DistrictTree> {
    match self.get(&QueryKey::DistrictTree(district_id)) {
      Some(Fetched::DistrictTree(tree)) => tree.as_ref(),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fake::RecordingNotifier;

  fn keys(tickets: &[Ticket]) -> Vec<QueryKey> { tickets.iter().map(|t| t.key).collect() }

  fn region(name: &str) -> Region {
    Region {
      id:             Uuid::new_v4(),
      name:           name.into(),
      code:           String::new(),
      superintendent: None,
    }
  }

  #[test]
  fn focus_requests_only_missing_keys() {
    let mut cache = QueryCache::new();
    let notifier = RecordingNotifier::default();

    let due = cache.focus([QueryKey::Regions]);
    assert_eq!(keys(&due), vec![QueryKey::Regions]);
    // Already in flight.
    assert!(cache.focus([QueryKey::Regions]).is_empty());

    let fetched: Result<_, String> = Ok(Fetched::Regions(vec![region("Abidjan")]));
    assert_eq!(cache.apply(due[0], fetched, &notifier), Applied::Stored);
    assert!(cache.focus([QueryKey::Regions]).is_empty());
    assert_eq!(cache.regions().len(), 1);
  }

  #[test]
  fn result_for_abandoned_key_is_discarded() {
    let mut cache = QueryCache::new();
    let notifier = RecordingNotifier::default();
    let (old, new) = (Uuid::new_v4(), Uuid::new_v4());
    let old_key = QueryKey::children(Table::Members, old);
    let new_key = QueryKey::children(Table::Members, new);

    let old_ticket = cache.focus([old_key])[0];
    cache.focus([new_key]);

    let late: Result<_, String> = Ok(Fetched::Members(Vec::new()));
    assert_eq!(cache.apply(old_ticket, late, &notifier), Applied::Discarded);
    assert!(cache.get(&old_key).is_none());
    assert!(cache.get(&new_key).is_none());
    assert!(cache.is_loading(&new_key));
  }

  #[test]
  fn failure_keeps_last_good_data_and_notifies() {
    let mut cache = QueryCache::new();
    let notifier = RecordingNotifier::default();
    let first = cache.focus([QueryKey::Regions])[0];
    let ok: Result<_, String> = Ok(Fetched::Regions(vec![region("Bouaké")]));
    cache.apply(first, ok, &notifier);

    let due = cache.refresh();
    assert_eq!(keys(&due), vec![QueryKey::Regions]);
    let failed = cache.apply(
      due[0],
      Err::<Fetched, _>("timeout".to_owned()),
      &notifier,
    );

    assert_eq!(failed, Applied::Failed);
    assert_eq!(cache.regions()[0].name, "Bouaké");
    assert_eq!(cache.error(&QueryKey::Regions), Some("timeout"));
    let notices = notifier.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, NoticeKind::Error);
    assert!(notices[0].1.contains("regions"));
  }

  #[test]
  fn member_mutation_invalidates_trees_but_not_assets() {
    let parish = Uuid::new_v4();
    let region = Uuid::new_v4();
    let inv = Invalidation::of(Table::Members);
    assert!(inv.covers(&QueryKey::children(Table::Members, parish)));
    assert!(inv.covers(&QueryKey::RegionTree(region)));
    assert!(inv.covers(&QueryKey::DistrictTree(region)));
    assert!(!inv.covers(&QueryKey::children(Table::Assets, parish)));
    assert!(!inv.covers(&QueryKey::Regions));
  }

  #[test]
  fn region_rename_invalidates_lineage_lists() {
    let inv = Invalidation::of(Table::Regions);
    assert!(inv.covers(&QueryKey::AllParishes));
    assert!(inv.covers(&QueryKey::children(Table::Districts, Uuid::new_v4())));
    assert!(!inv.covers(&QueryKey::children(Table::Members, Uuid::new_v4())));
  }

  #[test]
  fn invalidate_returns_only_wanted_covered_keys() {
    let mut cache = QueryCache::new();
    let parish = Uuid::new_v4();
    let members = QueryKey::children(Table::Members, parish);
    let assets = QueryKey::children(Table::Assets, parish);
    cache.focus([members, assets]);

    let due = cache.invalidate(&Invalidation::of(Table::Assets));
    assert_eq!(keys(&due), vec![assets]);
  }

  #[test]
  fn fetch_overtaken_by_a_refetch_is_discarded() {
    let mut cache = QueryCache::new();
    let notifier = RecordingNotifier::default();
    let before = cache.focus([QueryKey::Regions])[0];
    let after = cache.invalidate(&Invalidation::of(Table::Regions))[0];

    let fresh: Result<_, String> = Ok(Fetched::Regions(vec![region("Old"), region("New")]));
    assert_eq!(cache.apply(after, fresh, &notifier), Applied::Stored);
    let slow: Result<_, String> = Ok(Fetched::Regions(vec![region("Old")]));
    assert_eq!(cache.apply(before, slow, &notifier), Applied::Discarded);

    let names: Vec<_> = cache.regions().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Old", "New"]);
    assert!(!cache.is_loading(&QueryKey::Regions));
  }

  #[test]
  fn superseded_fetch_landing_first_keeps_the_key_loading() {
    let mut cache = QueryCache::new();
    let notifier = RecordingNotifier::default();
    let before = cache.focus([QueryKey::Regions])[0];
    let after = cache.refresh()[0];

    let slow: Result<_, String> = Ok(Fetched::Regions(vec![region("Old")]));
    assert_eq!(cache.apply(before, slow, &notifier), Applied::Discarded);
    assert!(cache.is_loading(&QueryKey::Regions));

    let fresh: Result<_, String> = Ok(Fetched::Regions(vec![region("New")]));
    assert_eq!(cache.apply(after, fresh, &notifier), Applied::Stored);
    assert_eq!(cache.regions()[0].name, "New");
  }
}
