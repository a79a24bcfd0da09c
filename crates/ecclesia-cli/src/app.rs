//! Application state machine and event dispatcher.
//!
//! The left pane drills down regions → districts → parishes; the right pane
//! shows the active section of whatever is selected. Fetches run as spawned
//! tasks and report back over a channel with the ticket they were started
//! with, so the [`QueryCache`] can drop results the user has already
//! navigated away from or that a refetch has overtaken.

use std::sync::{Arc, Mutex, PoisonError};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ecclesia_core::{
  Result as CoreResult,
  code::generate_code,
  fetch::{Fetched, fetch_key},
  mutate::{create, delete},
  notify::{NoticeKind, Notifier},
  org::{District, NewDistrict, NewParish, NewRegion, Named, Parish, Region, search},
  query::{Invalidation, QueryCache, QueryKey, Ticket},
  record::Record,
  section::{Route, Section, route, sections_for},
  selection::{EntityKind, EntityRef, Session},
  store::DataService,
  table::Table,
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use rand_core::OsRng;
use tokio::sync::mpsc;
use uuid::Uuid;

// ─── Status line ──────────────────────────────────────────────────────────────

/// The notifier behind the status bar: keeps the latest notice.
#[derive(Debug, Default)]
pub struct StatusLine {
  notice: Mutex<Option<(NoticeKind, String)>>,
}

impl StatusLine {
  pub fn current(&self) -> Option<(NoticeKind, String)> {
    self.notice.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  pub fn clear(&self) {
    *self.notice.lock().unwrap_or_else(PoisonError::into_inner) = None;
  }
}

impl Notifier for StatusLine {
  fn notify(&self, kind: NoticeKind, message: &str) {
    tracing::debug!(%kind, "{message}");
    *self.notice.lock().unwrap_or_else(PoisonError::into_inner) =
      Some((kind, message.to_owned()));
  }
}

// ─── Navigator ────────────────────────────────────────────────────────────────

/// Which list the navigator shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Level {
  Regions,
  Districts {
    region:      Uuid,
    region_name: String,
  },
  Parishes {
    region:        Uuid,
    region_name:   String,
    district:      Uuid,
    district_name: String,
  },
}

impl Level {
  pub fn key(&self) -> QueryKey {
    match self {
      Self::Regions => QueryKey::Regions,
      Self::Districts { region, .. } => QueryKey::children(Table::Districts, *region),
      Self::Parishes { district, .. } => QueryKey::children(Table::Parishes, *district),
    }
  }

  /// This list and the ones above it, so that going back up is instant.
  pub fn keys(&self) -> Vec<QueryKey> {
    match self {
      Self::Regions => vec![QueryKey::Regions],
      Self::Districts { region, .. } => {
        vec![QueryKey::Regions, QueryKey::children(Table::Districts, *region)]
      }
      Self::Parishes { region, district, .. } => vec![
        QueryKey::Regions,
        QueryKey::children(Table::Districts, *region),
        QueryKey::children(Table::Parishes, *district),
      ],
    }
  }

  pub fn kind(&self) -> EntityKind {
    match self {
      Self::Regions => EntityKind::Region,
      Self::Districts { .. } => EntityKind::District,
      Self::Parishes { .. } => EntityKind::Parish,
    }
  }

  pub fn title(&self) -> &'static str {
    match self {
      Self::Regions => "Regions",
      Self::Districts { .. } => "Districts",
      Self::Parishes { .. } => "Parishes",
    }
  }

  /// Owner of the listed entities.
  fn parent(&self) -> Option<Uuid> {
    match self {
      Self::Regions => None,
      Self::Districts { region, .. } => Some(*region),
      Self::Parishes { district, .. } => Some(*district),
    }
  }
}

/// One row of the navigator list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
  pub id:   Uuid,
  pub name: String,
  pub code: String,
}

fn entries<T: Named + Record>(items: &[T], filter: &str) -> Vec<Entry> {
  let entry = |item: &T| Entry {
    id:   item.id(),
    name: item.name().to_owned(),
    code: item.code().to_owned(),
  };

  let exact = search(items, filter);
  if !exact.is_empty() || filter.trim().is_empty() {
    return exact.into_iter().map(entry).collect();
  }
  let matcher = SkimMatcherV2::default();
  items
    .iter()
    .filter(|item| matcher.fuzzy_match(item.name(), filter.trim()).is_some())
    .map(entry)
    .collect()
}

// ─── Modes and messages ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  /// Typing into the navigator filter.
  Filter,
  /// Typing the name of a new entity for the current level.
  Create { name: String },
  /// Waiting for `y` to delete the entry.
  ConfirmDelete(Entry),
}

/// Completion of a spawned task.
#[derive(Debug)]
pub enum Msg {
  Fetched(Ticket, CoreResult<Fetched>),
  Created(CoreResult<Invalidation>),
  Deleted(EntityRef, CoreResult<Invalidation>),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S> {
  pub session: Session,
  pub cache:   QueryCache,
  pub level:   Level,
  /// Cursor position within the *filtered* navigator list.
  pub cursor:  usize,
  pub filter:  String,
  pub mode:    Mode,
  pub status:  Arc<StatusLine>,
  svc:         Arc<S>,
  tx:          mpsc::UnboundedSender<Msg>,
  rx:          mpsc::UnboundedReceiver<Msg>,
}

impl<S> App<S>
where
  S: DataService + 'static,
{
  /// Start on the region list with nothing selected, and request it.
  pub fn new(svc: S) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = Self {
      session: Session::new(),
      cache: QueryCache::new(),
      level: Level::Regions,
      cursor: 0,
      filter: String::new(),
      mode: Mode::Normal,
      status: Arc::new(StatusLine::default()),
      svc: Arc::new(svc),
      tx,
      rx,
    };
    app.sync();
    app
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  pub fn route(&self) -> Route { route(self.session.section(), self.session.active()) }

  /// Navigator rows after the filter.
  pub fn entries(&self) -> Vec<Entry> {
    match &self.level {
      Level::Regions => entries::<Region>(self.cache.regions(), &self.filter),
      Level::Districts { region, .. } => {
        entries::<District>(self.cache.districts(*region), &self.filter)
      }
      Level::Parishes { district, .. } => {
        entries::<Parish>(self.cache.parishes(*district), &self.filter)
      }
    }
  }

  pub fn cursor_entry(&self) -> Option<Entry> { self.entries().into_iter().nth(self.cursor) }

  /// `Region › District › Parish` down to the active entity.
  pub fn breadcrumb(&self) -> String {
    let mut parts: Vec<String> = match &self.level {
      Level::Regions => Vec::new(),
      Level::Districts { region_name, .. } => vec![region_name.clone()],
      Level::Parishes { region_name, district_name, .. } => {
        vec![region_name.clone(), district_name.clone()]
      }
    };
    if let Some(EntityRef { kind: EntityKind::Parish, id }) = self.session.active()
      && let Level::Parishes { district, .. } = &self.level
      && let Some(parish) = self.cache.parishes(*district).iter().find(|p| p.id == id)
    {
      parts.push(parish.name.clone());
    }
    parts.join(" › ")
  }

  /// True while any query of the current view is outstanding.
  pub fn loading(&self) -> bool {
    self
      .level
      .keys()
      .into_iter()
      .chain(self.route().queries())
      .any(|key| self.cache.is_loading(&key))
  }

  // ── Fetching ──────────────────────────────────────────────────────────────

  /// Point the cache at the current view and fetch what it lacks.
  fn sync(&mut self) {
    let mut keys = self.level.keys();
    keys.extend(self.route().queries());
    for ticket in self.cache.focus(keys) {
      self.spawn_fetch(ticket);
    }
  }

  fn spawn_fetch(&self, ticket: Ticket) {
    let svc = self.svc.clone();
    let tx = self.tx.clone();
    tracing::debug!(key = ?ticket.key, "fetching");
    tokio::spawn(async move {
      let result = fetch_key(&*svc, ticket.key).await;
      let _ = tx.send(Msg::Fetched(ticket, result));
    });
  }

  fn refetch(&mut self, invalidation: &Invalidation) {
    for ticket in self.cache.invalidate(invalidation) {
      self.spawn_fetch(ticket);
    }
  }

  /// Apply every message that has already arrived. Returns whether any did.
  pub fn drain(&mut self) -> bool {
    let mut any = false;
    while let Ok(msg) = self.rx.try_recv() {
      self.handle_msg(msg);
      any = true;
    }
    any
  }

  /// Wait for the next message and apply it.
  pub async fn recv(&mut self) -> bool {
    match self.rx.recv().await {
      Some(msg) => {
        self.handle_msg(msg);
        true
      }
      None => false,
    }
  }

  fn handle_msg(&mut self, msg: Msg) {
    match msg {
      Msg::Fetched(ticket, result) => {
        self.cache.apply(ticket, result, &*self.status);
        self.clamp_cursor();
      }
      Msg::Created(Ok(invalidation)) => self.refetch(&invalidation),
      Msg::Deleted(entity, Ok(invalidation)) => {
        if self.session.active() == Some(entity) {
          self.select_level_parent();
          self.sync();
        }
        self.refetch(&invalidation);
      }
      // Already notified by the mutation. A write that landed but could not
      // be read back still changed the lists.
      Msg::Created(Err(err)) | Msg::Deleted(_, Err(err)) => {
        if let Some(invalidation) = err.invalidation() {
          self.refetch(&invalidation);
        }
      }
    }
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  fn clamp_cursor(&mut self) {
    let len = self.entries().len();
    if self.cursor >= len {
      self.cursor = len.saturating_sub(1);
    }
  }

  /// Keep the section if the new entity kind offers it, else fall back to
  /// the overview.
  fn conform_section(&mut self) {
    if let Some(active) = self.session.active()
      && !sections_for(active.kind).contains(self.session.section())
    {
      self.session.set_section(Section::Overview);
    }
  }

  /// Make the owner of the listed entities the active one.
  fn select_level_parent(&mut self) {
    match &self.level {
      Level::Regions => self.session.clear(),
      Level::Districts { region, .. } => self.session.select_region(*region),
      Level::Parishes { region, district, .. } => {
        self.session.select_district(*district, Some(*region))
      }
    }
    self.conform_section();
  }

  /// Select the entry under the cursor and, above parish level, descend
  /// into its children.
  fn descend(&mut self) {
    let Some(entry) = self.cursor_entry() else { return };
    let next = match &self.level {
      Level::Regions => {
        self.session.select_region(entry.id);
        Some(Level::Districts { region: entry.id, region_name: entry.name })
      }
      Level::Districts { region, region_name } => {
        self.session.select_district(entry.id, Some(*region));
        Some(Level::Parishes {
          region:        *region,
          region_name:   region_name.clone(),
          district:      entry.id,
          district_name: entry.name,
        })
      }
      Level::Parishes { district, .. } => {
        self.session.select_parish(entry.id, Some(*district));
        None
      }
    };
    if let Some(level) = next {
      self.level = level;
      self.cursor = 0;
      self.filter.clear();
    }
    self.conform_section();
    self.sync();
  }

  /// Go up one level and select the owner of the list returned to.
  fn ascend(&mut self) {
    if self.level == Level::Regions {
      self.session.clear();
      self.sync();
      return;
    }
    let (up, owner) = match &self.level {
      Level::Regions => return,
      Level::Districts { region, .. } => (Level::Regions, *region),
      Level::Parishes { region, region_name, district, .. } => (
        Level::Districts { region: *region, region_name: region_name.clone() },
        *district,
      ),
    };
    self.level = up;
    self.filter.clear();
    self.select_level_parent();
    self.cursor = self
      .entries()
      .iter()
      .position(|e| e.id == owner)
      .unwrap_or(0);
    self.sync();
  }

  /// Step through the active entity's sections.
  fn cycle_section(&mut self, forward: bool) {
    let Some(active) = self.session.active() else { return };
    let sections = sections_for(active.kind);
    let current = sections
      .iter()
      .position(|s| s == self.session.section())
      .unwrap_or(0);
    let next = if forward {
      (current + 1) % sections.len()
    } else {
      (current + sections.len() - 1) % sections.len()
    };
    self.session.set_section(sections[next].clone());
    self.sync();
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  fn spawn_create(&self, name: String) {
    let svc = self.svc.clone();
    let status = self.status.clone();
    let tx = self.tx.clone();
    let kind = self.level.kind();
    let parent = self.level.parent();
    let code = generate_code(kind, &name, parent, &mut OsRng);

    tokio::spawn(async move {
      let notifier: &dyn Notifier = &*status;
      let result = match (kind, parent) {
        (EntityKind::Region, _) => {
          let input = NewRegion { name, code, superintendent: None };
          create(&*svc, notifier, &input).await.map(|m| m.invalidation)
        }
        (EntityKind::District, Some(region_id)) => {
          let input = NewDistrict { name, code, superintendent: None, region_id };
          create(&*svc, notifier, &input).await.map(|m| m.invalidation)
        }
        (EntityKind::Parish, Some(district_id)) => {
          let input = NewParish { name, code, pastor: None, district_id };
          create(&*svc, notifier, &input).await.map(|m| m.invalidation)
        }
        (_, None) => return,
      };
      let _ = tx.send(Msg::Created(result));
    });
  }

  fn spawn_delete(&self, entry: Entry) {
    let svc = self.svc.clone();
    let status = self.status.clone();
    let tx = self.tx.clone();
    let entity = EntityRef { kind: self.level.kind(), id: entry.id };

    tokio::spawn(async move {
      let notifier: &dyn Notifier = &*status;
      let result = match entity.kind {
        EntityKind::Region => delete::<_, Region>(&*svc, notifier, entity.id).await,
        EntityKind::District => delete::<_, District>(&*svc, notifier, entity.id).await,
        EntityKind::Parish => delete::<_, Parish>(&*svc, notifier, entity.id).await,
      };
      let _ = tx.send(Msg::Deleted(entity, result));
    });
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    match std::mem::replace(&mut self.mode, Mode::Normal) {
      Mode::Normal => return self.handle_normal_key(key),
      Mode::Filter => self.handle_filter_key(key),
      Mode::Create { name } => self.handle_create_key(key, name),
      Mode::ConfirmDelete(entry) => {
        if key.code == KeyCode::Char('y') {
          self.spawn_delete(entry);
        } else {
          self.status.notify(NoticeKind::Info, "Delete cancelled");
        }
      }
    }
    true
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.filter.clear(),
      KeyCode::Enter => {}
      KeyCode::Backspace => {
        self.filter.pop();
        self.mode = Mode::Filter;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.mode = Mode::Filter;
      }
      _ => self.mode = Mode::Filter,
    }
    self.cursor = 0;
  }

  fn handle_create_key(&mut self, key: KeyEvent, mut name: String) {
    match key.code {
      KeyCode::Esc => {}
      KeyCode::Enter => self.spawn_create(name),
      KeyCode::Backspace => {
        name.pop();
        self.mode = Mode::Create { name };
      }
      KeyCode::Char(c) => {
        name.push(c);
        self.mode = Mode::Create { name };
      }
      _ => self.mode = Mode::Create { name },
    }
  }

  fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.entries().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => self.descend(),
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.ascend(),

      KeyCode::Tab => self.cycle_section(true),
      KeyCode::BackTab => self.cycle_section(false),

      KeyCode::Char('r') => {
        self.status.clear();
        for ticket in self.cache.refresh() {
          self.spawn_fetch(ticket);
        }
      }
      KeyCode::Char('/') => {
        self.filter.clear();
        self.cursor = 0;
        self.mode = Mode::Filter;
      }
      KeyCode::Char('a') => self.mode = Mode::Create { name: String::new() },
      KeyCode::Char('x') => {
        if let Some(entry) = self.cursor_entry() {
          self.mode = Mode::ConfirmDelete(entry);
        }
      }
      _ => {}
    }
    true
  }
}
