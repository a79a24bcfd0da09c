//! SQL schema and column catalogue for the Ecclesia SQLite store.
//!
//! Every table has a text `id` primary key and, below regions, a foreign key
//! to its parent. Rows keep SQLite's implicit `rowid`, which is what
//! "insertion order" means for unordered selects.

use ecclesia_core::table::Table;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS regions (
    id             TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    code           TEXT NOT NULL DEFAULT '',
    superintendent TEXT
);

CREATE TABLE IF NOT EXISTS districts (
    id             TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    code           TEXT NOT NULL DEFAULT '',
    superintendent TEXT,
    region_id      TEXT NOT NULL REFERENCES regions(id)
);

CREATE TABLE IF NOT EXISTS parishes (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    code        TEXT NOT NULL DEFAULT '',
    pastor      TEXT,
    district_id TEXT NOT NULL REFERENCES districts(id)
);

CREATE TABLE IF NOT EXISTS communities (
    id        TEXT PRIMARY KEY,
    parish_id TEXT NOT NULL REFERENCES parishes(id),
    name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS members (
    id              TEXT PRIMARY KEY,
    parish_id       TEXT NOT NULL REFERENCES parishes(id),
    last_name       TEXT NOT NULL,
    first_names     TEXT NOT NULL,
    role            TEXT NOT NULL DEFAULT 'Member',
    phone           TEXT,
    email           TEXT,
    address         TEXT,
    profession      TEXT,
    marital_status  TEXT,
    birth_date      TEXT,
    birth_place     TEXT,
    baptism_date    TEXT,
    baptism_place   TEXT,
    membership_date TEXT NOT NULL,
    community       TEXT,
    ministries      TEXT NOT NULL DEFAULT '[]',   -- JSON array of names
    observations    TEXT
);

CREATE TABLE IF NOT EXISTS census_records (
    id          TEXT PRIMARY KEY,
    parish_id   TEXT NOT NULL REFERENCES parishes(id),
    community   TEXT NOT NULL,
    head_count  INTEGER NOT NULL CHECK (head_count >= 0),
    recorded_on TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assets (
    id              TEXT PRIMARY KEY,
    parish_id       TEXT NOT NULL REFERENCES parishes(id),
    designation     TEXT NOT NULL,
    asset_type      TEXT NOT NULL,
    value           REAL NOT NULL DEFAULT 0 CHECK (value >= 0),
    acquired_on     TEXT,
    condition       TEXT NOT NULL,
    owner_kind      TEXT NOT NULL DEFAULT 'parish',
    owner_community TEXT,
    documents       TEXT NOT NULL DEFAULT '[]'    -- JSON array of URLs
);

CREATE TABLE IF NOT EXISTS services (
    id           TEXT PRIMARY KEY,
    parish_id    TEXT NOT NULL REFERENCES parishes(id),
    name         TEXT NOT NULL,
    day          TEXT NOT NULL,
    date         TEXT NOT NULL,
    starts_at    TEXT NOT NULL,
    ends_at      TEXT NOT NULL,
    location     TEXT,
    responsible  TEXT,
    description  TEXT,
    community_id TEXT REFERENCES communities(id)
);

CREATE TABLE IF NOT EXISTS activities (
    id         TEXT PRIMARY KEY,
    parish_id  TEXT NOT NULL REFERENCES parishes(id),
    kind       TEXT NOT NULL,
    date       TEXT NOT NULL,
    location   TEXT,
    community  TEXT,
    comments   TEXT,
    extra_info TEXT
);

CREATE INDEX IF NOT EXISTS districts_region_idx   ON districts(region_id);
CREATE INDEX IF NOT EXISTS parishes_district_idx  ON parishes(district_id);
CREATE INDEX IF NOT EXISTS members_parish_idx     ON members(parish_id);
CREATE INDEX IF NOT EXISTS census_parish_idx      ON census_records(parish_id);
CREATE INDEX IF NOT EXISTS assets_parish_idx      ON assets(parish_id);
CREATE INDEX IF NOT EXISTS services_parish_idx    ON services(parish_id);
CREATE INDEX IF NOT EXISTS activities_parish_idx  ON activities(parish_id);
CREATE INDEX IF NOT EXISTS communities_parish_idx ON communities(parish_id);

PRAGMA user_version = 1;
";

/// How a column's JSON value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  Text,
  Integer,
  Real,
  /// Arbitrary JSON, stored as its text encoding.
  Json,
}

pub type Column = (&'static str, Kind);

/// Columns of `table`, `id` first, in DDL order.
pub fn columns(table: Table) -> &'static [Column] {
  use Kind::*;
  match table {
    Table::Regions => &[
      ("id", Text),
      ("name", Text),
      ("code", Text),
      ("superintendent", Text),
    ],
    Table::Districts => &[
      ("id", Text),
      ("name", Text),
      ("code", Text),
      ("superintendent", Text),
      ("region_id", Text),
    ],
    Table::Parishes => &[
      ("id", Text),
      ("name", Text),
      ("code", Text),
      ("pastor", Text),
      ("district_id", Text),
    ],
    Table::Communities => &[("id", Text), ("parish_id", Text), ("name", Text)],
    Table::Members => &[
      ("id", Text),
      ("parish_id", Text),
      ("last_name", Text),
      ("first_names", Text),
      ("role", Text),
      ("phone", Text),
      ("email", Text),
      ("address", Text),
      ("profession", Text),
      ("marital_status", Text),
      ("birth_date", Text),
      ("birth_place", Text),
      ("baptism_date", Text),
      ("baptism_place", Text),
      ("membership_date", Text),
      ("community", Text),
      ("ministries", Json),
      ("observations", Text),
    ],
    Table::CensusRecords => &[
      ("id", Text),
      ("parish_id", Text),
      ("community", Text),
      ("head_count", Integer),
      ("recorded_on", Text),
    ],
    Table::Assets => &[
      ("id", Text),
      ("parish_id", Text),
      ("designation", Text),
      ("asset_type", Text),
      ("value", Real),
      ("acquired_on", Text),
      ("condition", Text),
      ("owner_kind", Text),
      ("owner_community", Text),
      ("documents", Json),
    ],
    Table::Services => &[
      ("id", Text),
      ("parish_id", Text),
      ("name", Text),
      ("day", Text),
      ("date", Text),
      ("starts_at", Text),
      ("ends_at", Text),
      ("location", Text),
      ("responsible", Text),
      ("description", Text),
      ("community_id", Text),
    ],
    Table::Activities => &[
      ("id", Text),
      ("parish_id", Text),
      ("kind", Text),
      ("date", Text),
      ("location", Text),
      ("community", Text),
      ("comments", Text),
      ("extra_info", Text),
    ],
  }
}

/// The declared column called `name`, if any. Only names returned from
/// here are ever interpolated into SQL.
pub fn column(table: Table, name: &str) -> Option<Column> {
  columns(table).iter().copied().find(|(n, _)| *n == name)
}
