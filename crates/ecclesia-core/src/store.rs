//! The `DataService` trait: the relational backend the dashboard runs on.
//!
//! The trait is implemented by storage backends (`ecclesia-store-sqlite`)
//! and by remote clients (the CLI's HTTP client). Everything above it
//! (fetchers, mutations, the API router) depends on this abstraction, not on
//! a concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::table::{Query, Row, Table};

/// Coarse class of a data-service failure, for transports that report it
/// (an HTTP status, a notification wording).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
  /// The addressed row does not exist.
  NotFound,
  /// The request named an unknown column or carried a malformed value.
  Invalid,
  /// A foreign-key or uniqueness rule rejected the write.
  Conflict,
  Internal,
}

/// Filtered select, insert, update and delete over named tables, plus the
/// two read-only nested selects the hierarchy views need.
///
/// Rows are untyped JSON maps; typing happens once, in
/// [`crate::fetch`] and [`crate::mutate`].
pub trait DataService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Classify an error returned by this service.
  fn failure(_err: &Self::Error) -> Failure
  where
    Self: Sized,
  {
    Failure::Internal
  }

  // ── Flat tables ───────────────────────────────────────────────────────

  /// Rows of `table` matching `query`, in the order the query asks for
  /// (insertion order when it names none).
  fn select<'a>(
    &'a self,
    table: Table,
    query: &'a Query,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// Insert a row and return it as stored (with its generated `id`).
  fn insert(
    &self,
    table: Table,
    row: Row,
  ) -> impl Future<Output = Result<Row, Self::Error>> + Send + '_;

  /// Overwrite the columns present in `patch` on row `id` and return the
  /// updated row. Fails if the row does not exist.
  fn update(
    &self,
    table: Table,
    id: Uuid,
    patch: Row,
  ) -> impl Future<Output = Result<Row, Self::Error>> + Send + '_;

  /// Delete row `id`. Fails if it does not exist or still has children.
  fn delete(
    &self,
    table: Table,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Nested reads ──────────────────────────────────────────────────────

  /// A region row with a `districts` array, each district carrying a
  /// `parishes` array, each parish carrying a `member_count`. `None` if the
  /// region does not exist.
  fn region_tree(
    &self,
    region_id: Uuid,
  ) -> impl Future<Output = Result<Option<Row>, Self::Error>> + Send + '_;

  /// A district row with `region_name` and a `parishes` array carrying
  /// `member_count`. `None` if the district does not exist.
  fn district_tree(
    &self,
    district_id: Uuid,
  ) -> impl Future<Output = Result<Option<Row>, Self::Error>> + Send + '_;
}
