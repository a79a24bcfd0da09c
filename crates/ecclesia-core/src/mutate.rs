//! Insert, update and delete with user notification.
//!
//! Each operation validates its input before touching the data service,
//! notifies success or failure, and on success returns the [`Invalidation`]
//! the caller should feed to its [`QueryCache`](crate::query::QueryCache).
//! A failed call is assumed to have applied nothing, except
//! [`Error::Unreadable`]: the write landed and the error carries the
//! invalidation.

use uuid::Uuid;

use crate::{
  Error, Result,
  notify::{NoticeKind, Notifier},
  query::Invalidation,
  record::{NewRecord, Record},
  store::DataService,
  table::{Row, Table},
};

/// A stored record and what its write made stale.
#[derive(Debug, Clone)]
pub struct Mutated<R> {
  pub record:       R,
  pub invalidation: Invalidation,
}

fn capitalized(table: Table) -> String {
  let noun = table.noun();
  let mut chars = noun.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Run `input.validate()`, notifying on rejection.
fn checked<N: NewRecord>(input: &N, notifier: &dyn Notifier) -> Result<()> {
  input.validate().inspect_err(|err| {
    notifier.notify(NoticeKind::Error, &err.to_string());
  })
}

/// Decode the row a write returned. A failure here means the write landed, so
/// the caller is told and still gets the invalidation.
fn read_back<R: Record>(notifier: &dyn Notifier, action: &str, stored: Row) -> Result<R> {
  R::from_row(stored).map_err(|err| {
    let table = R::TABLE;
    tracing::warn!(%table, %err, "{action} applied but unreadable");
    notifier.notify(
      NoticeKind::Error,
      &format!("{} {action}d, but could not be read back: {err}", capitalized(table)),
    );
    Error::Unreadable {
      table,
      invalidation: Invalidation::of(table),
      source: Box::new(err),
    }
  })
}

/// Notify and wrap a data-service failure.
fn failed<E>(notifier: &dyn Notifier, action: &str, table: Table, err: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  tracing::warn!(%table, %err, "{action} failed");
  notifier.notify(
    NoticeKind::Error,
    &format!("Could not {action} {}: {err}", table.noun()),
  );
  Error::service(err)
}

pub async fn create<S, N>(
  svc: &S,
  notifier: &dyn Notifier,
  input: &N,
) -> Result<Mutated<N::Record>>
where
  S: DataService,
  N: NewRecord,
{
  let table = N::Record::TABLE;
  checked(input, notifier)?;
  let row = input.to_row()?;

  let stored = svc
    .insert(table, row)
    .await
    .map_err(|e| failed(notifier, "create", table, e))?;
  let record: N::Record = read_back(notifier, "create", stored)?;

  tracing::info!(%table, id = %record.id(), "created");
  notifier.notify(NoticeKind::Success, &format!("{} created", capitalized(table)));
  Ok(Mutated { record, invalidation: Invalidation::of(table) })
}

/// Overwrite every field of record `id` with `input`.
pub async fn update<S, N>(
  svc: &S,
  notifier: &dyn Notifier,
  id: Uuid,
  input: &N,
) -> Result<Mutated<N::Record>>
where
  S: DataService,
  N: NewRecord,
{
  let table = N::Record::TABLE;
  checked(input, notifier)?;
  let patch = input.to_row()?;

  let stored = svc
    .update(table, id, patch)
    .await
    .map_err(|e| failed(notifier, "update", table, e))?;
  let record: N::Record = read_back(notifier, "update", stored)?;

  tracing::info!(%table, %id, "updated");
  notifier.notify(NoticeKind::Success, &format!("{} updated", capitalized(table)));
  Ok(Mutated { record, invalidation: Invalidation::of(table) })
}

/// Delete the `R` with primary key `id`. Callers gate this behind an
/// explicit confirmation.
pub async fn delete<S, R>(svc: &S, notifier: &dyn Notifier, id: Uuid) -> Result<Invalidation>
where
  S: DataService,
  R: Record,
{
  let table = R::TABLE;
  svc
    .delete(table, id)
    .await
    .map_err(|e| failed(notifier, "delete", table, e))?;

  tracing::info!(%table, %id, "deleted");
  notifier.notify(NoticeKind::Success, &format!("{} deleted", capitalized(table)));
  Ok(Invalidation::of(table))
}
