//! Error types for `ecclesia-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{query::Invalidation, table::Table};

#[derive(Debug, Error)]
pub enum Error {
  /// The data service rejected or failed to run a request.
  #[error("data service error: {0}")]
  Service(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A row returned by the data service did not match the typed record.
  #[error("malformed {table} row: {source}")]
  Decode {
    table:  Table,
    #[source]
    source: serde_json::Error,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Input rejected before it reached the data service.
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("{table} {id} not found")]
  NotFound { table: Table, id: Uuid },

  /// The write was applied but the row it returned could not be decoded.
  #[error("{table} row was written but could not be read back: {source}")]
  Unreadable {
    table:        Table,
    invalidation: Invalidation,
    #[source]
    source:       Box<Error>,
  },
}

impl Error {
  /// Wrap any data-service error.
  pub fn service<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Service(Box::new(err))
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  /// What a failed mutation still made stale. Only a write that landed
  /// before the error has anything to invalidate.
  pub fn invalidation(&self) -> Option<Invalidation> {
    match self {
      Self::Unreadable { invalidation, .. } => Some(*invalidation),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
