//! Error type for `ecclesia-store-sqlite`.

use ecclesia_core::table::Table;
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A foreign-key, NOT NULL or CHECK rule rejected the statement.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("{table} has no column {column:?}")]
  UnknownColumn { table: Table, column: String },

  #[error("bad value for {table}.{column}: {reason}")]
  Column {
    table:  Table,
    column: String,
    reason: String,
  },

  #[error("{table} {id} not found")]
  NotFound { table: Table, id: uuid::Uuid },
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message))
        if code.code == ErrorCode::ConstraintViolation =>
      {
        Self::Constraint(message.unwrap_or_else(|| code.to_string()))
      }
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
