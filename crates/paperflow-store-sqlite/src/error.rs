//! Error type for `paperflow-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A workflow rule refused the operation (not found, conflict, ...).
  #[error(transparent)]
  Core(#[from] paperflow_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// Errors raised inside a `Connection::call` closure travel as
// `tokio_rusqlite::Error::Other` and are unpacked again on the way out.
impl From<Error> for tokio_rusqlite::Error {
  fn from(e: Error) -> Self { tokio_rusqlite::Error::Other(Box::new(e)) }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Error>() {
        Ok(own) => *own,
        Err(other) => Error::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Error::Database(other),
    }
  }
}

impl From<Error> for paperflow_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      other => paperflow_core::Error::Storage(Box::new(other)),
    }
  }
}

/// Whether `e` is a UNIQUE / PRIMARY KEY violation.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.code == rusqlite::ErrorCode::ConstraintViolation
        && matches!(
          f.extended_code,
          rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
  )
}
