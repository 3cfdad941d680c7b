//! Error types for `paperflow-core`.
//!
//! Every failure a workflow operation can produce maps onto one stable
//! [`ErrorKind`], which the HTTP layer turns into a status code.

use serde::Serialize;
use thiserror::Error;

/// The stable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  Forbidden,
  Unauthorized,
  Storage,
}

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed input.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("not found: {0}")]
  NotFound(String),

  /// State or uniqueness violation.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  /// Backing-store failure. Never partially applied.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }

  pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

  pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

  pub fn unauthorized(msg: impl Into<String>) -> Self {
    Self::Unauthorized(msg.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::Conflict(_) => ErrorKind::Conflict,
      Self::Forbidden(_) => ErrorKind::Forbidden,
      Self::Unauthorized(_) => ErrorKind::Unauthorized,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fail with [`Error::Validation`] naming `field` when `value` is blank.
pub(crate) fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(format!("missing field: {field}")));
  }
  Ok(())
}
