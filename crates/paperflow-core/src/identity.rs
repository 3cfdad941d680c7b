//! The caller's Identity Context.
//!
//! Authentication happens upstream. Every workflow call receives an
//! already-authenticated [`Identity`] and performs only authorization against
//! it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The coarse role carried by an identity.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  Admin,
  Faculty,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
  Admin {
    /// Recorded as `assignedBy` on assignments this admin creates.
    username: Option<String>,
  },
  Faculty { faculty_id: String },
}

impl Identity {
  /// Build an identity from the raw role string and optional identifiers
  /// supplied by the authenticating collaborator.
  ///
  /// Faculty identities must carry a non-blank faculty id.
  pub fn from_parts(
    role: &str,
    faculty_id: Option<String>,
    username: Option<String>,
  ) -> Result<Self> {
    let role: Role = role
      .trim()
      .parse()
      .map_err(|_| Error::unauthorized(format!("unrecognised role {role:?}")))?;

    match role {
      Role::Admin => Ok(Self::Admin {
        username: username.filter(|u| !u.trim().is_empty()),
      }),
      Role::Faculty => {
        let faculty_id = faculty_id
          .map(|id| id.trim().to_owned())
          .filter(|id| !id.is_empty())
          .ok_or_else(|| Error::unauthorized("faculty identity without a faculty id"))?;
        Ok(Self::Faculty { faculty_id })
      }
    }
  }

  pub fn admin() -> Self { Self::Admin { username: None } }

  pub fn faculty(faculty_id: impl Into<String>) -> Self {
    Self::Faculty { faculty_id: faculty_id.into() }
  }

  pub fn role(&self) -> Role {
    match self {
      Self::Admin { .. } => Role::Admin,
      Self::Faculty { .. } => Role::Faculty,
    }
  }

  pub fn is_admin(&self) -> bool { matches!(self, Self::Admin { .. }) }

  pub fn faculty_id(&self) -> Option<&str> {
    match self {
      Self::Admin { .. } => None,
      Self::Faculty { faculty_id } => Some(faculty_id),
    }
  }

  /// Name recorded against records this identity creates.
  pub fn principal(&self) -> &str {
    match self {
      Self::Admin { username } => username.as_deref().unwrap_or("admin"),
      Self::Faculty { faculty_id } => faculty_id,
    }
  }

  pub fn require_admin(&self, action: &str) -> Result<()> {
    if self.is_admin() {
      Ok(())
    } else {
      Err(Error::forbidden(format!("{action} requires an admin identity")))
    }
  }

  /// The caller's own faculty id; admins are refused.
  pub fn require_faculty(&self, action: &str) -> Result<&str> {
    self
      .faculty_id()
      .ok_or_else(|| Error::forbidden(format!("{action} requires a faculty identity")))
  }

  /// Admins may act for anyone; faculty only for themselves.
  pub fn may_act_for(&self, faculty_id: &str) -> bool {
    match self {
      Self::Admin { .. } => true,
      Self::Faculty { faculty_id: own } => own == faculty_id,
    }
  }
}
