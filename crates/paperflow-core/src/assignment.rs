//! Assignments: the binding of a faculty member to a subject and duty for a
//! regulation cycle, with its acceptance and paper-status sub-state.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, error::require};

// ─── Duty role ───────────────────────────────────────────────────────────────

/// The duty category of an assignment, e.g. `"setter"` or `"scrutiny"`.
///
/// Role strings arrive un-normalised, so the text is kept as entered for
/// display while every comparison goes through [`DutyRole::key`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DutyRole(String);

impl DutyRole {
  pub fn new(role: impl Into<String>) -> Self { Self(role.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Canonical form used for matching and for the storage uniqueness key.
  pub fn key(&self) -> String { self.0.trim().to_lowercase() }

  pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
}

impl PartialEq for DutyRole {
  fn eq(&self, other: &Self) -> bool { self.key() == other.key() }
}

impl Eq for DutyRole {}

impl fmt::Display for DutyRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for DutyRole {
  fn from(s: &str) -> Self { Self::new(s) }
}

// ─── States ──────────────────────────────────────────────────────────────────

/// A faculty member's answer to an assignment offer.
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
#[strum(serialize_all = "lowercase")]
pub enum Decision {
  Yes,
  No,
}

/// Progress of the question paper owed under an assignment.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::AsRefStr,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaperStatus {
  #[default]
  Pending,
  Submitted,
  Approved,
  Rejected,
}

impl PaperStatus {
  /// pending → submitted → {approved, rejected}; nothing regresses.
  pub fn can_advance_to(self, next: PaperStatus) -> bool {
    matches!(
      (self, next),
      (Self::Pending, Self::Submitted)
        | (Self::Submitted, Self::Approved)
        | (Self::Submitted, Self::Rejected)
    )
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The uniqueness key of an assignment. `role` matches canonically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentKey {
  pub faculty_id:   String,
  pub subject_code: String,
  pub role:         DutyRole,
}

impl AssignmentKey {
  pub fn new(
    faculty_id: impl Into<String>,
    subject_code: impl Into<String>,
    role: impl Into<DutyRole>,
  ) -> Self {
    Self {
      faculty_id:   faculty_id.into(),
      subject_code: subject_code.into(),
      role:         role.into(),
    }
  }

  /// Trim the text fields and reject blanks.
  pub fn validated(self) -> Result<Self> {
    require("facultyId", &self.faculty_id)?;
    require("subjectCode", &self.subject_code)?;
    if self.role.is_blank() {
      return Err(Error::validation("missing field: role"));
    }
    Ok(Self {
      faculty_id:   self.faculty_id.trim().to_owned(),
      subject_code: self.subject_code.trim().to_owned(),
      role:         DutyRole::new(self.role.as_str().trim()),
    })
  }
}

impl fmt::Display for AssignmentKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {}, {})", self.faculty_id, self.subject_code, self.role.key())
  }
}

/// A unit of work offered to a faculty member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
  pub id:                    Uuid,
  pub faculty_id:            String,
  pub faculty_name:          String,
  pub subject_code:          String,
  pub subject_name:          String,
  pub regulation:            String,
  pub role:                  DutyRole,
  /// `None` until the faculty member answers; immutable afterwards.
  pub response:              Option<Decision>,
  /// Always `response == Some(Decision::Yes)`.
  pub is_assigned:           bool,
  pub question_paper_status: PaperStatus,
  pub created_at:            DateTime<Utc>,
  pub deadline_date:         NaiveDate,
  pub assigned_by:           String,
}

impl Assignment {
  pub fn key(&self) -> AssignmentKey {
    AssignmentKey::new(&self.faculty_id, &self.subject_code, self.role.clone())
  }

  /// The single Unresponded → Accepted | Declined transition.
  pub fn ensure_can_respond(&self) -> Result<()> {
    match self.response {
      None => Ok(()),
      Some(previous) => Err(Error::conflict(format!(
        "already responded {previous} to assignment {}",
        self.key()
      ))),
    }
  }

  /// Set `response` and the derived `is_assigned`.
  pub fn apply_response(&mut self, decision: Decision) -> Result<()> {
    self.ensure_can_respond()?;
    self.response = Some(decision);
    self.is_assigned = decision == Decision::Yes;
    Ok(())
  }

  /// Papers may only be submitted against an accepted assignment.
  pub fn ensure_accepts_paper(&self) -> Result<()> {
    if self.response != Some(Decision::Yes) {
      return Err(Error::conflict(format!(
        "assignment {} has not been accepted",
        self.key()
      )));
    }
    Ok(())
  }

  /// Move `question_paper_status` forward to `next`.
  pub fn advance_paper_status(&mut self, next: PaperStatus) -> Result<()> {
    if !self.question_paper_status.can_advance_to(next) {
      return Err(Error::conflict(format!(
        "assignment {} paper status cannot move from {} to {next}",
        self.key(),
        self.question_paper_status
      )));
    }
    self.question_paper_status = next;
    Ok(())
  }
}

/// Input to [`crate::store::WorkflowStore::insert_assignment`].
#[derive(Debug, Clone)]
pub struct NewAssignment {
  pub faculty_id:   String,
  pub faculty_name: String,
  pub subject_code: String,
  pub subject_name: String,
  pub regulation:   String,
  pub role:         DutyRole,
  pub deadline:     NaiveDate,
}

impl NewAssignment {
  /// Trim every text field and reject blanks.
  pub fn validated(self) -> Result<Self> {
    let key = AssignmentKey::new(self.faculty_id, self.subject_code, self.role)
      .validated()?;
    require("facultyName", &self.faculty_name)?;
    require("subjectName", &self.subject_name)?;
    require("regulation", &self.regulation)?;
    Ok(Self {
      faculty_id:   key.faculty_id,
      faculty_name: self.faculty_name.trim().to_owned(),
      subject_code: key.subject_code,
      subject_name: self.subject_name.trim().to_owned(),
      regulation:   self.regulation.trim().to_owned(),
      role:         key.role,
      deadline:     self.deadline,
    })
  }
}

/// Parameters for [`crate::store::WorkflowStore::list_assignments`].
#[derive(Debug, Clone, Default)]
pub struct AssignmentQuery {
  pub faculty_id: Option<String>,
}

/// Keep the first (newest) assignment per uniqueness key.
pub fn dedupe_by_key(assignments: Vec<Assignment>) -> Vec<Assignment> {
  let mut seen = std::collections::HashSet::new();
  assignments
    .into_iter()
    .filter(|a| {
      seen.insert((a.faculty_id.clone(), a.subject_code.clone(), a.role.key()))
    })
    .collect()
}
