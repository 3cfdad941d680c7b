//! Faculty Directory records.
//!
//! The workflow only reads profiles: to check that an assignment target or a
//! scrutinizer exists, and that the name supplied alongside the id matches the
//! directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, error::require};

/// Descriptive profile fields beyond the identity key and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileDetails {
  pub dob:           Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub alt_phone:     Option<String>,
  pub address:       Option<String>,
  pub campus:        Option<String>,
  pub campus_name:   Option<String>,
  pub qualification: Option<String>,
  pub expertise:     Option<String>,
}

/// A canonical faculty record, keyed by `faculty_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyProfile {
  pub faculty_id: String,
  pub full_name:  String,
  #[serde(flatten)]
  pub details:    ProfileDetails,
  pub created_at: DateTime<Utc>,
}

impl FacultyProfile {
  /// Whether `name` is the recorded full name. Surrounding whitespace is
  /// ignored; case is not.
  pub fn name_matches(&self, name: &str) -> bool { self.full_name == name.trim() }
}

/// Input to [`crate::store::WorkflowStore::add_faculty`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewFaculty {
  pub faculty_id: String,
  pub full_name:  String,
  #[serde(flatten)]
  pub details:    ProfileDetails,
}

impl NewFaculty {
  /// Trim the key fields and reject blanks.
  pub fn validated(mut self) -> Result<Self> {
    require("facultyId", &self.faculty_id)?;
    require("fullName", &self.full_name)?;
    self.faculty_id = self.faculty_id.trim().to_owned();
    self.full_name = self.full_name.trim().to_owned();
    Ok(self)
  }
}

/// Check a `(faculty_id, name)` pair against the directory record.
pub fn verify_identity(
  profile: Option<&FacultyProfile>,
  faculty_id: &str,
  name: &str,
) -> Result<()> {
  let profile =
    profile.ok_or_else(|| Error::not_found(format!("faculty {faculty_id} not found")))?;
  if !profile.name_matches(name) {
    return Err(Error::validation(format!(
      "identity mismatch: {name:?} is not the recorded name of faculty {faculty_id}"
    )));
  }
  Ok(())
}
