//! Question papers and their scrutiny sub-state.
//!
//! Scrutiny moves through two single-shot stages: the designated scrutinizer
//! first answers the request, then (if accepted) renders a verdict.
//!
//! ```text
//! Unassigned ─assign─▶ RequestPending ─accept─▶ RequestAccepted ─verdict─▶ Approved | Rejected
//!                         │    ▲
//!                      reject  └─reassign─┐
//!                         ▼               │
//!                      RequestRejected ───┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Identity, Result,
  assignment::{AssignmentKey, DutyRole},
  error::require,
};

/// Maximum number of questions per section.
pub const PART_A_CAPACITY: usize = 10;
pub const PART_B_CAPACITY: usize = 8;
pub const PART_C_CAPACITY: usize = 2;

// ─── States ──────────────────────────────────────────────────────────────────

/// Where the scrutiny request offered to the scrutinizer stands.
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
pub enum RequestStatus {
  #[default]
  Pending,
  Accepted,
  Rejected,
}

/// The scrutinizer's answer to a scrutiny request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestResponse {
  Accepted,
  Rejected,
}

impl From<RequestResponse> for RequestStatus {
  fn from(r: RequestResponse) -> Self {
    match r {
      RequestResponse::Accepted => Self::Accepted,
      RequestResponse::Rejected => Self::Rejected,
    }
  }
}

/// The verdict on the paper itself.
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
pub enum ScrutinyStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
  Approved,
  Rejected,
}

impl From<Verdict> for ScrutinyStatus {
  fn from(v: Verdict) -> Self {
    match v {
      Verdict::Approved => Self::Approved,
      Verdict::Rejected => Self::Rejected,
    }
  }
}

impl From<Verdict> for crate::assignment::PaperStatus {
  fn from(v: Verdict) -> Self {
    match v {
      Verdict::Approved => Self::Approved,
      Verdict::Rejected => Self::Rejected,
    }
  }
}

// ─── Exam metadata ───────────────────────────────────────────────────────────

/// Header fields printed at the top of a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExamMetadata {
  pub exam_name:     String,
  pub department:    String,
  pub semester:      String,
  pub subject_code:  String,
  pub subject_title: String,
  pub regulation:    String,
  pub time:          String,
  pub max_marks:     String,
}

impl ExamMetadata {
  fn validated(self) -> Result<Self> {
    let fields = [
      ("examName", &self.exam_name),
      ("department", &self.department),
      ("semester", &self.semester),
      ("subjectCode", &self.subject_code),
      ("subjectTitle", &self.subject_title),
      ("regulation", &self.regulation),
      ("time", &self.time),
      ("maxMarks", &self.max_marks),
    ];
    for (name, value) in fields {
      require(name, value)?;
    }
    Ok(Self {
      exam_name:     self.exam_name.trim().to_owned(),
      department:    self.department.trim().to_owned(),
      semester:      self.semester.trim().to_owned(),
      subject_code:  self.subject_code.trim().to_owned(),
      subject_title: self.subject_title.trim().to_owned(),
      regulation:    self.regulation.trim().to_owned(),
      time:          self.time.trim().to_owned(),
      max_marks:     self.max_marks.trim().to_owned(),
    })
  }
}

fn validate_part(name: &str, questions: &[String], capacity: usize) -> Result<()> {
  if questions.is_empty() {
    return Err(Error::validation(format!("missing field: {name}")));
  }
  if questions.len() > capacity {
    return Err(Error::validation(format!(
      "{name} holds at most {capacity} questions, got {}",
      questions.len()
    )));
  }
  if let Some(i) = questions.iter().position(|q| q.trim().is_empty()) {
    return Err(Error::validation(format!("{name}[{i}] is blank")));
  }
  Ok(())
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPaper {
  pub id:                      Uuid,
  /// The assignment this paper was submitted under. May outlive it.
  pub assignment_id:           Uuid,
  pub faculty_id:              String,
  /// Duty of the assignment this paper was submitted under.
  pub role:                    DutyRole,
  #[serde(flatten)]
  pub metadata:                ExamMetadata,
  pub part_a:                  Vec<String>,
  pub part_b:                  Vec<String>,
  pub part_c:                  Vec<String>,
  pub scrutinizer_id:          Option<String>,
  pub scrutinizer_name:        Option<String>,
  pub scrutiny_request_status: RequestStatus,
  pub scrutiny_status:         ScrutinyStatus,
  pub scrutiny_remarks:        Option<String>,
  pub created_at:              DateTime<Utc>,
}

impl QuestionPaper {
  /// Key of the assignment this paper belongs to.
  pub fn assignment_key(&self) -> AssignmentKey {
    AssignmentKey::new(&self.faculty_id, &self.metadata.subject_code, self.role.clone())
  }

  pub fn is_scrutinizer(&self, faculty_id: &str) -> bool {
    self.scrutinizer_id.as_deref() == Some(faculty_id)
  }

  /// Admins, the submitting faculty, and the assigned scrutinizer may read.
  pub fn ensure_visible_to(&self, caller: &Identity) -> Result<()> {
    let allowed = match caller.faculty_id() {
      None => caller.is_admin(),
      Some(id) => id == self.faculty_id || self.is_scrutinizer(id),
    };
    if allowed {
      Ok(())
    } else {
      Err(Error::forbidden(format!("question paper {} is not visible to caller", self.id)))
    }
  }

  /// Assignment (or reassignment) is allowed until the request is accepted
  /// or a verdict exists.
  pub fn ensure_can_assign_scrutinizer(&self) -> Result<()> {
    if self.scrutiny_status != ScrutinyStatus::Pending {
      return Err(Error::conflict(format!(
        "question paper {} already scrutinized ({})",
        self.id, self.scrutiny_status
      )));
    }
    if self.scrutinizer_id.is_some()
      && self.scrutiny_request_status == RequestStatus::Accepted
    {
      return Err(Error::conflict(format!(
        "scrutiny request for question paper {} was already accepted",
        self.id
      )));
    }
    Ok(())
  }

  fn ensure_scrutinizer(&self, faculty_id: &str) -> Result<()> {
    if self.is_scrutinizer(faculty_id) {
      Ok(())
    } else {
      Err(Error::forbidden(format!(
        "faculty {faculty_id} is not the scrutinizer of question paper {}",
        self.id
      )))
    }
  }

  pub fn ensure_can_answer_request(&self, faculty_id: &str) -> Result<()> {
    self.ensure_scrutinizer(faculty_id)?;
    if self.scrutiny_status != ScrutinyStatus::Pending {
      return Err(Error::conflict(format!(
        "question paper {} already scrutinized",
        self.id
      )));
    }
    if self.scrutiny_request_status != RequestStatus::Pending {
      return Err(Error::conflict(format!(
        "scrutiny request for question paper {} already {}",
        self.id, self.scrutiny_request_status
      )));
    }
    Ok(())
  }

  pub fn ensure_can_render_verdict(&self, faculty_id: &str) -> Result<()> {
    self.ensure_scrutinizer(faculty_id)?;
    if self.scrutiny_status != ScrutinyStatus::Pending {
      return Err(Error::conflict(format!(
        "question paper {} already scrutinized",
        self.id
      )));
    }
    if self.scrutiny_request_status != RequestStatus::Accepted {
      return Err(Error::conflict(format!(
        "scrutiny request for question paper {} is {}, not accepted",
        self.id, self.scrutiny_request_status
      )));
    }
    Ok(())
  }

  pub fn assign_scrutinizer(&mut self, scrutinizer: &Scrutinizer) -> Result<()> {
    self.ensure_can_assign_scrutinizer()?;
    self.scrutinizer_id = Some(scrutinizer.scrutinizer_id.clone());
    self.scrutinizer_name = Some(scrutinizer.scrutinizer_name.clone());
    self.scrutiny_request_status = RequestStatus::Pending;
    Ok(())
  }

  pub fn answer_request(
    &mut self,
    faculty_id: &str,
    response: RequestResponse,
  ) -> Result<()> {
    self.ensure_can_answer_request(faculty_id)?;
    self.scrutiny_request_status = response.into();
    Ok(())
  }

  pub fn render_verdict(
    &mut self,
    faculty_id: &str,
    verdict: Verdict,
    remarks: &str,
  ) -> Result<()> {
    self.ensure_can_render_verdict(faculty_id)?;
    self.scrutiny_status = verdict.into();
    self.scrutiny_remarks = Some(remarks.to_owned());
    Ok(())
  }
}

/// Input to [`crate::store::WorkflowStore::submit_paper`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewQuestionPaper {
  pub faculty_id: String,
  pub role:       DutyRole,
  #[serde(flatten)]
  pub metadata:   ExamMetadata,
  pub part_a:     Vec<String>,
  pub part_b:     Vec<String>,
  pub part_c:     Vec<String>,
}

impl NewQuestionPaper {
  /// Check every metadata field and all three sections.
  pub fn validated(self) -> Result<Self> {
    require("facultyId", &self.faculty_id)?;
    if self.role.is_blank() {
      return Err(Error::validation("missing field: role"));
    }
    let metadata = self.metadata.validated()?;
    validate_part("partA", &self.part_a, PART_A_CAPACITY)?;
    validate_part("partB", &self.part_b, PART_B_CAPACITY)?;
    validate_part("partC", &self.part_c, PART_C_CAPACITY)?;
    Ok(Self {
      faculty_id: self.faculty_id.trim().to_owned(),
      role: DutyRole::new(self.role.as_str().trim()),
      metadata,
      ..self
    })
  }
}

/// A scrutinizer designation, checked against the Faculty Directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scrutinizer {
  pub scrutinizer_id:   String,
  pub scrutinizer_name: String,
}

/// Parameters for [`crate::store::WorkflowStore::list_papers`]. Every set
/// field must match.
#[derive(Debug, Clone, Default)]
pub struct PaperQuery {
  pub faculty_id:              Option<String>,
  pub scrutinizer_id:          Option<String>,
  pub scrutiny_request_status: Option<RequestStatus>,
  pub scrutiny_status:         Option<ScrutinyStatus>,
}
