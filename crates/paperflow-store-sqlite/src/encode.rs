//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order is chronological order. Question lists and profile
//! details are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings. State enums use their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use paperflow_core::{
  assignment::{Assignment, DutyRole},
  faculty::{FacultyProfile, ProfileDetails},
  paper::{ExamMetadata, QuestionPaper},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── State enums ─────────────────────────────────────────────────────────────

/// Parse a lowercase state name, naming the column on failure.
pub fn decode_state<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::UnknownValue { column, value: s.to_owned() })
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_questions(questions: &[String]) -> Result<String> {
  Ok(serde_json::to_string(questions)?)
}

pub fn decode_questions(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

pub fn encode_details(details: &ProfileDetails) -> Result<String> {
  Ok(serde_json::to_string(details)?)
}

pub fn decode_details(s: &str) -> Result<ProfileDetails> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const FACULTY_COLUMNS: &str = "faculty_id, full_name, details, created_at";

/// Raw strings read directly from a `faculty` row.
pub struct RawFaculty {
  pub faculty_id: String,
  pub full_name:  String,
  pub details:    String,
  pub created_at: String,
}

impl RawFaculty {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      faculty_id: row.get(0)?,
      full_name:  row.get(1)?,
      details:    row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_profile(self) -> Result<FacultyProfile> {
    Ok(FacultyProfile {
      faculty_id: self.faculty_id,
      full_name:  self.full_name,
      details:    decode_details(&self.details)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const ASSIGNMENT_COLUMNS: &str = "assignment_id, faculty_id, faculty_name, \
  subject_code, subject_name, regulation, role, response, question_paper_status, \
  created_at, deadline_date, assigned_by";

/// Raw strings read directly from an `assignments` row.
pub struct RawAssignment {
  pub assignment_id:         String,
  pub faculty_id:            String,
  pub faculty_name:          String,
  pub subject_code:          String,
  pub subject_name:          String,
  pub regulation:            String,
  pub role:                  String,
  pub response:              Option<String>,
  pub question_paper_status: String,
  pub created_at:            String,
  pub deadline_date:         String,
  pub assigned_by:           String,
}

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id:         row.get(0)?,
      faculty_id:            row.get(1)?,
      faculty_name:          row.get(2)?,
      subject_code:          row.get(3)?,
      subject_name:          row.get(4)?,
      regulation:            row.get(5)?,
      role:                  row.get(6)?,
      response:              row.get(7)?,
      question_paper_status: row.get(8)?,
      created_at:            row.get(9)?,
      deadline_date:         row.get(10)?,
      assigned_by:           row.get(11)?,
    })
  }

  pub fn into_assignment(self) -> Result<Assignment> {
    let response = self
      .response
      .as_deref()
      .map(|s| decode_state("response", s))
      .transpose()?;

    Ok(Assignment {
      id: decode_uuid(&self.assignment_id)?,
      faculty_id: self.faculty_id,
      faculty_name: self.faculty_name,
      subject_code: self.subject_code,
      subject_name: self.subject_name,
      regulation: self.regulation,
      role: DutyRole::new(self.role),
      is_assigned: response == Some(paperflow_core::assignment::Decision::Yes),
      response,
      question_paper_status: decode_state(
        "question_paper_status",
        &self.question_paper_status,
      )?,
      created_at: decode_dt(&self.created_at)?,
      deadline_date: decode_date(&self.deadline_date)?,
      assigned_by: self.assigned_by,
    })
  }
}

pub const PAPER_COLUMNS: &str = "paper_id, faculty_id, role, exam_name, department, \
  semester, subject_code, subject_title, regulation, time, max_marks, part_a, part_b, \
  part_c, scrutinizer_id, scrutinizer_name, scrutiny_request_status, scrutiny_status, \
  scrutiny_remarks, created_at, assignment_id";

/// Raw strings read directly from a `question_papers` row.
pub struct RawPaper {
  pub paper_id:                String,
  pub faculty_id:              String,
  pub role:                    String,
  pub exam_name:               String,
  pub department:              String,
  pub semester:                String,
  pub subject_code:            String,
  pub subject_title:           String,
  pub regulation:              String,
  pub time:                    String,
  pub max_marks:               String,
  pub part_a:                  String,
  pub part_b:                  String,
  pub part_c:                  String,
  pub scrutinizer_id:          Option<String>,
  pub scrutinizer_name:        Option<String>,
  pub scrutiny_request_status: String,
  pub scrutiny_status:         String,
  pub scrutiny_remarks:        Option<String>,
  pub created_at:              String,
  pub assignment_id:           String,
}

impl RawPaper {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      paper_id:                row.get(0)?,
      faculty_id:              row.get(1)?,
      role:                    row.get(2)?,
      exam_name:               row.get(3)?,
      department:              row.get(4)?,
      semester:                row.get(5)?,
      subject_code:            row.get(6)?,
      subject_title:           row.get(7)?,
      regulation:              row.get(8)?,
      time:                    row.get(9)?,
      max_marks:               row.get(10)?,
      part_a:                  row.get(11)?,
      part_b:                  row.get(12)?,
      part_c:                  row.get(13)?,
      scrutinizer_id:          row.get(14)?,
      scrutinizer_name:        row.get(15)?,
      scrutiny_request_status: row.get(16)?,
      scrutiny_status:         row.get(17)?,
      scrutiny_remarks:        row.get(18)?,
      created_at:              row.get(19)?,
      assignment_id:           row.get(20)?,
    })
  }

  pub fn into_paper(self) -> Result<QuestionPaper> {
    Ok(QuestionPaper {
      id: decode_uuid(&self.paper_id)?,
      assignment_id: decode_uuid(&self.assignment_id)?,
      faculty_id: self.faculty_id,
      role: DutyRole::new(self.role),
      metadata: ExamMetadata {
        exam_name:     self.exam_name,
        department:    self.department,
        semester:      self.semester,
        subject_code:  self.subject_code,
        subject_title: self.subject_title,
        regulation:    self.regulation,
        time:          self.time,
        max_marks:     self.max_marks,
      },
      part_a: decode_questions(&self.part_a)?,
      part_b: decode_questions(&self.part_b)?,
      part_c: decode_questions(&self.part_c)?,
      scrutinizer_id: self.scrutinizer_id,
      scrutinizer_name: self.scrutinizer_name,
      scrutiny_request_status: decode_state(
        "scrutiny_request_status",
        &self.scrutiny_request_status,
      )?,
      scrutiny_status: decode_state("scrutiny_status", &self.scrutiny_status)?,
      scrutiny_remarks: self.scrutiny_remarks,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
