//! The `WorkflowStore` trait.
//!
//! Implemented by storage backends (e.g. `paperflow-store-sqlite`). The
//! [`Workflow`](crate::workflow::Workflow) service depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  assignment::{Assignment, AssignmentKey, AssignmentQuery, Decision, NewAssignment},
  faculty::{FacultyProfile, NewFaculty},
  paper::{
    NewQuestionPaper, PaperQuery, QuestionPaper, RequestResponse, Scrutinizer, Verdict,
  },
};

/// Abstraction over the shared backing store.
///
/// Every method is one atomic unit: either all of its writes become visible
/// or none do. State preconditions are checked inside that unit, so two
/// concurrent callers racing for the same transition see exactly one winner.
///
/// Domain failures (`NotFound`, `Conflict`, `Forbidden`) must be reported
/// through `Self::Error` in a form that converts back into the matching
/// [`crate::Error`] variant.
pub trait WorkflowStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Faculty directory ─────────────────────────────────────────────────

  /// Insert a profile. `Conflict` if the faculty id is taken.
  fn add_faculty(
    &self,
    input: NewFaculty,
  ) -> impl Future<Output = Result<FacultyProfile, Self::Error>> + Send + '_;

  fn get_faculty<'a>(
    &'a self,
    faculty_id: &'a str,
  ) -> impl Future<Output = Result<Option<FacultyProfile>, Self::Error>> + Send + 'a;

  /// All profiles, ordered by faculty id.
  fn list_faculty(
    &self,
  ) -> impl Future<Output = Result<Vec<FacultyProfile>, Self::Error>> + Send + '_;

  // ── Assignments ───────────────────────────────────────────────────────

  /// Insert an unresponded assignment. The uniqueness key (with the role in
  /// canonical form) is enforced by the store itself; a duplicate is a
  /// `Conflict`.
  fn insert_assignment(
    &self,
    input: NewAssignment,
    assigned_by: String,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;

  /// Assignments newest first.
  fn list_assignments(
    &self,
    query: AssignmentQuery,
  ) -> impl Future<Output = Result<Vec<Assignment>, Self::Error>> + Send + '_;

  /// Delete the assignment(s) matching `key`; returns how many went.
  fn delete_assignments(
    &self,
    key: AssignmentKey,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// The oldest unresponded assignment for `faculty_id`.
  fn pending_assignment<'a>(
    &'a self,
    faculty_id: &'a str,
  ) -> impl Future<Output = Result<Option<Assignment>, Self::Error>> + Send + 'a;

  /// Set the response exactly once. `NotFound` if no assignment matches,
  /// `Conflict` if it already has a response.
  fn record_response(
    &self,
    key: AssignmentKey,
    decision: Decision,
  ) -> impl Future<Output = Result<Assignment, Self::Error>> + Send + '_;

  // ── Question papers ───────────────────────────────────────────────────

  /// Insert the paper, link it to the matching assignment by id, and mark
  /// that assignment `submitted`, as one unit. `NotFound` without a matching
  /// assignment, `Conflict` if it is not accepted or already has a paper.
  fn submit_paper(
    &self,
    input: NewQuestionPaper,
  ) -> impl Future<Output = Result<QuestionPaper, Self::Error>> + Send + '_;

  fn get_paper(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<QuestionPaper>, Self::Error>> + Send + '_;

  /// Papers matching `query`, newest first.
  fn list_papers(
    &self,
    query: PaperQuery,
  ) -> impl Future<Output = Result<Vec<QuestionPaper>, Self::Error>> + Send + '_;

  // ── Scrutiny ──────────────────────────────────────────────────────────

  /// Apply [`QuestionPaper::assign_scrutinizer`] atomically.
  fn assign_scrutinizer(
    &self,
    paper_id: Uuid,
    scrutinizer: Scrutinizer,
  ) -> impl Future<Output = Result<QuestionPaper, Self::Error>> + Send + '_;

  /// Apply [`QuestionPaper::answer_request`] atomically.
  fn answer_scrutiny_request(
    &self,
    paper_id: Uuid,
    scrutinizer_id: String,
    response: RequestResponse,
  ) -> impl Future<Output = Result<QuestionPaper, Self::Error>> + Send + '_;

  /// Apply [`QuestionPaper::render_verdict`] and advance the paper status of
  /// the assignment it was submitted under, if that assignment still exists,
  /// as one unit.
  fn record_verdict(
    &self,
    paper_id: Uuid,
    scrutinizer_id: String,
    verdict: Verdict,
    remarks: String,
  ) -> impl Future<Output = Result<QuestionPaper, Self::Error>> + Send + '_;

  // ── Repair ────────────────────────────────────────────────────────────

  /// Mark `submitted` every accepted, pending assignment that already has a
  /// paper linked to it.
  /// Idempotent; returns the number of assignments repaired.
  fn reconcile_paper_statuses(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
