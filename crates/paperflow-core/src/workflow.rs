//! The workflow service: the operations exposed to callers.
//!
//! [`Workflow`] validates input, authorizes the caller's [`Identity`], checks
//! names against the Faculty Directory, and hands each state transition to the
//! [`WorkflowStore`] as a single atomic call.

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Identity, Result,
  error::require,
  assignment::{
    Assignment, AssignmentKey, AssignmentQuery, Decision, NewAssignment, dedupe_by_key,
  },
  faculty::{FacultyProfile, NewFaculty, verify_identity},
  paper::{
    NewQuestionPaper, PaperQuery, QuestionPaper, RequestResponse, RequestStatus,
    ScrutinyStatus, Scrutinizer, Verdict,
  },
  render::render_question_paper,
  store::WorkflowStore,
};

fn denied(err: &Error) {
  warn!(error = %err, "request denied");
}

/// Workflow operations over a shared store.
pub struct Workflow<S> {
  store: S,
}

impl<S> Workflow<S>
where
  S: WorkflowStore,
  Error: From<S::Error>,
{
  pub fn new(store: S) -> Self { Self { store } }

  // ── Faculty directory ─────────────────────────────────────────────────

  pub async fn register_faculty(
    &self,
    caller: &Identity,
    input: NewFaculty,
  ) -> Result<FacultyProfile> {
    caller.require_admin("registering faculty").inspect_err(denied)?;
    let input = input.validated()?;
    let profile = self.store.add_faculty(input).await?;
    info!(faculty_id = %profile.faculty_id, "faculty registered");
    Ok(profile)
  }

  /// Profiles are readable by any identity; the caller is only required to
  /// have one.
  pub async fn get_faculty(
    &self,
    _caller: &Identity,
    faculty_id: &str,
  ) -> Result<FacultyProfile> {
    self
      .store
      .get_faculty(faculty_id)
      .await?
      .ok_or_else(|| Error::not_found(format!("faculty {faculty_id} not found")))
  }

  pub async fn list_faculty(&self, caller: &Identity) -> Result<Vec<FacultyProfile>> {
    caller.require_admin("listing faculty").inspect_err(denied)?;
    Ok(self.store.list_faculty().await?)
  }

  // ── Assignment registry ───────────────────────────────────────────────

  /// Offer a subject/duty to a faculty member.
  pub async fn create_assignment(
    &self,
    caller: &Identity,
    input: NewAssignment,
  ) -> Result<Assignment> {
    caller.require_admin("creating assignments").inspect_err(denied)?;
    let input = input.validated()?;

    let profile = self.store.get_faculty(&input.faculty_id).await?;
    verify_identity(profile.as_ref(), &input.faculty_id, &input.faculty_name)?;

    let assignment = self
      .store
      .insert_assignment(input, caller.principal().to_owned())
      .await?;
    info!(
      faculty_id = %assignment.faculty_id,
      subject_code = %assignment.subject_code,
      role = %assignment.role,
      "assignment created"
    );
    Ok(assignment)
  }

  /// Newest first, at most one per uniqueness key. Faculty callers only see
  /// their own.
  pub async fn list_assignments(
    &self,
    caller: &Identity,
    mut query: AssignmentQuery,
  ) -> Result<Vec<Assignment>> {
    if let Some(own) = caller.faculty_id() {
      if query.faculty_id.as_deref().is_some_and(|requested| requested != own) {
        let err = Error::forbidden("faculty may only list their own assignments");
        denied(&err);
        return Err(err);
      }
      query.faculty_id = Some(own.to_owned());
    }
    let assignments = self.store.list_assignments(query).await?;
    Ok(dedupe_by_key(assignments))
  }

  pub async fn remove_assignment(
    &self,
    caller: &Identity,
    key: AssignmentKey,
  ) -> Result<usize> {
    caller.require_admin("removing assignments").inspect_err(denied)?;
    let key = key.validated()?;
    let deleted = self.store.delete_assignments(key.clone()).await?;
    if deleted == 0 {
      return Err(Error::not_found(format!("no assignment {key}")));
    }
    info!(%key, deleted, "assignment removed");
    Ok(deleted)
  }

  // ── Response workflow ─────────────────────────────────────────────────

  /// The assignment awaiting a response from `faculty_id` (the caller's own
  /// when `None`), if any.
  pub async fn pending_response(
    &self,
    caller: &Identity,
    faculty_id: Option<&str>,
  ) -> Result<Option<Assignment>> {
    let faculty_id = match (caller.faculty_id(), faculty_id) {
      (Some(own), None) => own,
      (_, Some(requested)) if caller.may_act_for(requested) => requested,
      (None, None) => return Err(Error::validation("missing field: facultyId")),
      (_, Some(_)) => {
        let err = Error::forbidden("faculty may only query their own pending response");
        denied(&err);
        return Err(err);
      }
    };
    Ok(self.store.pending_assignment(faculty_id).await?)
  }

  /// Accept or decline an assignment. Only the assigned faculty member may
  /// answer, and only once.
  pub async fn submit_response(
    &self,
    caller: &Identity,
    key: AssignmentKey,
    decision: Decision,
  ) -> Result<Assignment> {
    let own = caller.require_faculty("responding to assignments").inspect_err(denied)?;
    let key = key.validated()?;
    if key.faculty_id != own {
      let err = Error::forbidden(format!("assignment {key} belongs to another faculty member"));
      denied(&err);
      return Err(err);
    }

    let assignment = self.store.record_response(key, decision).await?;
    info!(
      faculty_id = %assignment.faculty_id,
      subject_code = %assignment.subject_code,
      role = %assignment.role,
      response = %decision,
      "assignment response recorded"
    );
    Ok(assignment)
  }

  // ── Question paper store ──────────────────────────────────────────────

  /// Submit a paper against the caller's accepted assignment. The
  /// assignment's paper status moves to `submitted` in the same unit.
  pub async fn submit_question_paper(
    &self,
    caller: &Identity,
    mut input: NewQuestionPaper,
  ) -> Result<QuestionPaper> {
    let own = caller.require_faculty("submitting question papers").inspect_err(denied)?;
    if input.faculty_id.trim().is_empty() {
      input.faculty_id = own.to_owned();
    } else if input.faculty_id.trim() != own {
      let err = Error::forbidden("faculty may only submit their own question papers");
      denied(&err);
      return Err(err);
    }
    let input = input.validated()?;

    let paper = self.store.submit_paper(input).await?;
    info!(
      paper_id = %paper.id,
      faculty_id = %paper.faculty_id,
      subject_code = %paper.metadata.subject_code,
      "question paper submitted"
    );
    Ok(paper)
  }

  pub async fn get_question_paper(
    &self,
    caller: &Identity,
    paper_id: Uuid,
  ) -> Result<QuestionPaper> {
    let paper = self
      .store
      .get_paper(paper_id)
      .await?
      .ok_or_else(|| Error::not_found(format!("question paper {paper_id} not found")))?;
    paper.ensure_visible_to(caller).inspect_err(denied)?;
    Ok(paper)
  }

  /// The printable text of a paper, under the same access rule as
  /// [`Self::get_question_paper`].
  pub async fn render_question_paper(
    &self,
    caller: &Identity,
    paper_id: Uuid,
  ) -> Result<String> {
    let paper = self.get_question_paper(caller, paper_id).await?;
    Ok(render_question_paper(&paper))
  }

  /// Admins see every paper; faculty see the papers they submitted.
  pub async fn list_question_papers(&self, caller: &Identity) -> Result<Vec<QuestionPaper>> {
    let query = PaperQuery {
      faculty_id: caller.faculty_id().map(str::to_owned),
      ..Default::default()
    };
    Ok(self.store.list_papers(query).await?)
  }

  // ── Scrutiny workflow ─────────────────────────────────────────────────

  pub async fn assign_scrutinizer(
    &self,
    caller: &Identity,
    paper_id: Uuid,
    scrutinizer: Scrutinizer,
  ) -> Result<QuestionPaper> {
    caller.require_admin("assigning scrutinizers").inspect_err(denied)?;
    require("scrutinizerId", &scrutinizer.scrutinizer_id)?;
    require("scrutinizerName", &scrutinizer.scrutinizer_name)?;
    let scrutinizer = Scrutinizer {
      scrutinizer_id:   scrutinizer.scrutinizer_id.trim().to_owned(),
      scrutinizer_name: scrutinizer.scrutinizer_name.trim().to_owned(),
    };

    let profile = self.store.get_faculty(&scrutinizer.scrutinizer_id).await?;
    verify_identity(
      profile.as_ref(),
      &scrutinizer.scrutinizer_id,
      &scrutinizer.scrutinizer_name,
    )?;

    let paper = self
      .store
      .get_paper(paper_id)
      .await?
      .ok_or_else(|| Error::not_found(format!("question paper {paper_id} not found")))?;
    if paper.faculty_id == scrutinizer.scrutinizer_id {
      return Err(Error::validation("a faculty member cannot scrutinize their own paper"));
    }

    let paper = self.store.assign_scrutinizer(paper_id, scrutinizer).await?;
    info!(
      paper_id = %paper.id,
      scrutinizer_id = ?paper.scrutinizer_id,
      "scrutinizer assigned"
    );
    Ok(paper)
  }

  pub async fn respond_to_scrutiny_request(
    &self,
    caller: &Identity,
    paper_id: Uuid,
    response: RequestResponse,
  ) -> Result<QuestionPaper> {
    let own = caller
      .require_faculty("answering scrutiny requests")
      .inspect_err(denied)?;
    let paper = self
      .store
      .answer_scrutiny_request(paper_id, own.to_owned(), response)
      .await?;
    info!(
      paper_id = %paper.id,
      scrutinizer_id = %own,
      request_status = %paper.scrutiny_request_status,
      "scrutiny request answered"
    );
    Ok(paper)
  }

  pub async fn submit_scrutiny_verdict(
    &self,
    caller: &Identity,
    paper_id: Uuid,
    remarks: String,
    verdict: Verdict,
  ) -> Result<QuestionPaper> {
    let own = caller
      .require_faculty("submitting scrutiny verdicts")
      .inspect_err(denied)?;
    require("remarks", &remarks)?;

    let paper = self
      .store
      .record_verdict(paper_id, own.to_owned(), verdict, remarks.trim().to_owned())
      .await?;
    info!(
      paper_id = %paper.id,
      scrutinizer_id = %own,
      scrutiny_status = %paper.scrutiny_status,
      "scrutiny verdict recorded"
    );
    Ok(paper)
  }

  /// Papers the caller has agreed to scrutinize and not yet judged.
  pub async fn assigned_scrutiny_work(&self, caller: &Identity) -> Result<Vec<QuestionPaper>> {
    let own = caller.require_faculty("listing scrutiny work").inspect_err(denied)?;
    let query = PaperQuery {
      scrutinizer_id: Some(own.to_owned()),
      scrutiny_request_status: Some(RequestStatus::Accepted),
      scrutiny_status: Some(ScrutinyStatus::Pending),
      ..Default::default()
    };
    Ok(self.store.list_papers(query).await?)
  }

  /// Scrutiny requests addressed to the caller awaiting an answer.
  pub async fn pending_scrutiny_requests(
    &self,
    caller: &Identity,
  ) -> Result<Vec<QuestionPaper>> {
    let own = caller
      .require_faculty("listing scrutiny requests")
      .inspect_err(denied)?;
    let query = PaperQuery {
      scrutinizer_id: Some(own.to_owned()),
      scrutiny_request_status: Some(RequestStatus::Pending),
      ..Default::default()
    };
    Ok(self.store.list_papers(query).await?)
  }

  // ── Repair ────────────────────────────────────────────────────────────

  /// Run the idempotent paper-status repair pass.
  pub async fn reconcile(&self) -> Result<usize> {
    let repaired = self.store.reconcile_paper_statuses().await?;
    if repaired > 0 {
      warn!(repaired, "repaired stale assignment paper statuses");
    }
    Ok(repaired)
  }
}
