//! [`SqliteStore`]: the SQLite implementation of [`WorkflowStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use paperflow_core::{
  assignment::{
    Assignment, AssignmentKey, AssignmentQuery, Decision, NewAssignment, PaperStatus,
  },
  faculty::{FacultyProfile, NewFaculty},
  paper::{
    NewQuestionPaper, PaperQuery, QuestionPaper, RequestResponse, RequestStatus,
    ScrutinyStatus, Scrutinizer, Verdict,
  },
  store::WorkflowStore,
};

use crate::{
  Error, Result,
  encode::{
    ASSIGNMENT_COLUMNS, FACULTY_COLUMNS, PAPER_COLUMNS, RawAssignment, RawFaculty,
    RawPaper, encode_date, encode_details, encode_dt, encode_questions, encode_uuid, now,
  },
  error::is_unique_violation,
  schema::SCHEMA,
};

type CallResult<T> = tokio_rusqlite::Result<T>;

/// Carry a workflow refusal out of a `Connection::call` closure.
fn domain(e: paperflow_core::Error) -> tokio_rusqlite::Error { Error::Core(e).into() }

fn unique_or(
  e: rusqlite::Error,
  conflict: impl FnOnce() -> paperflow_core::Error,
) -> tokio_rusqlite::Error {
  if is_unique_violation(&e) { domain(conflict()) } else { e.into() }
}

// ─── Row access ──────────────────────────────────────────────────────────────

fn select_assignment(
  conn: &rusqlite::Connection,
  key: &AssignmentKey,
) -> CallResult<Option<Assignment>> {
  let sql = format!(
    "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
     WHERE faculty_id = ?1 AND subject_code = ?2 AND role_key = ?3"
  );
  let raw = conn
    .query_row(
      &sql,
      params![key.faculty_id, key.subject_code, key.role.key()],
      RawAssignment::from_row,
    )
    .optional()?;
  Ok(raw.map(RawAssignment::into_assignment).transpose()?)
}

fn select_assignment_by_id(
  conn: &rusqlite::Connection,
  id: Uuid,
) -> CallResult<Option<Assignment>> {
  let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE assignment_id = ?1");
  let raw = conn
    .query_row(&sql, params![encode_uuid(id)], RawAssignment::from_row)
    .optional()?;
  Ok(raw.map(RawAssignment::into_assignment).transpose()?)
}

/// Write back `question_paper_status` of `assignment`.
fn update_paper_status(conn: &rusqlite::Connection, assignment: &Assignment) -> CallResult<()> {
  conn.execute(
    "UPDATE assignments SET question_paper_status = ?2 WHERE assignment_id = ?1",
    params![
      encode_uuid(assignment.id),
      assignment.question_paper_status.to_string()
    ],
  )?;
  Ok(())
}

fn select_paper(conn: &rusqlite::Connection, id: &str) -> CallResult<Option<QuestionPaper>> {
  let sql = format!("SELECT {PAPER_COLUMNS} FROM question_papers WHERE paper_id = ?1");
  let raw = conn
    .query_row(&sql, params![id], RawPaper::from_row)
    .optional()?;
  Ok(raw.map(RawPaper::into_paper).transpose()?)
}

fn require_paper(conn: &rusqlite::Connection, id: Uuid) -> CallResult<QuestionPaper> {
  select_paper(conn, &encode_uuid(id))?.ok_or_else(|| {
    domain(paperflow_core::Error::not_found(format!("question paper {id} not found")))
  })
}

/// Write back the scrutiny columns of `paper`.
fn update_scrutiny(conn: &rusqlite::Connection, paper: &QuestionPaper) -> CallResult<()> {
  conn.execute(
    "UPDATE question_papers
        SET scrutinizer_id = ?2,
            scrutinizer_name = ?3,
            scrutiny_request_status = ?4,
            scrutiny_status = ?5,
            scrutiny_remarks = ?6
      WHERE paper_id = ?1",
    params![
      encode_uuid(paper.id),
      paper.scrutinizer_id,
      paper.scrutinizer_name,
      paper.scrutiny_request_status.to_string(),
      paper.scrutiny_status.to_string(),
      paper.scrutiny_remarks,
    ],
  )?;
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A paperflow workflow store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls are
/// serialised on the connection's thread, and every state transition reads
/// its precondition and writes its result inside one transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load a paper, let `apply` transition it, and persist the result, all in
  /// one immediate transaction.
  async fn transition_paper<F>(&self, paper_id: Uuid, apply: F) -> Result<QuestionPaper>
  where
    F: FnOnce(&rusqlite::Connection, &mut QuestionPaper) -> CallResult<()> + Send + 'static,
  {
    let paper = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut paper = require_paper(&tx, paper_id)?;
        apply(&tx, &mut paper)?;
        update_scrutiny(&tx, &paper)?;
        tx.commit()?;
        Ok(paper)
      })
      .await?;
    Ok(paper)
  }
}

// ─── WorkflowStore impl ──────────────────────────────────────────────────────

impl WorkflowStore for SqliteStore {
  type Error = Error;

  // ── Faculty directory ─────────────────────────────────────────────────────

  async fn add_faculty(&self, input: NewFaculty) -> Result<FacultyProfile> {
    let profile = FacultyProfile {
      faculty_id: input.faculty_id,
      full_name:  input.full_name,
      details:    input.details,
      created_at: now(),
    };

    let details_str = encode_details(&profile.details)?;
    let at_str      = encode_dt(profile.created_at);
    let id          = profile.faculty_id.clone();
    let name        = profile.full_name.clone();

    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO faculty (faculty_id, full_name, details, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, name, details_str, at_str],
          )
          .map_err(|e| {
            unique_or(e, || {
              paperflow_core::Error::conflict(format!("faculty {id} already registered"))
            })
          })?;
        Ok(())
      })
      .await?;

    Ok(profile)
  }

  async fn get_faculty<'a>(&'a self, faculty_id: &'a str) -> Result<Option<FacultyProfile>> {
    let id = faculty_id.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {FACULTY_COLUMNS} FROM faculty WHERE faculty_id = ?1");
        Ok(conn.query_row(&sql, params![id], RawFaculty::from_row).optional()?)
      })
      .await?;
    raw.map(RawFaculty::into_profile).transpose()
  }

  async fn list_faculty(&self) -> Result<Vec<FacultyProfile>> {
    let raws = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {FACULTY_COLUMNS} FROM faculty ORDER BY faculty_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawFaculty::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawFaculty::into_profile).collect()
  }

  // ── Assignments ───────────────────────────────────────────────────────────

  async fn insert_assignment(
    &self,
    input: NewAssignment,
    assigned_by: String,
  ) -> Result<Assignment> {
    let assignment = Assignment {
      id: Uuid::new_v4(),
      faculty_id: input.faculty_id,
      faculty_name: input.faculty_name,
      subject_code: input.subject_code,
      subject_name: input.subject_name,
      regulation: input.regulation,
      role: input.role,
      response: None,
      is_assigned: false,
      question_paper_status: PaperStatus::Pending,
      created_at: now(),
      deadline_date: input.deadline,
      assigned_by,
    };

    let row = assignment.clone();
    self
      .conn
      .call(move |conn| {
        conn
          .execute(
            "INSERT INTO assignments (
               assignment_id, faculty_id, faculty_name, subject_code, subject_name,
               regulation, role, role_key, response, question_paper_status,
               created_at, deadline_date, assigned_by
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10, ?11, ?12)",
            params![
              encode_uuid(row.id),
              row.faculty_id,
              row.faculty_name,
              row.subject_code,
              row.subject_name,
              row.regulation,
              row.role.as_str(),
              row.role.key(),
              row.question_paper_status.to_string(),
              encode_dt(row.created_at),
              encode_date(row.deadline_date),
              row.assigned_by,
            ],
          )
          .map_err(|e| {
            unique_or(e, || {
              paperflow_core::Error::conflict(format!(
                "assignment {} already exists",
                row.key()
              ))
            })
          })?;
        Ok(())
      })
      .await?;

    Ok(assignment)
  }

  async fn list_assignments(&self, query: AssignmentQuery) -> Result<Vec<Assignment>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
           WHERE (?1 IS NULL OR faculty_id = ?1)
           ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![query.faculty_id], RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn delete_assignments(&self, key: AssignmentKey) -> Result<usize> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM assignments
           WHERE faculty_id = ?1 AND subject_code = ?2 AND role_key = ?3",
          params![key.faculty_id, key.subject_code, key.role.key()],
        )?)
      })
      .await?;
    Ok(deleted)
  }

  async fn pending_assignment<'a>(&'a self, faculty_id: &'a str) -> Result<Option<Assignment>> {
    let id = faculty_id.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ASSIGNMENT_COLUMNS} FROM assignments
           WHERE faculty_id = ?1 AND response IS NULL
           ORDER BY created_at ASC, rowid ASC
           LIMIT 1"
        );
        Ok(conn.query_row(&sql, params![id], RawAssignment::from_row).optional()?)
      })
      .await?;
    raw.map(RawAssignment::into_assignment).transpose()
  }

  async fn record_response(&self, key: AssignmentKey, decision: Decision) -> Result<Assignment> {
    let assignment = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut assignment = select_assignment(&tx, &key)?.ok_or_else(|| {
          domain(paperflow_core::Error::not_found(format!("no assignment {key}")))
        })?;
        assignment.apply_response(decision).map_err(domain)?;

        let changed = tx.execute(
          "UPDATE assignments SET response = ?2
           WHERE assignment_id = ?1 AND response IS NULL",
          params![encode_uuid(assignment.id), decision.to_string()],
        )?;
        if changed != 1 {
          return Err(domain(paperflow_core::Error::conflict(format!(
            "assignment {key} already has a response"
          ))));
        }

        tx.commit()?;
        Ok(assignment)
      })
      .await?;
    Ok(assignment)
  }

  // ── Question papers ───────────────────────────────────────────────────────

  async fn submit_paper(&self, input: NewQuestionPaper) -> Result<QuestionPaper> {
    let paper = QuestionPaper {
      id: Uuid::new_v4(),
      assignment_id: Uuid::nil(),
      faculty_id: input.faculty_id,
      role: input.role,
      metadata: input.metadata,
      part_a: input.part_a,
      part_b: input.part_b,
      part_c: input.part_c,
      scrutinizer_id: None,
      scrutinizer_name: None,
      scrutiny_request_status: RequestStatus::Pending,
      scrutiny_status: ScrutinyStatus::Pending,
      scrutiny_remarks: None,
      created_at: now(),
    };

    let part_a_str = encode_questions(&paper.part_a)?;
    let part_b_str = encode_questions(&paper.part_b)?;
    let part_c_str = encode_questions(&paper.part_c)?;

    let mut row = paper;
    let paper = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let key = row.assignment_key();

        let mut assignment = select_assignment(&tx, &key)?.ok_or_else(|| {
          domain(paperflow_core::Error::not_found(format!("no assignment {key}")))
        })?;
        assignment.ensure_accepts_paper().map_err(domain)?;
        row.assignment_id = assignment.id;

        let m = &row.metadata;
        tx.execute(
          "INSERT INTO question_papers (
             paper_id, assignment_id, faculty_id, role, role_key, exam_name, department,
             semester, subject_code, subject_title, regulation, time, max_marks,
             part_a, part_b, part_c,
             scrutinizer_id, scrutinizer_name, scrutiny_request_status,
             scrutiny_status, scrutiny_remarks, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     NULL, NULL, ?17, ?18, NULL, ?19)",
          params![
            encode_uuid(row.id),
            encode_uuid(row.assignment_id),
            row.faculty_id,
            row.role.as_str(),
            row.role.key(),
            m.exam_name,
            m.department,
            m.semester,
            m.subject_code,
            m.subject_title,
            m.regulation,
            m.time,
            m.max_marks,
            part_a_str,
            part_b_str,
            part_c_str,
            row.scrutiny_request_status.to_string(),
            row.scrutiny_status.to_string(),
            encode_dt(row.created_at),
          ],
        )
        .map_err(|e| {
          unique_or(e, || {
            paperflow_core::Error::conflict(format!(
              "question paper already submitted for assignment {key}"
            ))
          })
        })?;

        assignment
          .advance_paper_status(PaperStatus::Submitted)
          .map_err(domain)?;
        update_paper_status(&tx, &assignment)?;

        tx.commit()?;
        Ok(row)
      })
      .await?;

    Ok(paper)
  }

  async fn get_paper(&self, id: Uuid) -> Result<Option<QuestionPaper>> {
    let paper = self
      .conn
      .call(move |conn| select_paper(conn, &encode_uuid(id)))
      .await?;
    Ok(paper)
  }

  async fn list_papers(&self, query: PaperQuery) -> Result<Vec<QuestionPaper>> {
    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {PAPER_COLUMNS} FROM question_papers
           WHERE (?1 IS NULL OR faculty_id = ?1)
             AND (?2 IS NULL OR scrutinizer_id = ?2)
             AND (?3 IS NULL OR scrutiny_request_status = ?3)
             AND (?4 IS NULL OR scrutiny_status = ?4)
           ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            params![
              query.faculty_id,
              query.scrutinizer_id,
              query.scrutiny_request_status.map(|s| s.to_string()),
              query.scrutiny_status.map(|s| s.to_string()),
            ],
            RawPaper::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawPaper::into_paper).collect()
  }

  // ── Scrutiny ──────────────────────────────────────────────────────────────

  async fn assign_scrutinizer(
    &self,
    paper_id: Uuid,
    scrutinizer: Scrutinizer,
  ) -> Result<QuestionPaper> {
    self
      .transition_paper(paper_id, move |_, paper| {
        paper.assign_scrutinizer(&scrutinizer).map_err(domain)
      })
      .await
  }

  async fn answer_scrutiny_request(
    &self,
    paper_id: Uuid,
    scrutinizer_id: String,
    response: RequestResponse,
  ) -> Result<QuestionPaper> {
    self
      .transition_paper(paper_id, move |_, paper| {
        paper.answer_request(&scrutinizer_id, response).map_err(domain)
      })
      .await
  }

  async fn record_verdict(
    &self,
    paper_id: Uuid,
    scrutinizer_id: String,
    verdict: Verdict,
    remarks: String,
  ) -> Result<QuestionPaper> {
    self
      .transition_paper(paper_id, move |conn, paper| {
        paper
          .render_verdict(&scrutinizer_id, verdict, &remarks)
          .map_err(domain)?;

        // The assignment may have been removed since submission.
        if let Some(mut assignment) = select_assignment_by_id(conn, paper.assignment_id)?
          && assignment.advance_paper_status(verdict.into()).is_ok()
        {
          update_paper_status(conn, &assignment)?;
        }
        Ok(())
      })
      .await
  }

  // ── Repair ────────────────────────────────────────────────────────────────

  async fn reconcile_paper_statuses(&self) -> Result<usize> {
    let repaired = self
      .conn
      .call(|conn| {
        Ok(conn.execute(
          "UPDATE assignments SET question_paper_status = 'submitted'
           WHERE question_paper_status = 'pending'
             AND response = 'yes'
             AND EXISTS (
               SELECT 1 FROM question_papers p
               WHERE p.assignment_id = assignments.assignment_id
             )",
          [],
        )?)
      })
      .await?;
    Ok(repaired)
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Run raw SQL against the connection, for setting up states the workflow
  /// cannot reach.
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<usize> {
    Ok(self.conn.call(move |conn| Ok(conn.execute(sql, [])?)).await?)
  }
}
