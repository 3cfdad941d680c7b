//! Handlers for `/assignments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/assignments` | Admin only. Body: [`CreateBody`]; returns 201 |
//! | `GET`    | `/assignments` | Optional `?facultyId=`; newest first |
//! | `DELETE` | `/assignments` | Admin only. `?facultyId=&subjectCode=&role=`; returns `{"deleted": n}` |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use paperflow_core::{
  Workflow,
  assignment::{Assignment, AssignmentKey, AssignmentQuery, DutyRole, NewAssignment},
  store::WorkflowStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{Caller, JsonBody, QueryParams},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /assignments`. Absent text fields decode as
/// blank and are reported by name during validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBody {
  pub faculty_id:   String,
  pub faculty_name: String,
  pub subject_code: String,
  pub subject_name: String,
  pub regulation:   String,
  pub role:         DutyRole,
  #[serde(alias = "deadlineDate")]
  pub deadline:     Option<NaiveDate>,
}

impl CreateBody {
  fn into_new_assignment(self) -> Result<NewAssignment, ApiError> {
    let deadline = self
      .deadline
      .ok_or_else(|| paperflow_core::Error::validation("missing field: deadline"))?;
    Ok(NewAssignment {
      faculty_id: self.faculty_id,
      faculty_name: self.faculty_name,
      subject_code: self.subject_code,
      subject_name: self.subject_name,
      regulation: self.regulation,
      role: self.role,
      deadline,
    })
  }
}

/// `POST /assignments`
pub async fn create<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let assignment = workflow
    .create_assignment(&caller, body.into_new_assignment()?)
    .await?;
  Ok((StatusCode::CREATED, Json(assignment)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub faculty_id: Option<String>,
}

/// `GET /assignments[?facultyId=<id>]`
pub async fn list<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Assignment>>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let query = AssignmentQuery {
    faculty_id: params.faculty_id.filter(|id| !id.trim().is_empty()),
  };
  Ok(Json(workflow.list_assignments(&caller, query).await?))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Removed {
  pub deleted: usize,
}

/// `DELETE /assignments?facultyId=<id>&subjectCode=<code>&role=<role>`
pub async fn remove<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  QueryParams(key): QueryParams<AssignmentKey>,
) -> Result<Json<Removed>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let deleted = workflow.remove_assignment(&caller, key).await?;
  Ok(Json(Removed { deleted }))
}
