//! Handlers for `/responses` endpoints: a faculty member's answer to an
//! assignment offer.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/responses/pending` | Optional `?facultyId=` (admins); `{"prompt":false}` when nothing is pending |
//! | `POST` | `/responses` | Body: [`RespondBody`]; returns the updated assignment |

use std::sync::Arc;

use axum::{Json, extract::State};
use paperflow_core::{
  Workflow,
  assignment::{Assignment, AssignmentKey, Decision},
  store::WorkflowStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{Caller, JsonBody, QueryParams},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingParams {
  pub faculty_id: Option<String>,
}

/// The response prompt shown to a faculty member.
#[derive(Debug, Serialize)]
pub struct PendingPrompt {
  pub prompt:     bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignment: Option<Assignment>,
}

/// `GET /responses/pending[?facultyId=<id>]`
pub async fn pending<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  QueryParams(params): QueryParams<PendingParams>,
) -> Result<Json<PendingPrompt>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let faculty_id = params.faculty_id.as_deref().filter(|id| !id.trim().is_empty());
  let assignment = workflow.pending_response(&caller, faculty_id).await?;
  Ok(Json(PendingPrompt {
    prompt: assignment.is_some(),
    assignment,
  }))
}

/// JSON body accepted by `POST /responses`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
  #[serde(flatten)]
  pub key:      AssignmentKey,
  pub response: Decision,
}

/// `POST /responses`
pub async fn submit<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  JsonBody(body): JsonBody<RespondBody>,
) -> Result<Json<Assignment>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.submit_response(&caller, body.key, body.response).await?))
}
