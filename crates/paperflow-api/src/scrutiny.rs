//! Handlers for the scrutiny workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/question-papers/{id}/scrutinizer` | Admin only. Body: `{"scrutinizerId","scrutinizerName"}` |
//! | `POST` | `/question-papers/{id}/scrutiny-request` | Scrutinizer only. Body: `{"response":"accepted"\|"rejected"}` |
//! | `POST` | `/question-papers/{id}/verdict` | Scrutinizer only. Body: `{"verdict":"approved"\|"rejected","remarks":"..."}` |
//! | `GET`  | `/scrutiny/assigned` | Accepted requests still awaiting a verdict |
//! | `GET`  | `/scrutiny/requests` | Requests awaiting an answer |

use std::sync::Arc;

use axum::{Json, extract::State};
use paperflow_core::{
  Workflow,
  paper::{QuestionPaper, RequestResponse, Scrutinizer, Verdict},
  store::WorkflowStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Caller, JsonBody, PathParam},
};

// ─── Transitions ─────────────────────────────────────────────────────────────

/// `POST /question-papers/{id}/scrutinizer`
pub async fn assign<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<Scrutinizer>,
) -> Result<Json<QuestionPaper>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.assign_scrutinizer(&caller, id, body).await?))
}

#[derive(Debug, Deserialize)]
pub struct RequestBody {
  pub response: RequestResponse,
}

/// `POST /question-papers/{id}/scrutiny-request`
pub async fn respond<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<RequestBody>,
) -> Result<Json<QuestionPaper>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(
    workflow
      .respond_to_scrutiny_request(&caller, id, body.response)
      .await?,
  ))
}

#[derive(Debug, Deserialize)]
pub struct VerdictBody {
  pub verdict: Verdict,
  #[serde(default)]
  pub remarks: String,
}

/// `POST /question-papers/{id}/verdict`
pub async fn verdict<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<Uuid>,
  JsonBody(body): JsonBody<VerdictBody>,
) -> Result<Json<QuestionPaper>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(
    workflow
      .submit_scrutiny_verdict(&caller, id, body.remarks, body.verdict)
      .await?,
  ))
}

// ─── Work lists ──────────────────────────────────────────────────────────────

/// `GET /scrutiny/assigned`
pub async fn assigned<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<QuestionPaper>>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.assigned_scrutiny_work(&caller).await?))
}

/// `GET /scrutiny/requests`
pub async fn requests<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<QuestionPaper>>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.pending_scrutiny_requests(&caller).await?))
}
