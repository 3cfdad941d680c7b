//! Handlers for `/question-papers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/question-papers` | Faculty only. Body: [`NewQuestionPaper`]; returns 201 |
//! | `GET`  | `/question-papers` | Admins see all; faculty see their own |
//! | `GET`  | `/question-papers/{id}` | Author, scrutinizer or admin |
//! | `GET`  | `/question-papers/{id}/document` | Plain-text rendering with an ETag; honours `If-None-Match` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use paperflow_core::{
  Workflow,
  paper::{NewQuestionPaper, QuestionPaper},
  store::WorkflowStore,
};
use uuid::Uuid;

use crate::{
  error::ApiError,
  etag::{compute_etag, if_none_match_hits},
  extract::{Caller, JsonBody, PathParam},
};

/// `POST /question-papers`
pub async fn submit<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  JsonBody(body): JsonBody<NewQuestionPaper>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let paper = workflow.submit_question_paper(&caller, body).await?;
  Ok((StatusCode::CREATED, Json(paper)))
}

/// `GET /question-papers`
pub async fn list<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<QuestionPaper>>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.list_question_papers(&caller).await?))
}

/// `GET /question-papers/{id}`
pub async fn get_one<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<QuestionPaper>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.get_question_paper(&caller, id).await?))
}

/// `GET /question-papers/{id}/document`
pub async fn document<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<Uuid>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let text = workflow.render_question_paper(&caller, id).await?;
  let etag = compute_etag(&text);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| if_none_match_hits(v, &etag));
  if not_modified {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  Ok(
    (
      [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
        (header::ETAG, etag),
      ],
      text,
    )
      .into_response(),
  )
}
