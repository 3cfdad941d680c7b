//! Handlers for `/faculty` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/faculty` | Admin only. Body: [`NewFaculty`]; returns 201 |
//! | `GET`  | `/faculty` | Admin only. Ordered by faculty id |
//! | `GET`  | `/faculty/{id}` | 404 if not registered |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use paperflow_core::{
  Workflow,
  faculty::{FacultyProfile, NewFaculty},
  store::WorkflowStore,
};

use crate::{
  error::ApiError,
  extract::{Caller, JsonBody, PathParam},
};

/// `POST /faculty`
pub async fn register<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  JsonBody(body): JsonBody<NewFaculty>,
) -> Result<impl IntoResponse, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  let profile = workflow.register_faculty(&caller, body).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

/// `GET /faculty`
pub async fn list<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
) -> Result<Json<Vec<FacultyProfile>>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.list_faculty(&caller).await?))
}

/// `GET /faculty/{id}`
pub async fn get_one<S>(
  State(workflow): State<Arc<Workflow<S>>>,
  Caller(caller): Caller,
  PathParam(id): PathParam<String>,
) -> Result<Json<FacultyProfile>, ApiError>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Ok(Json(workflow.get_faculty(&caller, &id).await?))
}
