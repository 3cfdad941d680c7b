//! JSON REST API for paperflow.
//!
//! Exposes an axum [`Router`] over a shared [`Workflow`] backed by any
//! [`WorkflowStore`]. Authentication, TLS and transport concerns belong to
//! the caller; the identity of each request arrives in trusted headers (see
//! [`extract`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", paperflow_api::api_router(workflow.clone()))
//! ```

pub mod assignments;
pub mod error;
pub mod etag;
pub mod extract;
pub mod faculty;
pub mod papers;
pub mod responses;
pub mod scrutiny;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use paperflow_core::{Workflow, store::WorkflowStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `workflow`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(workflow: Arc<Workflow<S>>) -> Router<()>
where
  S: WorkflowStore + 'static,
  paperflow_core::Error: From<S::Error>,
{
  Router::new()
    // Faculty directory
    .route("/faculty", get(faculty::list::<S>).post(faculty::register::<S>))
    .route("/faculty/{id}", get(faculty::get_one::<S>))
    // Assignments
    .route(
      "/assignments",
      get(assignments::list::<S>)
        .post(assignments::create::<S>)
        .delete(assignments::remove::<S>),
    )
    // Responses
    .route("/responses", post(responses::submit::<S>))
    .route("/responses/pending", get(responses::pending::<S>))
    // Question papers
    .route("/question-papers", get(papers::list::<S>).post(papers::submit::<S>))
    .route("/question-papers/{id}", get(papers::get_one::<S>))
    .route("/question-papers/{id}/document", get(papers::document::<S>))
    // Scrutiny
    .route("/question-papers/{id}/scrutinizer", post(scrutiny::assign::<S>))
    .route("/question-papers/{id}/scrutiny-request", post(scrutiny::respond::<S>))
    .route("/question-papers/{id}/verdict", post(scrutiny::verdict::<S>))
    .route("/scrutiny/assigned", get(scrutiny::assigned::<S>))
    .route("/scrutiny/requests", get(scrutiny::requests::<S>))
    .with_state(workflow)
}
