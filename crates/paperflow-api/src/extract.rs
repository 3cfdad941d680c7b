//! Request extractors.
//!
//! The caller's identity is established upstream by an authenticating proxy
//! and forwarded in trusted headers:
//!
//! | Header | Notes |
//! |--------|-------|
//! | `x-paperflow-role` | `admin` or `faculty`, case-insensitive. Required. |
//! | `x-paperflow-faculty-id` | Required for `faculty`. |
//! | `x-paperflow-user` | Optional admin username, recorded as `assignedBy`. |
//!
//! Body, query and path extractors wrap axum's own so that decoding failures
//! come back as [`ApiError`] JSON instead of plain-text rejections.

use axum::{
  extract::{FromRequest, FromRequestParts},
  http::{HeaderMap, request::Parts},
};
use paperflow_core::Identity;

use crate::error::ApiError;

pub const ROLE_HEADER: &str = "x-paperflow-role";
pub const FACULTY_ID_HEADER: &str = "x-paperflow-faculty-id";
pub const USER_HEADER: &str = "x-paperflow-user";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned)
}

/// Read the identity headers.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, ApiError> {
  let role = header(headers, ROLE_HEADER).ok_or_else(|| {
    paperflow_core::Error::unauthorized(format!("missing {ROLE_HEADER} header"))
  })?;
  let identity = Identity::from_parts(
    &role,
    header(headers, FACULTY_ID_HEADER),
    header(headers, USER_HEADER),
  )?;
  Ok(identity)
}

impl<T> FromRequestParts<T> for Caller
where
  T: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &T) -> Result<Self, Self::Rejection> {
    identity_from_headers(&parts.headers).map(Caller)
  }
}

/// `axum::Json` with [`ApiError`] rejections.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Query` with [`ApiError`] rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// `axum::extract::Path` with [`ApiError`] rejections.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
