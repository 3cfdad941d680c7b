//! Core types, trait definitions and the workflow service for paperflow: the
//! faculty-assignment and question-paper scrutiny process of an academic
//! department.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::WorkflowStore`]; transports call into
//! [`workflow::Workflow`] with an explicit [`Identity`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod assignment;
pub mod error;
pub mod faculty;
pub mod identity;
pub mod paper;
pub mod render;
pub mod store;
pub mod workflow;

pub use error::{Error, ErrorKind, Result};
pub use identity::{Identity, Role};
pub use workflow::Workflow;
