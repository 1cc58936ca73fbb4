//! JSON HTTP API for the matric admissions back-end.
//!
//! Exposes an axum [`Router`] backed by any combination of store
//! implementations. TLS and transport concerns are the caller's
//! responsibility.
//!
//! The admit endpoint preserves the upstream mutation contract: a batch of
//! `{applicant_id, scheme_id, program_id}` tuples plus an admitting staff
//! id in, a structured per-candidate report out.

pub mod admissions;
pub mod auth;
pub mod error;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use matric_core::store::{AdmissionStore, DirectoryStore, InstituteStore, PasswordHasher};
use matric_pipeline::AdmissionPipeline;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<A, I, D, H> {
  pub pipeline:   Arc<AdmissionPipeline<A, I, H>>,
  pub admissions: Arc<A>,
  pub directory:  Arc<D>,
  pub hasher:     Arc<H>,
}

// Manual impl: `#[derive(Clone)]` would demand Clone of the type parameters.
impl<A, I, D, H> Clone for ApiState<A, I, D, H> {
  fn clone(&self) -> Self {
    Self {
      pipeline:   Arc::clone(&self.pipeline),
      admissions: Arc::clone(&self.admissions),
      directory:  Arc::clone(&self.directory),
      hasher:     Arc::clone(&self.hasher),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for the given state.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<A, I, D, H>(state: ApiState<A, I, D, H>) -> Router<()>
where
  A: AdmissionStore + 'static,
  I: InstituteStore + 'static,
  D: DirectoryStore + 'static,
  H: PasswordHasher + 'static,
{
  Router::new()
    // Admissions
    .route("/admissions/admit", post(admissions::admit::<A, I, D, H>))
    .route(
      "/admissions/{applicant_id}/{scheme_id}/{program_id}",
      get(admissions::get_one::<A, I, D, H>),
    )
    // Staff users
    .route("/users", post(users::create::<A, I, D, H>))
    .route("/auth/login", post(auth::login::<A, I, D, H>))
    .route("/auth/change-password", post(auth::change_password::<A, I, D, H>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
