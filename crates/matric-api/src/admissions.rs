//! Handlers for `/admissions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admissions/admit` | Batch in, per-candidate report out |
//! | `GET`  | `/admissions/:applicant_id/:scheme_id/:program_id` | 404 if not admitted |

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::Utc;
use matric_core::{
  admission::{AdmissionCandidate, AdmissionRecord},
  report::BatchReport,
  store::{AdmissionStore, DirectoryStore, InstituteStore, PasswordHasher},
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Admit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdmitBody {
  pub candidates:  Vec<AdmissionCandidate>,
  pub admitted_by: i64,
}

/// `POST /admissions/admit`
///
/// Never fails because of a single candidate; per-candidate outcomes are in
/// the returned report.
pub async fn admit<A, I, D, H>(
  State(state): State<ApiState<A, I, D, H>>,
  Json(body): Json<AdmitBody>,
) -> Result<Json<BatchReport>, ApiError>
where
  A: AdmissionStore,
  I: InstituteStore,
  D: DirectoryStore,
  H: PasswordHasher,
{
  let report = state
    .pipeline
    .admit(&body.candidates, body.admitted_by, Utc::now())
    .await;
  Ok(Json(report))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /admissions/:applicant_id/:scheme_id/:program_id`
pub async fn get_one<A, I, D, H>(
  State(state): State<ApiState<A, I, D, H>>,
  Path((applicant_id, scheme_id, program_id)): Path<(i64, i64, i64)>,
) -> Result<Json<AdmissionRecord>, ApiError>
where
  A: AdmissionStore,
  I: InstituteStore,
  D: DirectoryStore,
  H: PasswordHasher,
{
  let candidate = AdmissionCandidate { applicant_id, scheme_id, program_id };

  let record = state
    .admissions
    .find_admission(candidate)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no admission for applicant {applicant_id} on scheme {scheme_id}, program {program_id}"
      ))
    })?;

  Ok(Json(record))
}
