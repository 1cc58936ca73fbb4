//! Admission-side domain types (store A).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::student::StudentNumber;

/// A request to admit one applicant onto one program under one scheme.
///
/// Transient — supplied per batch invocation, never persisted as-is. The
/// triple is also the idempotency key: at most one admission record may ever
/// exist for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionCandidate {
  pub applicant_id: i64,
  pub scheme_id:    i64,
  pub program_id:   i64,
}

/// Input for inserting an admission record.
#[derive(Debug, Clone)]
pub struct NewAdmission {
  pub candidate:   AdmissionCandidate,
  pub stdno:       StudentNumber,
  pub admitted_by: i64,
}

/// Persistent proof that a candidate was admitted.
///
/// Created once, never mutated, never deleted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionRecord {
  pub id:           i64,
  pub applicant_id: i64,
  pub scheme_id:    i64,
  pub program_id:   i64,
  pub stdno:        StudentNumber,
  pub admitted_by:  i64,
  pub created_at:   DateTime<Utc>,
}

/// The identity-source fields of an applicant, as held by the admissions
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantBio {
  pub applicant_id: i64,
  pub surname:      String,
  pub other_names:  String,
  /// The applicant's real address — kept on the provisioned profile, not
  /// used as the login.
  pub email:        String,
  pub phone:        Option<String>,
}

impl ApplicantBio {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.surname, self.other_names)
  }
}
