//! Per-candidate outcomes and the aggregate batch report.
//!
//! The original behavior of returning a flat success string is upgraded
//! here to a structured per-candidate result list, so idempotency and
//! failure semantics are observable to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{admission::AdmissionCandidate, student::StudentNumber};

// ─── Failure kinds ───────────────────────────────────────────────────────────

/// Why one candidate's admission failed. Always scoped to that candidate;
/// never aborts the batch under the best-effort policy.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureKind {
  /// The admissions store has no biodata row for the applicant.
  #[error("applicant biodata not found")]
  MissingBiodata,

  #[error("admissions store error: {0}")]
  AdmissionStore(String),

  /// Failure inside the store-B provisioning transaction; all four inserts
  /// were rolled back.
  #[error("institute store error: {0}")]
  InstituteStore(String),

  #[error("provisioning transaction timed out")]
  ProvisioningTimeout,

  #[error("password hashing failed: {0}")]
  Hash(String),
}

// ─── Per-candidate status ────────────────────────────────────────────────────

/// The outcome of processing one candidate.
///
/// `identity_provisioned` records whether this run created the store-B
/// identity. A `Duplicate` with `identity_provisioned: true` is the
/// partial-failure recovery path: store A already had the record, store B
/// was completed now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdmissionStatus {
  Admitted {
    stdno:                StudentNumber,
    identity_provisioned: bool,
  },
  Duplicate {
    stdno:                StudentNumber,
    identity_provisioned: bool,
  },
  Failed {
    kind: FailureKind,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateReport {
  pub candidate: AdmissionCandidate,
  pub status:    AdmissionStatus,
}

// ─── Batch report ────────────────────────────────────────────────────────────

/// Aggregate outcome of one pipeline invocation.
///
/// `received` counts every candidate submitted; under a fail-fast policy
/// `reports` may be shorter than `received`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
  pub received:   usize,
  pub admitted:   usize,
  pub duplicates: usize,
  pub failed:     usize,
  pub reports:    Vec<CandidateReport>,
}

impl BatchReport {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Append one candidate's report, bumping the matching counter.
  pub fn push(&mut self, report: CandidateReport) {
    match report.status {
      AdmissionStatus::Admitted { .. } => self.admitted += 1,
      AdmissionStatus::Duplicate { .. } => self.duplicates += 1,
      AdmissionStatus::Failed { .. } => self.failed += 1,
    }
    self.reports.push(report);
  }
}
