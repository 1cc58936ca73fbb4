//! [`AdmissionPipeline`] — the batch driver and cross-store coordinator.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Datelike as _, Months, Utc};
use matric_core::{
  admission::{AdmissionCandidate, NewAdmission},
  provision::NewProvisioning,
  report::{AdmissionStatus, BatchReport, CandidateReport, FailureKind},
  store::{AdmissionStore, InstituteStore, PasswordHasher},
  student::StudentNumber,
};
use serde::Deserialize;

/// Lifetime of the default workspace created for every provisioned student.
pub const WORKSPACE_LIFETIME_YEARS: u32 = 5;

// ─── Configuration ───────────────────────────────────────────────────────────

/// What to do with the rest of a batch after one candidate fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
  /// Record the failure and continue with the next candidate.
  #[default]
  BestEffort,
  /// Stop after the first failure; remaining candidates are not processed.
  FailFast,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
  pub error_policy:      ErrorPolicy,
  /// Upper bound on the store-B provisioning transaction. Expiry is
  /// surfaced as [`FailureKind::ProvisioningTimeout`] for that candidate
  /// only, never as a batch-wide abort.
  pub provision_timeout: Duration,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      error_policy:      ErrorPolicy::BestEffort,
      provision_timeout: Duration::from_secs(30),
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Admits a batch of candidates, one at a time, in input order.
///
/// Per candidate:
/// 1. look up an existing admission record (idempotency guard);
/// 2. if absent, atomically allocate a student number and insert the
///    record into the admissions store;
/// 3. fetch the applicant's biodata;
/// 4. skip provisioning silently when the email or student number already
///    exists in the institute store;
/// 5. otherwise provision identity + profile + workspace + membership in
///    one institute-store transaction, bounded by a timeout.
///
/// Steps 2 and 5 are not covered by a common transaction. A crash between
/// them leaves an admission record with no identity; step 4 is exactly the
/// recovery mechanism — re-running the same candidate completes store B
/// without touching store A again. A committed admission record is never
/// compensated.
pub struct AdmissionPipeline<A, I, H> {
  admissions: Arc<A>,
  institute:  Arc<I>,
  hasher:     Arc<H>,
  config:     PipelineConfig,
}

impl<A, I, H> AdmissionPipeline<A, I, H>
where
  A: AdmissionStore,
  I: InstituteStore,
  H: PasswordHasher,
{
  pub fn new(
    admissions: Arc<A>,
    institute: Arc<I>,
    hasher: Arc<H>,
    config: PipelineConfig,
  ) -> Self {
    Self { admissions, institute, hasher, config }
  }

  /// Process `candidates` sequentially and aggregate a [`BatchReport`].
  ///
  /// An empty batch returns an empty report without touching any store.
  /// `now` fixes both the allocation epoch and the workspace window; the
  /// pipeline itself never reads the clock.
  pub async fn admit(
    &self,
    candidates: &[AdmissionCandidate],
    admitted_by: i64,
    now: DateTime<Utc>,
  ) -> BatchReport {
    if candidates.is_empty() {
      tracing::info!("admission batch was empty, nothing to do");
      return BatchReport::empty();
    }

    let mut report = BatchReport { received: candidates.len(), ..BatchReport::empty() };

    for &candidate in candidates {
      let status = match self.admit_one(candidate, admitted_by, now).await {
        Ok(status) => status,
        Err(kind) => {
          tracing::warn!(
            applicant_id = candidate.applicant_id,
            scheme_id = candidate.scheme_id,
            program_id = candidate.program_id,
            error = %kind,
            "admission failed for candidate"
          );
          AdmissionStatus::Failed { kind }
        }
      };

      if let AdmissionStatus::Admitted { stdno, .. } = &status {
        tracing::info!(
          applicant_id = candidate.applicant_id,
          %stdno,
          "student admitted"
        );
      }

      let failed = matches!(status, AdmissionStatus::Failed { .. });
      report.push(CandidateReport { candidate, status });

      if failed && self.config.error_policy == ErrorPolicy::FailFast {
        break;
      }
    }

    report
  }

  async fn admit_one(
    &self,
    candidate: AdmissionCandidate,
    admitted_by: i64,
    now: DateTime<Utc>,
  ) -> Result<AdmissionStatus, FailureKind> {
    // Idempotency guard on store A: re-submitting an admitted candidate
    // must not re-allocate a number or insert a second record.
    let existing = self
      .admissions
      .find_admission(candidate)
      .await
      .map_err(|e| FailureKind::AdmissionStore(e.to_string()))?;

    let (stdno, duplicate) = match existing {
      Some(record) => (record.stdno, true),
      None => {
        let stdno = self
          .admissions
          .allocate_student_number(now.year())
          .await
          .map_err(|e| FailureKind::AdmissionStore(e.to_string()))?;

        self
          .admissions
          .insert_admission(NewAdmission {
            candidate,
            stdno: stdno.clone(),
            admitted_by,
          })
          .await
          .map_err(|e| FailureKind::AdmissionStore(e.to_string()))?;

        (stdno, false)
      }
    };

    let provisioned = self
      .provision_identity(candidate, &stdno, admitted_by, now)
      .await?;

    Ok(if duplicate {
      AdmissionStatus::Duplicate { stdno, identity_provisioned: provisioned }
    } else {
      AdmissionStatus::Admitted { stdno, identity_provisioned: provisioned }
    })
  }

  /// Provision the store-B identity for an admitted student. Returns
  /// `false` when an identity already existed and nothing was written.
  async fn provision_identity(
    &self,
    candidate: AdmissionCandidate,
    stdno: &StudentNumber,
    admitted_by: i64,
    now: DateTime<Utc>,
  ) -> Result<bool, FailureKind> {
    let bio = self
      .admissions
      .applicant_bio(candidate.applicant_id)
      .await
      .map_err(|e| FailureKind::AdmissionStore(e.to_string()))?
      .ok_or(FailureKind::MissingBiodata)?;

    let exists = self
      .institute
      .identity_exists(&bio.email, stdno)
      .await
      .map_err(|e| FailureKind::InstituteStore(e.to_string()))?;

    if exists {
      return Ok(false);
    }

    // The student number doubles as login and initial password.
    let password_hash = self
      .hasher
      .hash(stdno.as_str())
      .map_err(|e| FailureKind::Hash(e.to_string()))?;

    let input = NewProvisioning {
      login: stdno.clone(),
      password_hash,
      first_name: bio.surname,
      last_name: bio.other_names,
      email: bio.email,
      phone: bio.phone,
      program_id: candidate.program_id,
      created_by: admitted_by,
      start_date: now,
      deadline: now + Months::new(12 * WORKSPACE_LIFETIME_YEARS),
    };

    match tokio::time::timeout(self.config.provision_timeout, self.institute.provision(input))
      .await
    {
      Err(_) => Err(FailureKind::ProvisioningTimeout),
      Ok(Err(e)) => Err(FailureKind::InstituteStore(e.to_string())),
      Ok(Ok(_)) => Ok(true),
    }
  }
}
