//! Store traits and the password-hashing seam.
//!
//! The three stores are independently owned relational databases with no
//! shared transaction manager. Each trait is implemented by a storage
//! backend (e.g. `matric-store-sqlite`); the pipeline and the API depend on
//! these abstractions, not on any concrete backend.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  admission::{AdmissionCandidate, AdmissionRecord, ApplicantBio, NewAdmission},
  directory::{LoginEvent, NewStaffUser, StaffUser},
  provision::{NewProvisioning, ProvisionedIdentity},
  student::StudentNumber,
};

// ─── Store A — admissions ────────────────────────────────────────────────────

/// The admissions database: applicant biodata, admission records, and the
/// per-epoch student-number counter.
pub trait AdmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Exact-match lookup on the (applicant, scheme, program) triple.
  ///
  /// Returns the existing record rather than a bare bool so a duplicate's
  /// already-assigned student number can drive store-B recovery.
  fn find_admission(
    &self,
    candidate: AdmissionCandidate,
  ) -> impl Future<Output = Result<Option<AdmissionRecord>, Self::Error>> + Send + '_;

  /// Allocate the next student number for the epoch of `now_year`.
  ///
  /// Must be an atomic increment-and-read against a dedicated counter —
  /// two concurrent calls must never observe the same value. On the first
  /// allocation of an epoch the counter is seeded from any legacy admission
  /// rows carrying that year prefix.
  fn allocate_student_number(
    &self,
    now_year: i32,
  ) -> impl Future<Output = Result<StudentNumber, Self::Error>> + Send + '_;

  /// Insert a new admission record. Fails if the triple already exists.
  fn insert_admission(
    &self,
    input: NewAdmission,
  ) -> impl Future<Output = Result<AdmissionRecord, Self::Error>> + Send + '_;

  /// Fetch the identity-source fields for an applicant.
  fn applicant_bio(
    &self,
    applicant_id: i64,
  ) -> impl Future<Output = Result<Option<ApplicantBio>, Self::Error>> + Send + '_;
}

// ─── Store B — institute ─────────────────────────────────────────────────────

/// The postgraduate-institute database into which admitted students are
/// provisioned.
pub trait InstituteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// True if either the real email or the student number matches any
  /// existing identity. A true result makes provisioning a silent no-op —
  /// this is the recovery mechanism for the cross-store consistency gap.
  fn identity_exists<'a>(
    &'a self,
    email: &'a str,
    stdno: &'a StudentNumber,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Insert identity, profile, default workspace, and leader membership
  /// inside one transaction. Any failure rolls back all four inserts;
  /// partial provisioning must never be observable.
  fn provision(
    &self,
    input: NewProvisioning,
  ) -> impl Future<Output = Result<ProvisionedIdentity, Self::Error>> + Send + '_;
}

// ─── Store C — staff directory ───────────────────────────────────────────────

/// The staff/HR database holding back-office management users.
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn insert_user(
    &self,
    input: NewStaffUser,
  ) -> impl Future<Output = Result<StaffUser, Self::Error>> + Send + '_;

  fn find_user(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<StaffUser>, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<StaffUser>, Self::Error>> + Send + 'a;

  /// Replace the stored hash and clear the `system_generated` flag.
  fn set_password(
    &self,
    user_id: i64,
    password_hash: String,
  ) -> impl Future<Output = Result<StaffUser, Self::Error>> + Send + '_;

  /// Append a login event to the audit trail.
  fn record_login(
    &self,
    user_id: i64,
    client_addr: Option<String>,
  ) -> impl Future<Output = Result<LoginEvent, Self::Error>> + Send + '_;

  /// The login before the most recent one, falling back to the most recent
  /// when the user has logged in only once.
  fn previous_login(
    &self,
    user_id: i64,
  ) -> impl Future<Output = Result<Option<LoginEvent>, Self::Error>> + Send + '_;
}

// ─── Password hashing ────────────────────────────────────────────────────────

/// One-way credential hashing, consumed opaquely by the pipeline and the
/// API. The concrete algorithm lives with the server binary.
pub trait PasswordHasher: Send + Sync {
  /// Hash `plaintext` with a fresh salt, returning an encoded digest
  /// string that `verify` accepts.
  fn hash(&self, plaintext: &str) -> crate::Result<String>;

  /// Check `plaintext` against a stored digest. `Ok(false)` means a clean
  /// mismatch; `Err` means the digest itself is unusable.
  fn verify(&self, plaintext: &str, digest: &str) -> crate::Result<bool>;
}
