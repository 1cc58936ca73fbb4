//! Integration tests for the SQLite stores against in-memory databases.

use chrono::{Months, TimeZone as _, Utc};
use matric_core::{
  admission::{AdmissionCandidate, ApplicantBio, NewAdmission},
  directory::NewStaffUser,
  provision::NewProvisioning,
  store::{AdmissionStore, DirectoryStore, InstituteStore},
  student::StudentNumber,
};

use crate::{Error, SqliteAdmissions, SqliteDirectory, SqliteInstitute};

async fn admissions() -> SqliteAdmissions {
  SqliteAdmissions::open_in_memory()
    .await
    .expect("in-memory admissions store")
}

async fn institute() -> SqliteInstitute {
  SqliteInstitute::open_in_memory()
    .await
    .expect("in-memory institute store")
}

async fn directory() -> SqliteDirectory {
  SqliteDirectory::open_in_memory()
    .await
    .expect("in-memory directory store")
}

async fn count(conn: &tokio_rusqlite::Connection, table: &'static str) -> i64 {
  conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

fn candidate(applicant_id: i64) -> AdmissionCandidate {
  AdmissionCandidate { applicant_id, scheme_id: 1, program_id: 5 }
}

fn bio(applicant_id: i64) -> ApplicantBio {
  ApplicantBio {
    applicant_id,
    surname: "Namutebi".into(),
    other_names: "Grace".into(),
    email: format!("applicant{applicant_id}@example.com"),
    phone: Some("0700123456".into()),
  }
}

fn provisioning(stdno: &str) -> NewProvisioning {
  let start = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
  NewProvisioning {
    login:         StudentNumber::parse(stdno).unwrap(),
    password_hash: "$argon2id$fake".into(),
    first_name:    "Namutebi".into(),
    last_name:     "Grace".into(),
    email:         "grace@example.com".into(),
    phone:         Some("0700123456".into()),
    program_id:    5,
    created_by:    77,
    start_date:    start,
    deadline:      start + Months::new(60),
  }
}

// ─── Student-number allocation ───────────────────────────────────────────────

#[tokio::test]
async fn first_allocation_of_an_epoch() {
  let s = admissions().await;
  let n = s.allocate_student_number(2024).await.unwrap();
  assert_eq!(n.as_str(), "2400100001");
}

#[tokio::test]
async fn allocations_are_monotonic() {
  let s = admissions().await;
  let a = s.allocate_student_number(2024).await.unwrap();
  let b = s.allocate_student_number(2024).await.unwrap();
  let c = s.allocate_student_number(2024).await.unwrap();
  assert_eq!(a.as_str(), "2400100001");
  assert_eq!(b.as_str(), "2400100002");
  assert_eq!(c.as_str(), "2400100003");
}

#[tokio::test]
async fn epochs_have_independent_counters() {
  let s = admissions().await;
  s.allocate_student_number(2024).await.unwrap();
  s.allocate_student_number(2024).await.unwrap();

  let rollover = s.allocate_student_number(2025).await.unwrap();
  assert_eq!(rollover.as_str(), "2500100001");

  // The old epoch's counter is untouched by the rollover.
  let back = s.allocate_student_number(2024).await.unwrap();
  assert_eq!(back.as_str(), "2400100003");
}

#[tokio::test]
async fn allocation_seeds_from_legacy_admission_rows() {
  let s = admissions().await;
  s.insert_applicant(bio(10)).await.unwrap();

  // A row written before the counter table existed.
  s.insert_admission(NewAdmission {
    candidate:   candidate(10),
    stdno:       StudentNumber::parse("2400100037").unwrap(),
    admitted_by: 77,
  })
  .await
  .unwrap();

  let next = s.allocate_student_number(2024).await.unwrap();
  assert_eq!(next.as_str(), "2400100038");
}

// ─── Admission records ───────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_admission() {
  let s = admissions().await;
  s.insert_applicant(bio(10)).await.unwrap();

  let stdno = s.allocate_student_number(2024).await.unwrap();
  let record = s
    .insert_admission(NewAdmission {
      candidate: candidate(10),
      stdno: stdno.clone(),
      admitted_by: 77,
    })
    .await
    .unwrap();

  assert_eq!(record.stdno, stdno);
  assert_eq!(record.admitted_by, 77);

  let found = s.find_admission(candidate(10)).await.unwrap().unwrap();
  assert_eq!(found.id, record.id);
  assert_eq!(found.stdno, stdno);

  assert!(s.find_admission(candidate(11)).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_triple_is_rejected() {
  let s = admissions().await;
  s.insert_applicant(bio(10)).await.unwrap();

  let first = s.allocate_student_number(2024).await.unwrap();
  s.insert_admission(NewAdmission {
    candidate:   candidate(10),
    stdno:       first,
    admitted_by: 77,
  })
  .await
  .unwrap();

  let second = s.allocate_student_number(2024).await.unwrap();
  let err = s
    .insert_admission(NewAdmission {
      candidate:   candidate(10),
      stdno:       second,
      admitted_by: 77,
    })
    .await
    .unwrap_err();

  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn applicant_bio_round_trip() {
  let s = admissions().await;
  s.insert_applicant(bio(10)).await.unwrap();

  let fetched = s.applicant_bio(10).await.unwrap().unwrap();
  assert_eq!(fetched.surname, "Namutebi");
  assert_eq!(fetched.email, "applicant10@example.com");
  assert_eq!(fetched.full_name(), "Namutebi Grace");

  assert!(s.applicant_bio(99).await.unwrap().is_none());
}

// ─── Identity provisioning ───────────────────────────────────────────────────

#[tokio::test]
async fn provision_creates_all_four_rows() {
  let s = institute().await;
  let ids = s.provision(provisioning("2400100001")).await.unwrap();

  assert_eq!(count(&s.conn, "identities").await, 1);
  assert_eq!(count(&s.conn, "profiles").await, 1);
  assert_eq!(count(&s.conn, "workspaces").await, 1);
  assert_eq!(count(&s.conn, "workspace_members").await, 1);

  let (login, is_leader): (String, bool) = s
    .conn
    .call(move |conn| {
      Ok(conn.query_row(
        "SELECT i.login, m.is_leader
         FROM identities i
         JOIN workspace_members m ON m.identity_id = i.identity_id
         WHERE i.identity_id = ?1 AND m.workspace_id = ?2",
        rusqlite::params![ids.identity_id, ids.workspace_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )?)
    })
    .await
    .unwrap();

  assert_eq!(login, "2400100001");
  assert!(is_leader);
}

#[tokio::test]
async fn identity_exists_matches_email_or_stdno() {
  let s = institute().await;
  let stdno = StudentNumber::parse("2400100001").unwrap();
  let other = StudentNumber::parse("2400100002").unwrap();

  assert!(!s.identity_exists("grace@example.com", &stdno).await.unwrap());

  s.provision(provisioning("2400100001")).await.unwrap();

  // By student number (login), even with an unknown email.
  assert!(s.identity_exists("nobody@example.com", &stdno).await.unwrap());
  // By real email on the profile, even with a different number.
  assert!(s.identity_exists("grace@example.com", &other).await.unwrap());
  // Unrelated identity.
  assert!(!s.identity_exists("nobody@example.com", &other).await.unwrap());
}

#[tokio::test]
async fn failed_provisioning_rolls_back_every_row() {
  let s = institute().await;

  // A deadline at (not after) the start date violates the workspace CHECK,
  // forcing the third insert to fail.
  let mut input = provisioning("2400100001");
  input.deadline = input.start_date;

  let err = s.provision(input).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));

  assert_eq!(count(&s.conn, "identities").await, 0);
  assert_eq!(count(&s.conn, "profiles").await, 0);
  assert_eq!(count(&s.conn, "workspaces").await, 0);
  assert_eq!(count(&s.conn, "workspace_members").await, 0);

  let stdno = StudentNumber::parse("2400100001").unwrap();
  assert!(!s.identity_exists("grace@example.com", &stdno).await.unwrap());
}

// ─── Staff directory ─────────────────────────────────────────────────────────

#[tokio::test]
async fn staff_user_lifecycle() {
  let s = directory().await;

  let created = s
    .insert_user(NewStaffUser {
      staff_id:      5,
      email:         "registrar@example.com".into(),
      password_hash: "$argon2id$initial".into(),
      created_by:    1,
    })
    .await
    .unwrap();
  assert!(created.system_generated);

  let by_email = s
    .find_user_by_email("registrar@example.com")
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_email.user_id, created.user_id);

  let updated = s
    .set_password(created.user_id, "$argon2id$chosen".into())
    .await
    .unwrap();
  assert!(!updated.system_generated);
  assert_eq!(updated.password_hash, "$argon2id$chosen");
}

#[tokio::test]
async fn set_password_for_unknown_user_fails() {
  let s = directory().await;
  let err = s.set_password(42, "$argon2id$x".into()).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(42)));
}

#[tokio::test]
async fn previous_login_skips_the_current_session() {
  let s = directory().await;
  let user = s
    .insert_user(NewStaffUser {
      staff_id:      5,
      email:         "registrar@example.com".into(),
      password_hash: "$argon2id$initial".into(),
      created_by:    1,
    })
    .await
    .unwrap();

  assert!(s.previous_login(user.user_id).await.unwrap().is_none());

  // First login: it is its own "previous" session.
  let first = s
    .record_login(user.user_id, Some("10.0.0.1".into()))
    .await
    .unwrap();
  let seen = s.previous_login(user.user_id).await.unwrap().unwrap();
  assert_eq!(seen.login_id, first.login_id);

  // Second login: the previous session is the first one.
  s.record_login(user.user_id, Some("10.0.0.2".into()))
    .await
    .unwrap();
  let seen = s.previous_login(user.user_id).await.unwrap().unwrap();
  assert_eq!(seen.login_id, first.login_id);
  assert_eq!(seen.client_addr.as_deref(), Some("10.0.0.1"));
}
