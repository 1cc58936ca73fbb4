//! Router tests against in-memory SQLite stores.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header::CONTENT_TYPE},
};
use matric_core::{admission::ApplicantBio, store::PasswordHasher};
use matric_pipeline::{AdmissionPipeline, PipelineConfig};
use matric_store_sqlite::{SqliteAdmissions, SqliteDirectory, SqliteInstitute};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

// Deterministic stand-in for the argon2 hasher in the server crate.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
  fn hash(&self, plaintext: &str) -> matric_core::Result<String> {
    Ok(format!("plain:{plaintext}"))
  }

  fn verify(&self, plaintext: &str, digest: &str) -> matric_core::Result<bool> {
    Ok(digest == format!("plain:{plaintext}"))
  }
}

async fn app() -> (Router, Arc<SqliteAdmissions>) {
  let admissions = Arc::new(SqliteAdmissions::open_in_memory().await.unwrap());
  let institute = Arc::new(SqliteInstitute::open_in_memory().await.unwrap());
  let directory = Arc::new(SqliteDirectory::open_in_memory().await.unwrap());
  let hasher = Arc::new(PlainHasher);

  let pipeline = Arc::new(AdmissionPipeline::new(
    Arc::clone(&admissions),
    Arc::clone(&institute),
    Arc::clone(&hasher),
    PipelineConfig::default(),
  ));

  let state = ApiState {
    pipeline,
    admissions: Arc::clone(&admissions),
    directory,
    hasher,
  };
  (api_router(state), admissions)
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(v) => builder
      .header(CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let res = app.clone().oneshot(req).await.unwrap();
  let status = res.status();
  let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn seed_bio(applicant_id: i64) -> ApplicantBio {
  ApplicantBio {
    applicant_id,
    surname: "Achieng".into(),
    other_names: "Mary".into(),
    email: format!("applicant{applicant_id}@example.com"),
    phone: None,
  }
}

// ─── Admissions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn admit_fetch_and_resubmit() {
  let (app, admissions) = app().await;
  admissions.insert_applicant(seed_bio(10)).await.unwrap();

  let body = json!({
    "candidates": [{ "applicant_id": 10, "scheme_id": 1, "program_id": 5 }],
    "admitted_by": 77,
  });

  let (status, report) = request(&app, "POST", "/admissions/admit", Some(body.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["admitted"], 1);
  assert_eq!(report["reports"][0]["status"]["status"], "admitted");
  let stdno = report["reports"][0]["status"]["stdno"].as_str().unwrap().to_owned();

  let (status, record) = request(&app, "GET", "/admissions/10/1/5", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(record["stdno"], stdno.as_str());
  assert_eq!(record["admitted_by"], 77);

  // Resubmission: no new rows, candidate reported as duplicate.
  let (status, report) = request(&app, "POST", "/admissions/admit", Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["admitted"], 0);
  assert_eq!(report["duplicates"], 1);
}

#[tokio::test]
async fn missing_admission_is_not_found() {
  let (app, _) = app().await;
  let (status, body) = request(&app, "GET", "/admissions/1/2/3", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());
}

// ─── Staff users ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_creation_login_and_password_change() {
  let (app, _) = app().await;

  let (status, created) = request(
    &app,
    "POST",
    "/users",
    Some(json!({ "staff_id": 5, "email": "registrar@example.com", "created_by": 1 })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["system_generated"], true);
  let password = created["password"].as_str().unwrap().to_owned();
  let user_id = created["user_id"].as_i64().unwrap();

  // Wrong password is rejected before any audit entry is written.
  let (status, _) = request(
    &app,
    "POST",
    "/auth/login",
    Some(json!({ "email": "registrar@example.com", "password": "wrong" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, session) = request(
    &app,
    "POST",
    "/auth/login",
    Some(json!({ "email": "registrar@example.com", "password": password })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(session["user_id"], user_id);
  // First login counts as its own previous session.
  assert!(session["previous_login"].is_object());

  let (status, updated) = request(
    &app,
    "POST",
    "/auth/change-password",
    Some(json!({ "user_id": user_id, "password": "chosen-password" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["system_generated"], false);

  let (status, _) = request(
    &app,
    "POST",
    "/auth/login",
    Some(json!({ "email": "registrar@example.com", "password": "chosen-password" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_password_for_unknown_user_is_not_found() {
  let (app, _) = app().await;
  let (status, _) = request(
    &app,
    "POST",
    "/auth/change-password",
    Some(json!({ "user_id": 42, "password": "whatever" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}
