//! Staff login and password management.

use axum::{Json, extract::State, http::HeaderMap};
use matric_core::{
  directory::{LoginEvent, StaffUser},
  store::{AdmissionStore, DirectoryStore, InstituteStore, PasswordHasher},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  #[serde(flatten)]
  pub user:           StaffUser,
  /// The session before this one, for the "last seen" display.
  pub previous_login: Option<LoginEvent>,
}

/// `POST /auth/login`
///
/// Unknown email and wrong password are indistinguishable to the caller.
/// A successful login is appended to the audit trail.
pub async fn login<A, I, D, H>(
  State(state): State<ApiState<A, I, D, H>>,
  headers: HeaderMap,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  A: AdmissionStore,
  I: InstituteStore,
  D: DirectoryStore,
  H: PasswordHasher,
{
  let user = state
    .directory
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let valid = state
    .hasher
    .verify(&body.password, &user.password_hash)
    .map_err(ApiError::store)?;
  if !valid {
    return Err(ApiError::Unauthorized);
  }

  state
    .directory
    .record_login(user.user_id, client_addr(&headers))
    .await
    .map_err(ApiError::store)?;

  let previous_login = state
    .directory
    .previous_login(user.user_id)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(LoginResponse { user, previous_login }))
}

/// First hop of `X-Forwarded-For`, when a proxy supplies it.
fn client_addr(headers: &HeaderMap) -> Option<String> {
  headers
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(|v| v.trim().to_owned())
}

// ─── Change password ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
  pub user_id:  i64,
  pub password: String,
}

/// `POST /auth/change-password`
///
/// Re-hashes and stores the chosen password, clearing the
/// system-generated flag.
pub async fn change_password<A, I, D, H>(
  State(state): State<ApiState<A, I, D, H>>,
  Json(body): Json<ChangePasswordBody>,
) -> Result<Json<StaffUser>, ApiError>
where
  A: AdmissionStore,
  I: InstituteStore,
  D: DirectoryStore,
  H: PasswordHasher,
{
  state
    .directory
    .find_user(body.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("staff user {} not found", body.user_id)))?;

  let hash = state.hasher.hash(&body.password).map_err(ApiError::store)?;

  let user = state
    .directory
    .set_password(body.user_id, hash)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(user))
}
