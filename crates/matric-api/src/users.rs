//! Staff-user creation.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use matric_core::{
  directory::{NewStaffUser, StaffUser},
  store::{AdmissionStore, DirectoryStore, InstituteStore, PasswordHasher},
};
use rand_core::RngCore as _;
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
  pub staff_id:   i64,
  pub email:      String,
  pub created_by: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
  #[serde(flatten)]
  pub user:     StaffUser,
  /// The system-generated password, disclosed exactly once here. Only its
  /// hash is stored.
  pub password: String,
}

/// `POST /users`
pub async fn create<A, I, D, H>(
  State(state): State<ApiState<A, I, D, H>>,
  Json(body): Json<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError>
where
  A: AdmissionStore,
  I: InstituteStore,
  D: DirectoryStore,
  H: PasswordHasher,
{
  let password = generate_system_password();
  let password_hash = state.hasher.hash(&password).map_err(ApiError::store)?;

  let user = state
    .directory
    .insert_user(NewStaffUser {
      staff_id: body.staff_id,
      email: body.email,
      password_hash,
      created_by: body.created_by,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(CreatedUser { user, password })))
}

/// 16 hex chars from the OS entropy source.
fn generate_system_password() -> String {
  let mut bytes = [0u8; 8];
  rand_core::OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

#[cfg(test)]
mod tests {
  use super::generate_system_password;

  #[test]
  fn generated_passwords_are_unique_and_sized() {
    let a = generate_system_password();
    let b = generate_system_password();
    assert_eq!(a.len(), 16);
    assert_ne!(a, b);
  }
}
