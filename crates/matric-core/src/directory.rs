//! Staff-directory types (store C).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for creating a management user. Passwords are always
/// system-generated at creation; the `system_generated` flag is cleared on
/// the first password change.
#[derive(Debug, Clone)]
pub struct NewStaffUser {
  pub staff_id:      i64,
  pub email:         String,
  pub password_hash: String,
  pub created_by:    i64,
}

/// A management user of the admissions back-office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
  pub user_id:          i64,
  pub staff_id:         i64,
  pub email:            String,
  #[serde(skip_serializing, default)]
  pub password_hash:    String,
  pub system_generated: bool,
  pub created_by:       i64,
  pub created_at:       DateTime<Utc>,
}

/// One successful login, appended to the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginEvent {
  pub login_id:     i64,
  pub user_id:      i64,
  pub client_addr:  Option<String>,
  pub logged_in_at: DateTime<Utc>,
}
