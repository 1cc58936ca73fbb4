//! Institute-side provisioning types (store B).
//!
//! An identity, its profile, a default workspace, and the leader membership
//! are created together inside one store-B transaction — they have no
//! independent existence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::student::StudentNumber;

/// Everything the institute store needs to provision one student.
///
/// The login is the student number; `password_hash` is the one-way hash of
/// that same number. The profile keeps the applicant's real email.
#[derive(Debug, Clone)]
pub struct NewProvisioning {
  pub login:         StudentNumber,
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub phone:         Option<String>,
  pub program_id:    i64,
  /// The admitting staff member, recorded as the workspace creator.
  pub created_by:    i64,
  pub start_date:    DateTime<Utc>,
  /// Workspace lifetime window; must lie strictly after `start_date`.
  pub deadline:      DateTime<Utc>,
}

impl NewProvisioning {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

/// Generated row ids of a completed provisioning transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProvisionedIdentity {
  pub identity_id:  i64,
  pub workspace_id: i64,
}
