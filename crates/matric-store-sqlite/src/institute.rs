//! [`SqliteInstitute`] — the SQLite implementation of
//! [`InstituteStore`] (store B).
//!
//! The four provisioning inserts run inside a single rusqlite transaction;
//! dropping the transaction on any early return rolls everything back, so
//! partial provisioning is never observable.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use matric_core::{
  provision::{NewProvisioning, ProvisionedIdentity},
  store::InstituteStore,
  student::StudentNumber,
};

use crate::{Error, Result, encode::encode_dt, schema::INSTITUTE_SCHEMA};

/// The postgraduate-institute database, backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteInstitute {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteInstitute {
  /// Open (or create) the store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(INSTITUTE_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── InstituteStore impl ─────────────────────────────────────────────────────

impl InstituteStore for SqliteInstitute {
  type Error = Error;

  async fn identity_exists(&self, email: &str, stdno: &StudentNumber) -> Result<bool> {
    let email = email.to_owned();
    let stdno = stdno.as_str().to_owned();

    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM identities i
               LEFT JOIN profiles p ON p.identity_id = i.identity_id
               WHERE i.login = ?1 OR i.login = ?2 OR p.email = ?1 OR p.stdno = ?2
               LIMIT 1",
              rusqlite::params![email, stdno],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn provision(&self, input: NewProvisioning) -> Result<ProvisionedIdentity> {
    let full_name = input.full_name();
    let created_at_str = encode_dt(Utc::now());
    let start_str = encode_dt(input.start_date);
    let deadline_str = encode_dt(input.deadline);

    let provisioned = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO identities
             (login, password_hash, first_name, last_name, role, status, created_at)
           VALUES (?1, ?2, ?3, ?4, 'student', 'active', ?5)",
          rusqlite::params![
            input.login.as_str(),
            input.password_hash,
            input.first_name,
            input.last_name,
            created_at_str,
          ],
        )?;
        let identity_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO profiles
             (identity_id, full_name, stdno, email, phone, program_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            identity_id,
            full_name,
            input.login.as_str(),
            input.email,
            input.phone,
            input.program_id,
          ],
        )?;

        // The default workspace carries the student's name as both title
        // and description, mirroring the upstream project records.
        tx.execute(
          "INSERT INTO workspaces
             (identity_id, title, description, start_date, deadline, created_by, status)
           VALUES (?1, ?2, ?2, ?3, ?4, ?5, 'open')",
          rusqlite::params![identity_id, full_name, start_str, deadline_str, input.created_by],
        )?;
        let workspace_id = tx.last_insert_rowid();

        tx.execute(
          "INSERT INTO workspace_members (identity_id, workspace_id, is_leader)
           VALUES (?1, ?2, 1)",
          rusqlite::params![identity_id, workspace_id],
        )?;

        tx.commit()?;
        Ok(ProvisionedIdentity { identity_id, workspace_id })
      })
      .await?;

    Ok(provisioned)
  }
}
