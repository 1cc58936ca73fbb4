//! [`SqliteDirectory`] — the SQLite implementation of
//! [`DirectoryStore`] (store C).

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use matric_core::{
  directory::{LoginEvent, NewStaffUser, StaffUser},
  store::DirectoryStore,
};

use crate::{
  Error, Result,
  encode::{decode_dt, encode_dt},
  schema::DIRECTORY_SCHEMA,
};

// ─── Raw rows ────────────────────────────────────────────────────────────────

struct RawStaffUser {
  user_id:          i64,
  staff_id:         i64,
  email:            String,
  password_hash:    String,
  system_generated: bool,
  created_by:       i64,
  created_at:       String,
}

impl RawStaffUser {
  fn into_user(self) -> Result<StaffUser> {
    Ok(StaffUser {
      user_id:          self.user_id,
      staff_id:         self.staff_id,
      email:            self.email,
      password_hash:    self.password_hash,
      system_generated: self.system_generated,
      created_by:       self.created_by,
      created_at:       decode_dt(&self.created_at)?,
    })
  }

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:          row.get(0)?,
      staff_id:         row.get(1)?,
      email:            row.get(2)?,
      password_hash:    row.get(3)?,
      system_generated: row.get(4)?,
      created_by:       row.get(5)?,
      created_at:       row.get(6)?,
    })
  }
}

const USER_COLUMNS: &str =
  "user_id, staff_id, email, password_hash, system_generated, created_by, created_at";

struct RawLoginEvent {
  login_id:     i64,
  user_id:      i64,
  client_addr:  Option<String>,
  logged_in_at: String,
}

impl RawLoginEvent {
  fn into_event(self) -> Result<LoginEvent> {
    Ok(LoginEvent {
      login_id:     self.login_id,
      user_id:      self.user_id,
      client_addr:  self.client_addr,
      logged_in_at: decode_dt(&self.logged_in_at)?,
    })
  }

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      login_id:     row.get(0)?,
      user_id:      row.get(1)?,
      client_addr:  row.get(2)?,
      logged_in_at: row.get(3)?,
    })
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The staff/HR database, backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteDirectory {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteDirectory {
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
        conn.execute_batch(DIRECTORY_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteDirectory {
  type Error = Error;

  async fn insert_user(&self, input: NewStaffUser) -> Result<StaffUser> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let user = input.clone();

    let user_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO staff_users
             (staff_id, email, password_hash, system_generated, created_by, created_at)
           VALUES (?1, ?2, ?3, 1, ?4, ?5)",
          rusqlite::params![
            input.staff_id,
            input.email,
            input.password_hash,
            input.created_by,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(StaffUser {
      user_id,
      staff_id: user.staff_id,
      email: user.email,
      password_hash: user.password_hash,
      system_generated: true,
      created_by: user.created_by,
      created_at,
    })
  }

  async fn find_user(&self, user_id: i64) -> Result<Option<StaffUser>> {
    let raw: Option<RawStaffUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM staff_users WHERE user_id = ?1"),
              rusqlite::params![user_id],
              RawStaffUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStaffUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<StaffUser>> {
    let email = email.to_owned();

    let raw: Option<RawStaffUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM staff_users WHERE email = ?1"),
              rusqlite::params![email],
              RawStaffUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStaffUser::into_user).transpose()
  }

  async fn set_password(&self, user_id: i64, password_hash: String) -> Result<StaffUser> {
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE staff_users SET password_hash = ?2, system_generated = 0
           WHERE user_id = ?1",
          rusqlite::params![user_id, password_hash],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::UserNotFound(user_id));
    }

    self
      .find_user(user_id)
      .await?
      .ok_or(Error::UserNotFound(user_id))
  }

  async fn record_login(
    &self,
    user_id: i64,
    client_addr: Option<String>,
  ) -> Result<LoginEvent> {
    let logged_in_at = Utc::now();
    let at_str = encode_dt(logged_in_at);
    let addr = client_addr.clone();

    let login_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO login_events (user_id, client_addr, logged_in_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_id, addr, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(LoginEvent { login_id, user_id, client_addr, logged_in_at })
  }

  async fn previous_login(&self, user_id: i64) -> Result<Option<LoginEvent>> {
    let raw: Option<RawLoginEvent> = self
      .conn
      .call(move |conn| {
        // Second-most-recent event — the session before the one just
        // recorded — falling back to the most recent for first logins.
        let previous = conn
          .query_row(
            "SELECT login_id, user_id, client_addr, logged_in_at
             FROM login_events WHERE user_id = ?1
             ORDER BY login_id DESC LIMIT 1 OFFSET 1",
            rusqlite::params![user_id],
            RawLoginEvent::from_row,
          )
          .optional()?;

        if previous.is_some() {
          return Ok(previous);
        }

        Ok(
          conn
            .query_row(
              "SELECT login_id, user_id, client_addr, logged_in_at
               FROM login_events WHERE user_id = ?1
               ORDER BY login_id DESC LIMIT 1",
              rusqlite::params![user_id],
              RawLoginEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLoginEvent::into_event).transpose()
  }
}
