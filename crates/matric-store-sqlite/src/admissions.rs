//! [`SqliteAdmissions`] — the SQLite implementation of
//! [`AdmissionStore`] (store A).

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use matric_core::{
  admission::{AdmissionCandidate, AdmissionRecord, ApplicantBio, NewAdmission},
  store::AdmissionStore,
  student::StudentNumber,
};

use crate::{
  Error, Result,
  encode::{core_err, decode_dt, decode_stdno, encode_dt},
  schema::ADMISSIONS_SCHEMA,
};

// ─── Raw rows ────────────────────────────────────────────────────────────────

struct RawAdmission {
  id:           i64,
  applicant_id: i64,
  scheme_id:    i64,
  program_id:   i64,
  stdno:        String,
  admitted_by:  i64,
  created_at:   String,
}

impl RawAdmission {
  fn into_record(self) -> Result<AdmissionRecord> {
    Ok(AdmissionRecord {
      id:           self.id,
      applicant_id: self.applicant_id,
      scheme_id:    self.scheme_id,
      program_id:   self.program_id,
      stdno:        decode_stdno(self.stdno)?,
      admitted_by:  self.admitted_by,
      created_at:   decode_dt(&self.created_at)?,
    })
  }

  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      applicant_id: row.get(1)?,
      scheme_id:    row.get(2)?,
      program_id:   row.get(3)?,
      stdno:        row.get(4)?,
      admitted_by:  row.get(5)?,
      created_at:   row.get(6)?,
    })
  }
}

const ADMISSION_COLUMNS: &str =
  "id, applicant_id, scheme_id, program_id, stdno, admitted_by, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// The admissions database, backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteAdmissions {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteAdmissions {
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
        conn.execute_batch(ADMISSIONS_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Seed an applicant's biodata row. Applicants normally arrive through
  /// the application intake, which is outside this crate; this is the
  /// ingest/fixture path.
  pub async fn insert_applicant(&self, bio: ApplicantBio) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO applicants (applicant_id, surname, other_names, email, phone_no)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            bio.applicant_id,
            bio.surname,
            bio.other_names,
            bio.email,
            bio.phone,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── AdmissionStore impl ─────────────────────────────────────────────────────

impl AdmissionStore for SqliteAdmissions {
  type Error = Error;

  async fn find_admission(
    &self,
    candidate: AdmissionCandidate,
  ) -> Result<Option<AdmissionRecord>> {
    let raw: Option<RawAdmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ADMISSION_COLUMNS} FROM admissions
                 WHERE applicant_id = ?1 AND scheme_id = ?2 AND program_id = ?3"
              ),
              rusqlite::params![
                candidate.applicant_id,
                candidate.scheme_id,
                candidate.program_id,
              ],
              RawAdmission::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAdmission::into_record).transpose()
  }

  async fn allocate_student_number(&self, now_year: i32) -> Result<StudentNumber> {
    let epoch = now_year.rem_euclid(100);

    let stdno = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let seeded: Option<i64> = tx
          .query_row(
            "SELECT last_counter FROM stdno_counters WHERE epoch_year = ?1",
            rusqlite::params![epoch],
            |r| r.get(0),
          )
          .optional()?;

        let next = match seeded {
          // Single-statement increment-and-read: concurrent callers can
          // never observe the same counter value.
          Some(_) => {
            let counter: i64 = tx.query_row(
              "UPDATE stdno_counters SET last_counter = last_counter + 1
               WHERE epoch_year = ?1
               RETURNING last_counter",
              rusqlite::params![epoch],
              |r| r.get(0),
            )?;
            StudentNumber::from_parts(now_year, counter as u32).map_err(core_err)?
          }
          // First allocation for this epoch: continue from whatever legacy
          // rows already carry this year prefix, or start at 00001.
          None => {
            let last: Option<String> = tx
              .query_row(
                "SELECT stdno FROM admissions WHERE stdno LIKE ?1
                 ORDER BY id DESC LIMIT 1",
                rusqlite::params![format!("{epoch:02}%")],
                |r| r.get(0),
              )
              .optional()?;

            let last = last
              .map(StudentNumber::parse)
              .transpose()
              .map_err(core_err)?;
            let next = StudentNumber::next(last.as_ref(), now_year).map_err(core_err)?;

            tx.execute(
              "INSERT INTO stdno_counters (epoch_year, last_counter) VALUES (?1, ?2)",
              rusqlite::params![epoch, next.counter() as i64],
            )?;
            next
          }
        };

        tx.commit()?;
        Ok(next)
      })
      .await?;

    Ok(stdno)
  }

  async fn insert_admission(&self, input: NewAdmission) -> Result<AdmissionRecord> {
    let NewAdmission { candidate, stdno, admitted_by } = input;
    let created_at = Utc::now();

    let at_str = encode_dt(created_at);
    let stdno_str = stdno.as_str().to_owned();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO admissions
             (applicant_id, scheme_id, program_id, stdno, admitted_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            candidate.applicant_id,
            candidate.scheme_id,
            candidate.program_id,
            stdno_str,
            admitted_by,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(AdmissionRecord {
      id,
      applicant_id: candidate.applicant_id,
      scheme_id: candidate.scheme_id,
      program_id: candidate.program_id,
      stdno,
      admitted_by,
      created_at,
    })
  }

  async fn applicant_bio(&self, applicant_id: i64) -> Result<Option<ApplicantBio>> {
    let bio: Option<ApplicantBio> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT applicant_id, surname, other_names, email, phone_no
               FROM applicants WHERE applicant_id = ?1",
              rusqlite::params![applicant_id],
              |row| {
                Ok(ApplicantBio {
                  applicant_id: row.get(0)?,
                  surname:      row.get(1)?,
                  other_names:  row.get(2)?,
                  email:        row.get(3)?,
                  phone:        row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    Ok(bio)
  }
}
