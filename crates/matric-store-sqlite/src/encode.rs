//! Encoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; student numbers are
//! stored as their canonical ten-digit text.

use chrono::{DateTime, Utc};
use matric_core::student::StudentNumber;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_stdno(s: String) -> Result<StudentNumber> {
  StudentNumber::parse(s).map_err(Error::Core)
}

/// Lift a core error out of a `conn.call` closure.
pub fn core_err(e: matric_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}
