//! Error types for `matric-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed student number: {0:?}")]
  MalformedStudentNumber(String),

  #[error("student number counter exhausted for epoch year {0:02}")]
  CounterExhausted(u8),

  #[error("password hashing failed: {0}")]
  Hash(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
