//! Student numbers and the pure sequence allocator.
//!
//! A student number is the externally visible identity of an admitted
//! student: a ten-digit string `YY` + `001` + five-digit counter, e.g.
//! `2400100001`. The `YY` component is the two-digit year in effect when the
//! number was allocated; the counter is strictly increasing within a `YY`
//! epoch and resets to `00001` when the epoch changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The fixed institution code embedded between the year and the counter.
pub const INSTITUTION_CODE: &str = "001";

/// Highest counter value representable in the five-digit component.
pub const MAX_COUNTER: u32 = 99_999;

// ─── StudentNumber ───────────────────────────────────────────────────────────

/// A validated student number.
///
/// Construction goes through [`StudentNumber::parse`] or
/// [`StudentNumber::from_parts`]; the inner string is guaranteed to be ten
/// ASCII digits with the institution code in the middle. Immutable once
/// allocated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentNumber(String);

impl StudentNumber {
  /// Validate an externally supplied string as a student number.
  pub fn parse(s: impl Into<String>) -> Result<Self> {
    let s = s.into();

    let well_formed = s.len() == 10
      && s.bytes().all(|b| b.is_ascii_digit())
      && &s[2..5] == INSTITUTION_CODE
      && &s[5..] != "00000";

    if !well_formed {
      return Err(Error::MalformedStudentNumber(s));
    }

    Ok(Self(s))
  }

  /// Build a student number from an epoch year and a counter value.
  ///
  /// `now_year` is a full calendar year (e.g. 2024); only its last two
  /// digits are embedded. Counters outside `1..=99999` are rejected.
  pub fn from_parts(now_year: i32, counter: u32) -> Result<Self> {
    let epoch = (now_year.rem_euclid(100)) as u8;

    if counter == 0 || counter > MAX_COUNTER {
      return Err(Error::CounterExhausted(epoch));
    }

    Ok(Self(format!("{epoch:02}{INSTITUTION_CODE}{counter:05}")))
  }

  /// The next number in sequence after `last`, for the given year.
  ///
  /// Epoch reset: when `last` is absent, or its embedded year differs from
  /// `now_year mod 100`, the counter restarts at `00001`. The current year
  /// is always an explicit parameter — this function holds no state.
  pub fn next(last: Option<&StudentNumber>, now_year: i32) -> Result<Self> {
    let epoch = (now_year.rem_euclid(100)) as u8;

    match last {
      Some(n) if n.year_component() == epoch => {
        Self::from_parts(now_year, n.counter() + 1)
      }
      _ => Self::from_parts(now_year, 1),
    }
  }

  /// The embedded two-digit year.
  pub fn year_component(&self) -> u8 {
    self.0[..2].parse().expect("validated on construction")
  }

  /// The trailing five-digit counter.
  pub fn counter(&self) -> u32 {
    self.0[5..].parse().expect("validated on construction")
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for StudentNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for StudentNumber {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> {
    Self::parse(s)
  }
}

impl From<StudentNumber> for String {
  fn from(n: StudentNumber) -> String {
    n.0
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_number_of_an_epoch() {
    let n = StudentNumber::next(None, 2024).unwrap();
    assert_eq!(n.as_str(), "2400100001");
    assert_eq!(n.year_component(), 24);
    assert_eq!(n.counter(), 1);
  }

  #[test]
  fn increments_within_the_same_epoch() {
    let last = StudentNumber::parse("2400100041").unwrap();
    let n = StudentNumber::next(Some(&last), 2024).unwrap();
    assert_eq!(n.as_str(), "2400100042");
  }

  #[test]
  fn zero_pads_the_counter() {
    let last = StudentNumber::parse("2400100009").unwrap();
    let n = StudentNumber::next(Some(&last), 2024).unwrap();
    assert_eq!(n.as_str(), "2400100010");
  }

  #[test]
  fn year_rollover_resets_the_counter() {
    let last = StudentNumber::parse("2400154321").unwrap();
    let n = StudentNumber::next(Some(&last), 2025).unwrap();
    assert_eq!(n.as_str(), "2500100001");
  }

  #[test]
  fn counter_exhaustion_is_an_error() {
    let last = StudentNumber::parse("2400199999").unwrap();
    let err = StudentNumber::next(Some(&last), 2024).unwrap_err();
    assert!(matches!(err, Error::CounterExhausted(24)));
  }

  #[test]
  fn rejects_malformed_strings() {
    for s in ["", "24001", "2400x00001", "2490100001", "240010000100", "2400100000"] {
      assert!(
        StudentNumber::parse(s).is_err(),
        "expected {s:?} to be rejected"
      );
    }
  }

  #[test]
  fn serde_round_trip() {
    let n = StudentNumber::parse("2400100001").unwrap();
    let json = serde_json::to_string(&n).unwrap();
    assert_eq!(json, "\"2400100001\"");
    let back: StudentNumber = serde_json::from_str(&json).unwrap();
    assert_eq!(back, n);
  }
}
