//! Argon2 implementation of the core [`PasswordHasher`] seam.
//!
//! [`PasswordHasher`]: matric_core::store::PasswordHasher

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use matric_core::Error;
use rand_core::OsRng;

/// Hashes and verifies credentials as argon2id PHC strings.
#[derive(Clone, Copy, Default)]
pub struct Argon2Hasher;

impl matric_core::store::PasswordHasher for Argon2Hasher {
  fn hash(&self, plaintext: &str) -> matric_core::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(plaintext.as_bytes(), &salt)
      .map(|h| h.to_string())
      .map_err(|e| Error::Hash(e.to_string()))
  }

  fn verify(&self, plaintext: &str, digest: &str) -> matric_core::Result<bool> {
    let parsed = PasswordHash::new(digest).map_err(|e| Error::Hash(e.to_string()))?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
      Ok(()) => Ok(true),
      Err(argon2::password_hash::Error::Password) => Ok(false),
      Err(e) => Err(Error::Hash(e.to_string())),
    }
  }
}
