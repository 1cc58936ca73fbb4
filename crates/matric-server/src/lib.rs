//! Configuration and credential hashing for the matric server binary.

pub mod hasher;

use std::{path::PathBuf, time::Duration};

use matric_pipeline::{ErrorPolicy, PipelineConfig};
use serde::Deserialize;

pub use hasher::Argon2Hasher;

/// Runtime server configuration, deserialised from `config.toml` and
/// `MATRIC_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,

  /// Store A — applicant biodata and admission records.
  pub admissions_db: PathBuf,
  /// Store B — the postgraduate-institute system.
  pub institute_db:  PathBuf,
  /// Store C — staff/HR management users.
  pub directory_db:  PathBuf,

  #[serde(default = "default_provision_timeout_secs")]
  pub provision_timeout_secs: u64,
  #[serde(default)]
  pub error_policy: ErrorPolicy,
}

fn default_provision_timeout_secs() -> u64 {
  30
}

impl ServerConfig {
  pub fn pipeline_config(&self) -> PipelineConfig {
    PipelineConfig {
      error_policy:      self.error_policy,
      provision_timeout: Duration::from_secs(self.provision_timeout_secs),
    }
  }
}
