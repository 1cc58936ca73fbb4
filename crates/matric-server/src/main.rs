//! matric server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! three SQLite stores, and serves the admissions API over HTTP.
//!
//! # Password hash generation
//!
//! To pre-generate an argon2 PHC string (e.g. for seeding a staff user):
//!
//! ```
//! cargo run -p matric-server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use matric_api::ApiState;
use matric_core::store::PasswordHasher as _;
use matric_pipeline::AdmissionPipeline;
use matric_server::{Argon2Hasher, ServerConfig};
use matric_store_sqlite::{SqliteAdmissions, SqliteDirectory, SqliteInstitute};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "matric admissions server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password_from_stdin()?;
    let hash = Argon2Hasher
      .hash(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MATRIC"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the three stores; each is an independent database file.
  let admissions = SqliteAdmissions::open(expand_tilde(&server_cfg.admissions_db))
    .await
    .with_context(|| format!("failed to open admissions store at {:?}", server_cfg.admissions_db))?;
  let institute = SqliteInstitute::open(expand_tilde(&server_cfg.institute_db))
    .await
    .with_context(|| format!("failed to open institute store at {:?}", server_cfg.institute_db))?;
  let directory = SqliteDirectory::open(expand_tilde(&server_cfg.directory_db))
    .await
    .with_context(|| format!("failed to open directory store at {:?}", server_cfg.directory_db))?;

  // Build application state.
  let admissions = Arc::new(admissions);
  let institute = Arc::new(institute);
  let hasher = Arc::new(Argon2Hasher);

  let pipeline = Arc::new(AdmissionPipeline::new(
    Arc::clone(&admissions),
    Arc::clone(&institute),
    Arc::clone(&hasher),
    server_cfg.pipeline_config(),
  ));

  let state = ApiState {
    pipeline,
    admissions,
    directory: Arc::new(directory),
    hasher,
  };

  let app = matric_api::api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
