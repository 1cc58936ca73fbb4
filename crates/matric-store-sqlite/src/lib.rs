//! SQLite backends for the three matric stores.
//!
//! Each store wraps its own [`tokio_rusqlite`] connection so all database
//! access runs on a dedicated thread without blocking the async runtime.
//! The admissions, institute, and directory databases are independent files
//! with independent transaction scopes — nothing here spans two of them.

mod admissions;
mod directory;
mod encode;
mod institute;
mod schema;

pub mod error;

pub use admissions::SqliteAdmissions;
pub use directory::SqliteDirectory;
pub use error::{Error, Result};
pub use institute::SqliteInstitute;

#[cfg(test)]
mod tests;
