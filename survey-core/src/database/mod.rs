pub mod catalog;
pub mod migrations;
pub mod responses;
pub mod results;

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::media::DEFAULT_MAX_MEDIA_BYTES;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub type DbConnection = Arc<Mutex<Connection>>;

/// SQLite-backed survey store. Every catalog, response and result operation
/// is a method on this type and completes before it returns.
#[derive(Clone)]
pub struct Database {
    pub(crate) connection: DbConnection,
    pub(crate) max_media_bytes: usize,
}

impl Database {
    /// Open (or create) the database at `db_path` and bring the schema up to date.
    /// `":memory:"` opens a private in-memory database.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        // Ensure directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut conn = Connection::open(db_path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        migrations::run_survey_migrations(&mut conn)?;

        tracing::debug!("Opened survey database at {}", db_path.display());

        Ok(Database {
            connection: Arc::new(Mutex::new(conn)),
            max_media_bytes: DEFAULT_MAX_MEDIA_BYTES,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::new(":memory:")
    }

    /// Largest image or audio blob accepted by the catalog setters.
    pub fn with_media_limit(mut self, max_media_bytes: usize) -> Self {
        self.max_media_bytes = max_media_bytes;
        self
    }

    pub fn media_limit(&self) -> usize {
        self.max_media_bytes
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.connection.lock()?)
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
