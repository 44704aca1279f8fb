#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `SQLite` storage for litter-map entries.
//!
//! Uses `switchy_database` with the rusqlite backend for all database
//! operations. The schema is applied at open time with `CREATE TABLE IF
//! NOT EXISTS`; a single-table store does not need a migration runner.
//!
//! Coordinate and type constraints are enforced here with `CHECK`
//! constraints in addition to the validation boundary in
//! `litter_map_trash_models`, so a malformed row can never be persisted
//! even if a caller bypasses validation.

pub mod queries;

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Failed to open the database file.
    #[error("Failed to open database: {0}")]
    Open(String),

    /// Filesystem error creating the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Opens (or creates) the entries `SQLite` database and ensures the
/// schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the data directory cannot be created, the
/// database cannot be opened, or schema creation fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Open(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;
    log::info!("Database ready at {}", path.display());

    Ok(db)
}

/// Creates the `trash_entries` table and its indexes if they don't
/// already exist.
///
/// The `CHECK` constraints mirror the validation boundary: coordinates
/// must be in range and the type must belong to the taxonomy.
///
/// # Errors
///
/// Returns [`DbError`] if any schema statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS trash_entries (
            id          TEXT PRIMARY KEY,
            timestamp   TEXT NOT NULL,
            trash_type  TEXT NOT NULL,
            latitude    REAL NOT NULL,
            longitude   REAL NOT NULL,
            photo_url   TEXT,
            user_name   TEXT,
            CHECK (latitude >= -90 AND latitude <= 90),
            CHECK (longitude >= -180 AND longitude <= 180),
            CHECK (trash_type IN (
                'plastic', 'glass', 'paper', 'bulky_item', 'hazardous', 'other'
            ))
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_timestamp ON trash_entries(timestamp)")
        .await?;
    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_trash_type ON trash_entries(trash_type)")
        .await?;
    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_location ON trash_entries(latitude, longitude)")
        .await?;

    Ok(())
}
