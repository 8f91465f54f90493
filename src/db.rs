//! SQLite pool setup and schema.
//!
//! One database file holds listings, category names, admin numbers, and the
//! rotation-state row used by the database cursor backend. The schema is
//! applied idempotently on every open. WAL mode keeps the low-frequency
//! admin writes from blocking the read-heavy inquiry path.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Idempotent schema, applied on every open.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS category_types (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS category_locations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS properties (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    title                TEXT NOT NULL,
    description          TEXT NOT NULL,
    price                INTEGER NOT NULL,
    bedrooms             INTEGER NOT NULL,
    bathrooms            INTEGER NOT NULL,
    area                 INTEGER NOT NULL,
    floor                INTEGER NOT NULL,
    address              TEXT NOT NULL,
    parking              INTEGER NOT NULL DEFAULT 0,
    status               TEXT NOT NULL,
    category_type_id     INTEGER REFERENCES category_types(id),
    category_location_id INTEGER REFERENCES category_locations(id),
    created_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_properties_status ON properties(status);

CREATE TABLE IF NOT EXISTS admin_numbers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL,
    phone       TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rotation_state (
    key         TEXT PRIMARY KEY,
    cursor      INTEGER NOT NULL
);
"#;

/// Open (or create) the database at `path` and apply the schema.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the file cannot be opened or the schema fails.
pub async fn open(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
    info!(path = %path.display(), "database opened");
    Ok(pool)
}

/// Open an in-memory database with the schema applied (tests, dry runs).
///
/// A single connection keeps the in-memory database alive and shared.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the schema fails to apply.
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    sqlx::raw_sql(SCHEMA).execute(&pool).await?;
    Ok(pool)
}
