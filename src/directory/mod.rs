//! Admin contact directory.
//!
//! The ordered list of WhatsApp admin numbers the rotator cycles through.
//! Admin-managed; the rotator reads it fresh on every selection call and
//! never caches it, so additions and removals take effect immediately.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::trace;

use crate::rotator::Target;

/// Row type returned by SQLite queries for admin numbers.
type NumberRow = (i64, String, String);

/// One admin WhatsApp account eligible to receive inquiries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminNumber {
    /// Database ID (None for new rows).
    pub id: Option<i64>,
    /// Display name of the admin.
    pub username: String,
    /// Phone number in international digits form.
    pub phone: String,
}

/// Errors from the contact directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No admin number with the given ID.
    #[error("admin number not found: {0}")]
    NumberNotFound(i64),
}

/// Insert or update an admin number.
///
/// If `number.id` is `Some`, updates the existing row. Otherwise inserts a
/// new row and returns the auto-generated ID.
///
/// # Errors
///
/// Returns [`DirectoryError::NumberNotFound`] when updating a missing row,
/// or [`DirectoryError::Database`] on SQLite failure.
pub async fn upsert_number(db: &SqlitePool, number: &AdminNumber) -> Result<i64, DirectoryError> {
    if let Some(id) = number.id {
        let result = sqlx::query("UPDATE admin_numbers SET username=?1, phone=?2 WHERE id=?3")
            .bind(&number.username)
            .bind(&number.phone)
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DirectoryError::NumberNotFound(id));
        }
        return Ok(id);
    }
    let result = sqlx::query(
        "INSERT INTO admin_numbers (username, phone, created_at) VALUES (?1, ?2, ?3)",
    )
    .bind(&number.username)
    .bind(&number.phone)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(db)
    .await?;
    let id = result.last_insert_rowid();
    trace!(number_id = id, username = %number.username, "admin number created");
    Ok(id)
}

/// List admin numbers, optionally filtered by keyword.
///
/// The keyword matches username or phone with a case-insensitive `LIKE`,
/// mirroring the admin search box. Rows come back in insertion order.
///
/// # Errors
///
/// Returns [`DirectoryError::Database`] on SQLite failure.
pub async fn list_numbers(
    db: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<AdminNumber>, DirectoryError> {
    let rows: Vec<NumberRow> = match search {
        Some(keyword) => {
            let pattern = format!("%{keyword}%");
            sqlx::query_as(
                "SELECT id, username, phone FROM admin_numbers \
                 WHERE username LIKE ?1 OR phone LIKE ?1 ORDER BY id",
            )
            .bind(&pattern)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as("SELECT id, username, phone FROM admin_numbers ORDER BY id")
                .fetch_all(db)
                .await?
        }
    };
    Ok(rows
        .into_iter()
        .map(|(id, username, phone)| AdminNumber {
            id: Some(id),
            username,
            phone,
        })
        .collect())
}

/// Delete an admin number by ID.
///
/// # Errors
///
/// Returns [`DirectoryError::NumberNotFound`] if no row matches,
/// or [`DirectoryError::Database`] on SQLite failure.
pub async fn delete_number(db: &SqlitePool, id: i64) -> Result<(), DirectoryError> {
    let result = sqlx::query("DELETE FROM admin_numbers WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DirectoryError::NumberNotFound(id));
    }
    trace!(number_id = id, "admin number deleted");
    Ok(())
}

/// The current rotation list: every admin number as a [`Target`], in
/// insertion order. Fetched fresh per selection call.
///
/// # Errors
///
/// Returns [`DirectoryError::Database`] on SQLite failure.
pub async fn contact_targets(db: &SqlitePool) -> Result<Vec<Target>, DirectoryError> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, phone FROM admin_numbers ORDER BY id")
            .fetch_all(db)
            .await?;
    Ok(rows
        .into_iter()
        .map(|(id, phone)| Target {
            id: Some(id),
            handle: phone,
        })
        .collect())
}
