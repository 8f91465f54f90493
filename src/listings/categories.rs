//! Category name tables (property type and location).
//!
//! Two flat id/name tables. The location name is the only one the inquiry
//! composer reads; both are admin-editable through the CLI.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::ListingsError;

/// Which category table an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Property type (house, apartment, …).
    Type,
    /// Property location (city or district name).
    Location,
}

impl CategoryKind {
    fn table(self) -> &'static str {
        match self {
            Self::Type => "category_types",
            Self::Location => "category_locations",
        }
    }
}

/// One category row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Database ID.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Insert a category and return its ID.
///
/// # Errors
///
/// Returns [`ListingsError::Database`] on SQLite failure.
pub async fn add_category(
    db: &SqlitePool,
    kind: CategoryKind,
    name: &str,
) -> Result<i64, ListingsError> {
    let result = sqlx::query(&format!("INSERT INTO {} (name) VALUES (?1)", kind.table()))
        .bind(name)
        .execute(db)
        .await?;
    Ok(result.last_insert_rowid())
}

/// List categories of one kind, optionally filtered by name keyword.
///
/// # Errors
///
/// Returns [`ListingsError::Database`] on SQLite failure.
pub async fn list_categories(
    db: &SqlitePool,
    kind: CategoryKind,
    search: Option<&str>,
) -> Result<Vec<Category>, ListingsError> {
    let rows: Vec<(i64, String)> = match search {
        Some(keyword) => {
            let pattern = format!("%{keyword}%");
            sqlx::query_as(&format!(
                "SELECT id, name FROM {} WHERE name LIKE ?1 ORDER BY name",
                kind.table()
            ))
            .bind(&pattern)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(&format!("SELECT id, name FROM {} ORDER BY name", kind.table()))
                .fetch_all(db)
                .await?
        }
    };
    Ok(rows.into_iter().map(|(id, name)| Category { id, name }).collect())
}

/// Delete a category by ID.
///
/// # Errors
///
/// Returns [`ListingsError::Database`] on SQLite failure. Deleting an
/// unknown ID is a no-op.
pub async fn delete_category(
    db: &SqlitePool,
    kind: CategoryKind,
    id: i64,
) -> Result<(), ListingsError> {
    sqlx::query(&format!("DELETE FROM {} WHERE id = ?1", kind.table()))
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
