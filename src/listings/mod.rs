//! Property listing storage.
//!
//! Listings and their category name tables (type and location). The inquiry
//! composer reads one listing joined with its location name; the admin CLI
//! uses keyword search over the same columns the old dashboard filtered on.

pub mod categories;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::trace;

/// A property listing as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Database ID (None for new rows).
    pub id: Option<i64>,
    /// Listing title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Price in whole rupiah.
    pub price: i64,
    /// Bedroom count.
    pub bedrooms: i64,
    /// Bathroom count.
    pub bathrooms: i64,
    /// Building area in square metres.
    pub area: i64,
    /// Number of floors.
    pub floor: i64,
    /// Street address.
    pub address: String,
    /// Parking capacity.
    pub parking: i64,
    /// Sale status (e.g. `available`, `sold`).
    pub status: String,
    /// Category type row, if assigned.
    pub category_type_id: Option<i64>,
    /// Category location row, if assigned.
    pub category_location_id: Option<i64>,
}

/// A listing joined with its category location name, as the inquiry
/// composer consumes it.
#[derive(Debug, Clone)]
pub struct PropertyDetails {
    /// Database ID.
    pub id: i64,
    /// Listing title.
    pub title: String,
    /// Street address.
    pub address: String,
    /// Price in whole rupiah.
    pub price: i64,
    /// Category location name, when the listing has one.
    pub location: Option<String>,
}

/// Errors from the listing store.
#[derive(Debug, thiserror::Error)]
pub enum ListingsError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No property with the given ID.
    #[error("property not found: {0}")]
    PropertyNotFound(i64),
}

/// Row type for full property queries.
type PropertyRow = (
    i64,
    String,
    String,
    i64,
    i64,
    i64,
    i64,
    i64,
    String,
    i64,
    String,
    Option<i64>,
    Option<i64>,
);

fn row_to_property(row: PropertyRow) -> Property {
    let (
        id,
        title,
        description,
        price,
        bedrooms,
        bathrooms,
        area,
        floor,
        address,
        parking,
        status,
        category_type_id,
        category_location_id,
    ) = row;
    Property {
        id: Some(id),
        title,
        description,
        price,
        bedrooms,
        bathrooms,
        area,
        floor,
        address,
        parking,
        status,
        category_type_id,
        category_location_id,
    }
}

const PROPERTY_COLUMNS: &str = "id, title, description, price, bedrooms, bathrooms, \
     area, floor, address, parking, status, category_type_id, category_location_id";

/// Insert or update a property.
///
/// If `property.id` is `Some`, updates the existing row. Otherwise inserts a
/// new row and returns the auto-generated ID.
///
/// # Errors
///
/// Returns [`ListingsError::PropertyNotFound`] when updating a missing row,
/// or [`ListingsError::Database`] on SQLite failure.
pub async fn upsert_property(db: &SqlitePool, property: &Property) -> Result<i64, ListingsError> {
    if let Some(id) = property.id {
        let result = sqlx::query(
            "UPDATE properties SET title=?1, description=?2, price=?3, bedrooms=?4, \
             bathrooms=?5, area=?6, floor=?7, address=?8, parking=?9, status=?10, \
             category_type_id=?11, category_location_id=?12 WHERE id=?13",
        )
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.price)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.area)
        .bind(property.floor)
        .bind(&property.address)
        .bind(property.parking)
        .bind(&property.status)
        .bind(property.category_type_id)
        .bind(property.category_location_id)
        .bind(id)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ListingsError::PropertyNotFound(id));
        }
        return Ok(id);
    }
    let result = sqlx::query(
        "INSERT INTO properties (title, description, price, bedrooms, bathrooms, area, \
         floor, address, parking, status, category_type_id, category_location_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )
    .bind(&property.title)
    .bind(&property.description)
    .bind(property.price)
    .bind(property.bedrooms)
    .bind(property.bathrooms)
    .bind(property.area)
    .bind(property.floor)
    .bind(&property.address)
    .bind(property.parking)
    .bind(&property.status)
    .bind(property.category_type_id)
    .bind(property.category_location_id)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(db)
    .await?;
    let id = result.last_insert_rowid();
    trace!(property_id = id, title = %property.title, "property created");
    Ok(id)
}

/// List properties, optionally filtered by keyword.
///
/// The keyword matches title, description, address, or status with a
/// case-insensitive `LIKE`. Rows come back newest first.
///
/// # Errors
///
/// Returns [`ListingsError::Database`] on SQLite failure.
pub async fn list_properties(
    db: &SqlitePool,
    search: Option<&str>,
) -> Result<Vec<Property>, ListingsError> {
    let rows: Vec<PropertyRow> = match search {
        Some(keyword) => {
            let pattern = format!("%{keyword}%");
            sqlx::query_as(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM properties \
                 WHERE title LIKE ?1 OR description LIKE ?1 OR address LIKE ?1 \
                 OR status LIKE ?1 ORDER BY id DESC"
            ))
            .bind(&pattern)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY id DESC"
            ))
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows.into_iter().map(row_to_property).collect())
}

/// Delete a property by ID.
///
/// # Errors
///
/// Returns [`ListingsError::PropertyNotFound`] if no row matches,
/// or [`ListingsError::Database`] on SQLite failure.
pub async fn delete_property(db: &SqlitePool, id: i64) -> Result<(), ListingsError> {
    let result = sqlx::query("DELETE FROM properties WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ListingsError::PropertyNotFound(id));
    }
    trace!(property_id = id, "property deleted");
    Ok(())
}

/// Load the fields the inquiry composer needs, with the location name
/// resolved.
///
/// # Errors
///
/// Returns [`ListingsError::PropertyNotFound`] if no listing matches,
/// or [`ListingsError::Database`] on SQLite failure.
pub async fn load_property_details(
    db: &SqlitePool,
    id: i64,
) -> Result<PropertyDetails, ListingsError> {
    let row: Option<(i64, String, String, i64, Option<String>)> = sqlx::query_as(
        "SELECT p.id, p.title, p.address, p.price, l.name \
         FROM properties p \
         LEFT JOIN category_locations l ON l.id = p.category_location_id \
         WHERE p.id = ?1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    let (id, title, address, price, location) =
        row.ok_or(ListingsError::PropertyNotFound(id))?;
    Ok(PropertyDetails {
        id,
        title,
        address,
        price,
        location,
    })
}
