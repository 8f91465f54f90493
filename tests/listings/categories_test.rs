//! Category name table tests.

use opendoorz::db;
use opendoorz::listings::categories::{self, CategoryKind};

#[tokio::test]
async fn kinds_write_to_independent_tables() {
    let pool = db::open_in_memory().await.unwrap();
    categories::add_category(&pool, CategoryKind::Type, "Rumah").await.unwrap();
    categories::add_category(&pool, CategoryKind::Location, "Bandung").await.unwrap();

    let types = categories::list_categories(&pool, CategoryKind::Type, None).await.unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].name, "Rumah");

    let locations = categories::list_categories(&pool, CategoryKind::Location, None)
        .await
        .unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].name, "Bandung");
}

#[tokio::test]
async fn list_is_name_ordered_and_searchable() {
    let pool = db::open_in_memory().await.unwrap();
    for name in ["Surabaya", "Bandung", "Jakarta"] {
        categories::add_category(&pool, CategoryKind::Location, name).await.unwrap();
    }

    let all = categories::list_categories(&pool, CategoryKind::Location, None).await.unwrap();
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bandung", "Jakarta", "Surabaya"]);

    let hits = categories::list_categories(&pool, CategoryKind::Location, Some("band"))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Bandung");
}

#[tokio::test]
async fn delete_removes_the_row() {
    let pool = db::open_in_memory().await.unwrap();
    let id = categories::add_category(&pool, CategoryKind::Type, "Apartemen").await.unwrap();

    categories::delete_category(&pool, CategoryKind::Type, id).await.unwrap();
    let remaining = categories::list_categories(&pool, CategoryKind::Type, None).await.unwrap();
    assert!(remaining.is_empty());
}
