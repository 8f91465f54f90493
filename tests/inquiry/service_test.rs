//! End-to-end inquiry pipeline tests over an in-memory database.

use sqlx::SqlitePool;

use opendoorz::db;
use opendoorz::directory::{self, AdminNumber};
use opendoorz::inquiry::{InquiryError, InquiryService};
use opendoorz::listings::categories::{self, CategoryKind};
use opendoorz::listings::{self, Property};
use opendoorz::rotator::store::MemoryCursorStore;
use opendoorz::rotator::{RotatorError, RoundRobinSelector};

const SITE: &str = "https://opendoorz.id";
const SEND: &str = "https://api.whatsapp.com/send";

async fn seed_property(pool: &SqlitePool) -> i64 {
    let location_id = categories::add_category(pool, CategoryKind::Location, "Bandung")
        .await
        .unwrap();
    listings::upsert_property(
        pool,
        &Property {
            id: None,
            title: "Rumah Asri".to_string(),
            description: "Rumah dua lantai dekat pusat kota".to_string(),
            price: 1_500_000_000,
            bedrooms: 3,
            bathrooms: 2,
            area: 120,
            floor: 2,
            address: "Jl. Melati No. 5".to_string(),
            parking: 1,
            status: "available".to_string(),
            category_type_id: None,
            category_location_id: Some(location_id),
        },
    )
    .await
    .unwrap()
}

async fn seed_numbers(pool: &SqlitePool, phones: &[&str]) {
    for (i, phone) in phones.iter().enumerate() {
        directory::upsert_number(
            pool,
            &AdminNumber {
                id: None,
                username: format!("admin{i}"),
                phone: (*phone).to_string(),
            },
        )
        .await
        .unwrap();
    }
}

fn service(pool: SqlitePool) -> InquiryService<MemoryCursorStore> {
    InquiryService::new(
        pool,
        RoundRobinSelector::new(MemoryCursorStore::new()),
        SITE,
        SEND,
    )
}

#[tokio::test]
async fn links_rotate_through_admin_numbers_in_order() {
    let pool = db::open_in_memory().await.unwrap();
    let property_id = seed_property(&pool).await;
    seed_numbers(&pool, &["628111", "628222", "628333"]).await;
    let service = service(pool);

    let mut phones = Vec::new();
    for _ in 0..7 {
        let generated = service.generate_link(property_id).await.unwrap();
        phones.push(generated.target.handle);
    }
    assert_eq!(
        phones,
        vec!["628111", "628222", "628333", "628111", "628222", "628333", "628111"]
    );
}

#[tokio::test]
async fn generated_link_carries_the_composed_message() {
    let pool = db::open_in_memory().await.unwrap();
    let property_id = seed_property(&pool).await;
    seed_numbers(&pool, &["6281357477967"]).await;
    let service = service(pool);

    let generated = service.generate_link(property_id).await.unwrap();
    let url = generated.url;
    assert!(url.as_str().starts_with(SEND));

    let text = url
        .query_pairs()
        .find(|(k, _)| k == "text")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(text.starts_with(&format!("{SITE}/details-property/{property_id}")));
    assert!(text.contains("Rumah Asri"));
    assert!(text.contains("Rp. 1.500.000.000"));
}

#[tokio::test]
async fn unknown_property_fails_without_consuming_a_rotation_slot() {
    let pool = db::open_in_memory().await.unwrap();
    seed_numbers(&pool, &["628111", "628222"]).await;
    let property_id = seed_property(&pool).await;
    let service = service(pool);

    let result = service.generate_link(9999).await;
    assert!(matches!(
        result,
        Err(InquiryError::Listings(
            listings::ListingsError::PropertyNotFound(9999)
        ))
    ));

    // The failed call must not have advanced the cursor.
    let generated = service.generate_link(property_id).await.unwrap();
    assert_eq!(generated.target.handle, "628111");
}

#[tokio::test]
async fn empty_directory_surfaces_no_targets_available() {
    let pool = db::open_in_memory().await.unwrap();
    let property_id = seed_property(&pool).await;
    let service = service(pool);

    let result = service.generate_link(property_id).await;
    assert!(matches!(
        result,
        Err(InquiryError::Rotator(RotatorError::NoTargetsAvailable))
    ));
}

#[tokio::test]
async fn chat_preview_does_not_advance_the_rotation() {
    let pool = db::open_in_memory().await.unwrap();
    let property_id = seed_property(&pool).await;
    seed_numbers(&pool, &["628111", "628222"]).await;
    let service = service(pool);

    let text = service.chat_preview(property_id).await.unwrap();
    assert!(text.contains("Rumah Asri"));

    let generated = service.generate_link(property_id).await.unwrap();
    assert_eq!(generated.target.handle, "628111");
}

#[tokio::test]
async fn numbers_added_between_calls_join_the_rotation() {
    let pool = db::open_in_memory().await.unwrap();
    let property_id = seed_property(&pool).await;
    seed_numbers(&pool, &["628111", "628222"]).await;
    let service = service(pool.clone());

    assert_eq!(
        service.generate_link(property_id).await.unwrap().target.handle,
        "628111"
    );
    // The list is read fresh per call, so a new number shows up mid-cycle.
    seed_numbers(&pool, &["628333"]).await;
    assert_eq!(
        service.generate_link(property_id).await.unwrap().target.handle,
        "628222"
    );
    assert_eq!(
        service.generate_link(property_id).await.unwrap().target.handle,
        "628333"
    );
}

#[tokio::test]
async fn reset_cursor_restarts_from_the_first_admin() {
    let pool = db::open_in_memory().await.unwrap();
    let property_id = seed_property(&pool).await;
    seed_numbers(&pool, &["628111", "628222", "628333"]).await;
    let service = service(pool);

    service.generate_link(property_id).await.unwrap();
    service.generate_link(property_id).await.unwrap();
    service.reset_cursor().await.unwrap();

    let generated = service.generate_link(property_id).await.unwrap();
    assert_eq!(generated.target.handle, "628111");
}
