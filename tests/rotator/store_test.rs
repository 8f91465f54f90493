//! Cursor store backend tests: durability, corruption recovery, CAS.

use opendoorz::db;
use opendoorz::rotator::store::{CursorStore, FileCursorStore, SqliteCursorStore};

// ── File backend ────────────────────────────────────────────────

#[tokio::test]
async fn file_store_starts_absent_and_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin_index.txt");

    let store = FileCursorStore::new(&path);
    assert_eq!(store.load().await.unwrap(), None);
    assert!(store.compare_and_swap(None, 2).await.unwrap());

    // A fresh instance over the same file sees the durable value.
    let reopened = FileCursorStore::new(&path);
    assert_eq!(reopened.load().await.unwrap(), Some(2));
}

#[tokio::test]
async fn file_store_value_is_human_inspectable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin_index.txt");

    let store = FileCursorStore::new(&path);
    assert!(store.compare_and_swap(None, 7).await.unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "7");
}

#[tokio::test]
async fn file_store_treats_garbage_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin_index.txt");
    std::fs::write(&path, "not a number").unwrap();

    let store = FileCursorStore::new(&path);
    assert_eq!(store.load().await.unwrap(), None);
    // Recovery: the swap against the absent view replaces the garbage.
    assert!(store.compare_and_swap(None, 1).await.unwrap());
    assert_eq!(store.load().await.unwrap(), Some(1));
}

#[tokio::test]
async fn file_store_swap_loses_against_changed_value() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin_index.txt");

    let store = FileCursorStore::new(&path);
    assert!(store.compare_and_swap(None, 1).await.unwrap());
    // Stale expectation: the cursor is 1 now, not None and not 0.
    assert!(!store.compare_and_swap(None, 2).await.unwrap());
    assert!(!store.compare_and_swap(Some(0), 2).await.unwrap());
    assert_eq!(store.load().await.unwrap(), Some(1));
}

#[tokio::test]
async fn file_store_reset_removes_the_file_and_tolerates_absence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("admin_index.txt");

    let store = FileCursorStore::new(&path);
    assert!(store.compare_and_swap(None, 3).await.unwrap());
    store.reset().await.unwrap();
    assert!(!path.exists());

    // Resetting an already-absent cursor is not an error.
    store.reset().await.unwrap();
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn file_store_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage/rotation/admin_index.txt");

    let store = FileCursorStore::new(&path);
    assert!(store.compare_and_swap(None, 0).await.unwrap());
    assert_eq!(store.load().await.unwrap(), Some(0));
}

// ── SQLite backend ──────────────────────────────────────────────

#[tokio::test]
async fn sqlite_store_round_trips_and_swaps_conditionally() {
    let pool = db::open_in_memory().await.unwrap();
    let store = SqliteCursorStore::new(pool);

    assert_eq!(store.load().await.unwrap(), None);
    assert!(store.compare_and_swap(None, 1).await.unwrap());
    assert_eq!(store.load().await.unwrap(), Some(1));

    // The row exists now, so an absent expectation loses.
    assert!(!store.compare_and_swap(None, 5).await.unwrap());
    // So does a stale value.
    assert!(!store.compare_and_swap(Some(0), 5).await.unwrap());
    assert!(store.compare_and_swap(Some(1), 2).await.unwrap());
    assert_eq!(store.load().await.unwrap(), Some(2));
}

#[tokio::test]
async fn sqlite_store_reset_deletes_the_row() {
    let pool = db::open_in_memory().await.unwrap();
    let store = SqliteCursorStore::new(pool);

    assert!(store.compare_and_swap(None, 4).await.unwrap());
    store.reset().await.unwrap();
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_store_recovers_a_corrupt_negative_cursor() {
    let pool = db::open_in_memory().await.unwrap();
    sqlx::query("INSERT INTO rotation_state (key, cursor) VALUES ('admin_rotation', -3)")
        .execute(&pool)
        .await
        .unwrap();
    let store = SqliteCursorStore::new(pool);

    // Corrupt reads as absent, and the recovery swap overwrites it.
    assert_eq!(store.load().await.unwrap(), None);
    assert!(store.compare_and_swap(None, 1).await.unwrap());
    assert_eq!(store.load().await.unwrap(), Some(1));
}

#[tokio::test]
async fn sqlite_stores_with_different_keys_are_independent() {
    let pool = db::open_in_memory().await.unwrap();
    let a = SqliteCursorStore::with_key(pool.clone(), "pool_a");
    let b = SqliteCursorStore::with_key(pool, "pool_b");

    assert!(a.compare_and_swap(None, 1).await.unwrap());
    assert_eq!(b.load().await.unwrap(), None);
}
