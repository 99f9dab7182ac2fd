//! Integration tests for the collection ledger

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use fstop::collect;

#[actix_rt::test]
#[serial]
async fn test_collect_and_uncollect() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let fan = create_test_user(&db, "fan", "password123")
        .await
        .expect("Failed to create fan");
    let photo = create_test_photo(&db, author.id, "sunset")
        .await
        .expect("Failed to create photo");

    collect::collect(&db, fan.id, photo.id)
        .await
        .expect("Collect failed");

    assert!(collect::is_collecting(&db, fan.id, photo.id)
        .await
        .expect("Query failed"));
    assert_eq!(
        collect::collector_count(&db, photo.id)
            .await
            .expect("Query failed"),
        1
    );
    assert_eq!(
        collect::collection_count(&db, fan.id)
            .await
            .expect("Query failed"),
        1
    );

    collect::uncollect(&db, fan.id, photo.id)
        .await
        .expect("Uncollect failed");

    assert!(!collect::is_collecting(&db, fan.id, photo.id)
        .await
        .expect("Query failed"));
    assert_eq!(
        collect::collector_count(&db, photo.id)
            .await
            .expect("Query failed"),
        0
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_collect_is_idempotent() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let fan = create_test_user(&db, "fan", "password123")
        .await
        .expect("Failed to create fan");
    let photo = create_test_photo(&db, author.id, "sunset")
        .await
        .expect("Failed to create photo");

    let first = collect::collect(&db, fan.id, photo.id)
        .await
        .expect("Collect failed");
    assert!(first, "First collect should report a new edge");
    let second = collect::collect(&db, fan.id, photo.id)
        .await
        .expect("Repeat collect failed");
    assert!(!second, "Repeat collect should report an existing edge");

    assert_eq!(
        collect::collector_count(&db, photo.id)
            .await
            .expect("Query failed"),
        1
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_collected_photos_listing() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let fan = create_test_user(&db, "fan", "password123")
        .await
        .expect("Failed to create fan");

    let first = create_test_photo(&db, author.id, "first")
        .await
        .expect("Failed to create photo");
    let second = create_test_photo(&db, author.id, "second")
        .await
        .expect("Failed to create photo");
    let skipped = create_test_photo(&db, author.id, "skipped")
        .await
        .expect("Failed to create photo");

    collect::collect(&db, fan.id, first.id)
        .await
        .expect("Collect failed");
    collect::collect(&db, fan.id, second.id)
        .await
        .expect("Collect failed");

    let page = collect::collected_photos_page(&db, fan.id, 0, 20)
        .await
        .expect("Query failed");
    let ids: Vec<i32> = page.iter().map(|p| p.id).collect();

    assert_eq!(page.len(), 2);
    assert!(ids.contains(&first.id));
    assert!(ids.contains(&second.id));
    assert!(!ids.contains(&skipped.id));

    let collectors = collect::collectors_page(&db, first.id, 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(collectors.len(), 1);
    assert_eq!(collectors[0].username, "fan");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_deleting_photo_removes_collection_entries() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let fan = create_test_user(&db, "fan", "password123")
        .await
        .expect("Failed to create fan");
    let photo = create_test_photo(&db, author.id, "ephemeral")
        .await
        .expect("Failed to create photo");

    collect::collect(&db, fan.id, photo.id)
        .await
        .expect("Collect failed");

    fstop::photo::delete_photo(&db, photo.id)
        .await
        .expect("Delete failed");

    assert_eq!(
        collect::collection_count(&db, fan.id)
            .await
            .expect("Query failed"),
        0
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
