//! Integration tests for substring search

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use fstop::search;

#[actix_rt::test]
#[serial]
async fn test_search_users_matches_username_and_display_name() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    create_test_user(&db, "ansel", "password123")
        .await
        .expect("Failed to create user");
    create_test_user(&db, "dorothea", "password123")
        .await
        .expect("Failed to create user");

    let by_username = search::search_users(&db, "anse", 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(by_username.len(), 1);
    assert_eq!(by_username[0].username, "ansel");

    // Fixture display names mirror the username, so this hits the name column too.
    let by_name = search::search_users(&db, "doro", 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(by_name.len(), 1);

    let none = search::search_users(&db, "nobody", 0, 20)
        .await
        .expect("Query failed");
    assert!(none.is_empty());

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_search_photos_matches_description() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "shooter", "password123")
        .await
        .expect("Failed to create user");
    let hit = create_test_photo(&db, user.id, "golden hour at the pier")
        .await
        .expect("Failed to create photo");
    create_test_photo(&db, user.id, "city at night")
        .await
        .expect("Failed to create photo");

    let results = search::search_photos(&db, "golden", 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, hit.id);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_search_treats_wildcards_literally() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "shooter", "password123")
        .await
        .expect("Failed to create user");
    create_test_photo(&db, user.id, "golden hour at the pier")
        .await
        .expect("Failed to create photo");
    let literal = create_test_photo(&db, user.id, "humidity at 100%")
        .await
        .expect("Failed to create photo");

    // "%" is not a match-everything query; it matches only descriptions
    // containing a percent sign.
    let results = search::search_photos(&db, "%", 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, literal.id);

    let underscore = search::search_users(&db, "_", 0, 20)
        .await
        .expect("Query failed");
    assert!(underscore.is_empty());

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_search_tags_by_name() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    fstop::tag::get_or_create(&db, "architecture")
        .await
        .expect("Create failed");
    fstop::tag::get_or_create(&db, "portrait")
        .await
        .expect("Create failed");

    let results = search::search_tags(&db, "arch", 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "architecture");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
