//! Integration tests for the follow ledger

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use fstop::follow;

#[actix_rt::test]
#[serial]
async fn test_follow_and_unfollow() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let alice = create_test_user(&db, "alice", "password123")
        .await
        .expect("Failed to create alice");
    let bob = create_test_user(&db, "bob", "password123")
        .await
        .expect("Failed to create bob");

    follow::follow(&db, alice.id, bob.id)
        .await
        .expect("Follow failed");

    assert!(follow::is_following(&db, alice.id, bob.id)
        .await
        .expect("Query failed"));
    assert!(!follow::is_following(&db, bob.id, alice.id)
        .await
        .expect("Query failed"));
    assert_eq!(
        follow::follower_count(&db, bob.id)
            .await
            .expect("Query failed"),
        1
    );
    assert_eq!(
        follow::following_count(&db, alice.id)
            .await
            .expect("Query failed"),
        1
    );

    follow::unfollow(&db, alice.id, bob.id)
        .await
        .expect("Unfollow failed");

    assert!(!follow::is_following(&db, alice.id, bob.id)
        .await
        .expect("Query failed"));
    assert_eq!(
        follow::follower_count(&db, bob.id)
            .await
            .expect("Query failed"),
        0
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_follow_is_idempotent() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let alice = create_test_user(&db, "alice", "password123")
        .await
        .expect("Failed to create alice");
    let bob = create_test_user(&db, "bob", "password123")
        .await
        .expect("Failed to create bob");

    let first = follow::follow(&db, alice.id, bob.id)
        .await
        .expect("Follow failed");
    assert!(first, "First follow should report a new edge");
    // Repeating the edge is silently absorbed.
    let second = follow::follow(&db, alice.id, bob.id)
        .await
        .expect("Repeat follow failed");
    assert!(!second, "Repeat follow should report an existing edge");

    assert_eq!(
        follow::follower_count(&db, bob.id)
            .await
            .expect("Query failed"),
        1
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_unfollow_missing_edge_is_noop() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let alice = create_test_user(&db, "alice", "password123")
        .await
        .expect("Failed to create alice");
    let bob = create_test_user(&db, "bob", "password123")
        .await
        .expect("Failed to create bob");

    follow::unfollow(&db, alice.id, bob.id)
        .await
        .expect("Unfollow of a missing edge should not error");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_counts_exclude_the_self_edge() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let popular = create_test_user(&db, "popular", "password123")
        .await
        .expect("Failed to create user");

    let mut fans = Vec::new();
    for name in ["fan1", "fan2", "fan3"] {
        let fan = create_test_user(&db, name, "password123")
            .await
            .expect("Failed to create fan");
        follow::follow(&db, fan.id, popular.id)
            .await
            .expect("Follow failed");
        fans.push(fan);
    }

    // Every account carries a self-edge; only the three real fans count.
    assert_eq!(
        follow::follower_count(&db, popular.id)
            .await
            .expect("Query failed"),
        3
    );
    for fan in &fans {
        assert_eq!(
            follow::following_count(&db, fan.id)
                .await
                .expect("Query failed"),
            1
        );
    }

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_follower_listing_excludes_self() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let alice = create_test_user(&db, "alice", "password123")
        .await
        .expect("Failed to create alice");
    let bob = create_test_user(&db, "bob", "password123")
        .await
        .expect("Failed to create bob");
    let carol = create_test_user(&db, "carol", "password123")
        .await
        .expect("Failed to create carol");

    follow::follow(&db, bob.id, alice.id)
        .await
        .expect("Follow failed");
    follow::follow(&db, carol.id, alice.id)
        .await
        .expect("Follow failed");

    let followers = follow::followers_page(&db, alice.id, 0, 20)
        .await
        .expect("Query failed");
    let names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();

    assert_eq!(followers.len(), 2);
    assert!(names.contains(&"bob"));
    assert!(names.contains(&"carol"));
    assert!(!names.contains(&"alice"));

    let following = follow::following_page(&db, bob.id, 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(following.len(), 1);
    assert_eq!(following[0].username, "alice");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
