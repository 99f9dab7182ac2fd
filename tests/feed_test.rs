//! Integration tests for the home feed and photo stream navigation

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use fstop::{follow, photo};

#[actix_rt::test]
#[serial]
async fn test_home_feed_includes_own_and_followed_photos() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let me = create_test_user(&db, "me", "password123")
        .await
        .expect("Failed to create user");
    let friend = create_test_user(&db, "friend", "password123")
        .await
        .expect("Failed to create friend");
    let stranger = create_test_user(&db, "stranger", "password123")
        .await
        .expect("Failed to create stranger");

    follow::follow(&db, me.id, friend.id)
        .await
        .expect("Follow failed");

    let mine = create_test_photo(&db, me.id, "mine")
        .await
        .expect("Failed to create photo");
    let theirs = create_test_photo(&db, friend.id, "theirs")
        .await
        .expect("Failed to create photo");
    let unseen = create_test_photo(&db, stranger.id, "unseen")
        .await
        .expect("Failed to create photo");

    let feed = photo::home_feed_page(&db, me.id, 0, 20)
        .await
        .expect("Query failed");
    let ids: Vec<i32> = feed.iter().map(|p| p.id).collect();

    // The structural self-edge puts my own photos in my feed.
    assert!(ids.contains(&mine.id));
    assert!(ids.contains(&theirs.id));
    assert!(!ids.contains(&unseen.id));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_stream_navigation_stays_within_the_author() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let other = create_test_user(&db, "other", "password123")
        .await
        .expect("Failed to create other");

    let first = create_test_photo(&db, author.id, "first")
        .await
        .expect("Failed to create photo");
    // Someone else's photo lands between the author's two.
    create_test_photo(&db, other.id, "interloper")
        .await
        .expect("Failed to create photo");
    let second = create_test_photo(&db, author.id, "second")
        .await
        .expect("Failed to create photo");

    let older = photo::next_in_stream(&db, &second)
        .await
        .expect("Query failed")
        .expect("Expected an older photo");
    assert_eq!(older.id, first.id);

    let newer = photo::prev_in_stream(&db, &first)
        .await
        .expect("Query failed")
        .expect("Expected a newer photo");
    assert_eq!(newer.id, second.id);

    // The ends of the stream return nothing.
    assert!(photo::next_in_stream(&db, &first)
        .await
        .expect("Query failed")
        .is_none());
    assert!(photo::prev_in_stream(&db, &second)
        .await
        .expect("Query failed")
        .is_none());

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_report_bumps_the_flag_counter() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let flagged = create_test_photo(&db, author.id, "flagged")
        .await
        .expect("Failed to create photo");

    photo::report_photo(&db, flagged.id)
        .await
        .expect("Report failed");
    photo::report_photo(&db, flagged.id)
        .await
        .expect("Report failed");

    let row = photo::get_photo(&db, flagged.id)
        .await
        .expect("Query failed")
        .expect("Photo vanished");
    assert_eq!(row.flag, 2);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
