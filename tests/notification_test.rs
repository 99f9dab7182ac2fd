//! Integration tests for notification delivery and the inbox

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use fstop::follow;
use fstop::notifications;
use fstop::orm::users;
use sea_orm::{entity::*, ActiveValue::Set};

#[actix_rt::test]
#[serial]
async fn test_follow_notification_is_delivered() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let follower = create_test_user(&db, "follower", "password123")
        .await
        .expect("Failed to create follower");
    let followed = create_test_user(&db, "followed", "password123")
        .await
        .expect("Failed to create followed");

    notifications::push_follow_notification(&db, &follower, &followed)
        .await
        .expect("Push failed");

    assert_eq!(
        notifications::count_unread(&db, followed.id)
            .await
            .expect("Query failed"),
        1
    );
    // Nothing lands in the sender's inbox.
    assert_eq!(
        notifications::count_unread(&db, follower.id)
            .await
            .expect("Query failed"),
        0
    );

    let inbox = notifications::inbox_page(&db, followed.id, false, 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].message.contains("follower"));
    assert!(inbox[0].message.contains("followed you"));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_repeat_follow_leaves_one_edge_and_one_notification() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let fan = create_test_user(&db, "fan", "password123")
        .await
        .expect("Failed to create fan");
    let star = create_test_user(&db, "star", "password123")
        .await
        .expect("Failed to create star");

    // The follow endpoint's sequence: insert the edge, notify only when
    // the edge was new. Run it twice.
    for _ in 0..2 {
        let inserted = follow::follow(&db, fan.id, star.id)
            .await
            .expect("Follow failed");
        if inserted {
            notifications::push_follow_notification(&db, &fan, &star)
                .await
                .expect("Push failed");
        }
    }

    assert_eq!(
        follow::follower_count(&db, star.id)
            .await
            .expect("Query failed"),
        1
    );
    let inbox = notifications::inbox_page(&db, star.id, false, 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(inbox.len(), 1, "A repeat follow must not notify again");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_notification_respects_receiver_preference() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let follower = create_test_user(&db, "follower", "password123")
        .await
        .expect("Failed to create follower");
    let followed = create_test_user(&db, "quiet", "password123")
        .await
        .expect("Failed to create followed");

    let mut active: users::ActiveModel = followed.into();
    active.receive_follow_notification = Set(false);
    let followed = active.update(&db).await.expect("Update failed");

    notifications::push_follow_notification(&db, &follower, &followed)
        .await
        .expect("Push failed");

    assert_eq!(
        notifications::count_unread(&db, followed.id)
            .await
            .expect("Query failed"),
        0
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_own_action_never_notifies_self() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "loner", "password123")
        .await
        .expect("Failed to create user");
    let photo = create_test_photo(&db, user.id, "mine")
        .await
        .expect("Failed to create photo");

    notifications::push_collect_notification(&db, &user, photo.id, &user)
        .await
        .expect("Push failed");
    notifications::push_comment_notification(&db, user.id, photo.id, &user)
        .await
        .expect("Push failed");

    assert_eq!(
        notifications::count_unread(&db, user.id)
            .await
            .expect("Query failed"),
        0
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_mark_read_is_scoped_to_the_receiver() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let follower = create_test_user(&db, "follower", "password123")
        .await
        .expect("Failed to create follower");
    let followed = create_test_user(&db, "followed", "password123")
        .await
        .expect("Failed to create followed");

    notifications::push_follow_notification(&db, &follower, &followed)
        .await
        .expect("Push failed");

    let inbox = notifications::inbox_page(&db, followed.id, true, 0, 20)
        .await
        .expect("Query failed");
    let notification_id = inbox[0].id;

    // Someone else cannot mark it read.
    notifications::mark_read(&db, notification_id, follower.id)
        .await
        .expect("Mark read failed");
    assert_eq!(
        notifications::count_unread(&db, followed.id)
            .await
            .expect("Query failed"),
        1
    );

    // The receiver can.
    notifications::mark_read(&db, notification_id, followed.id)
        .await
        .expect("Mark read failed");
    assert_eq!(
        notifications::count_unread(&db, followed.id)
            .await
            .expect("Query failed"),
        0
    );

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_mark_all_read_and_unread_filter() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let author = create_test_user(&db, "author", "password123")
        .await
        .expect("Failed to create author");
    let photo = create_test_photo(&db, author.id, "busy")
        .await
        .expect("Failed to create photo");

    for name in ["fan1", "fan2", "fan3"] {
        let fan = create_test_user(&db, name, "password123")
            .await
            .expect("Failed to create fan");
        notifications::push_collect_notification(&db, &fan, photo.id, &author)
            .await
            .expect("Push failed");
    }

    assert_eq!(
        notifications::count_unread(&db, author.id)
            .await
            .expect("Query failed"),
        3
    );

    notifications::mark_all_read(&db, author.id)
        .await
        .expect("Mark all read failed");

    assert_eq!(
        notifications::count_unread(&db, author.id)
            .await
            .expect("Query failed"),
        0
    );
    // The unread filter hides them; the full inbox keeps the history.
    let unread = notifications::inbox_page(&db, author.id, true, 0, 20)
        .await
        .expect("Query failed");
    assert!(unread.is_empty());
    let all = notifications::inbox_page(&db, author.id, false, 0, 20)
        .await
        .expect("Query failed");
    assert_eq!(all.len(), 3);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
