//! Integration tests for lock, block and the role catalogue

mod common;
use serial_test::serial;

use common::{database::*, fixtures::*};
use fstop::account;
use fstop::permission::{self, Permission, RoleName};

#[actix_rt::test]
#[serial]
async fn test_lock_strips_posting_rights() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_confirmed_user(&db, "troublemaker", "password123")
        .await
        .expect("Failed to create user");

    let user = account::lock(&db, user).await.expect("Lock failed");
    assert!(user.locked);

    let perms = permission::user_permissions(&db, &user)
        .await
        .expect("Query failed");
    assert!(perms.contains(Permission::FOLLOW));
    assert!(perms.contains(Permission::COLLECT));
    assert!(!perms.contains(Permission::COMMENT));
    assert!(!perms.contains(Permission::UPLOAD));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_unlock_restores_the_default_role() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_confirmed_user(&db, "reformed", "password123")
        .await
        .expect("Failed to create user");

    // Promote to moderator first, so the round trip is observable.
    let moderator_role = permission::get_role(&db, RoleName::Moderator)
        .await
        .expect("Role lookup failed");
    let mut active: fstop::orm::users::ActiveModel = user.into();
    active.role_id = sea_orm::ActiveValue::Set(Some(moderator_role.id));
    let user = sea_orm::ActiveModelTrait::update(active, &db)
        .await
        .expect("Update failed");

    let user = account::lock(&db, user).await.expect("Lock failed");
    let user = account::unlock(&db, user).await.expect("Unlock failed");

    assert!(!user.locked);
    let perms = permission::user_permissions(&db, &user)
        .await
        .expect("Query failed");
    // Unlock lands on the plain User role, not the old Moderator one.
    assert!(perms.contains(Permission::UPLOAD));
    assert!(!perms.contains(Permission::MODERATE));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_block_only_touches_the_active_flag() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_confirmed_user(&db, "banned", "password123")
        .await
        .expect("Failed to create user");
    let role_before = user.role_id;

    let user = account::block(&db, user).await.expect("Block failed");
    assert!(!user.active);
    assert_eq!(user.role_id, role_before);

    let user = account::unblock(&db, user).await.expect("Unblock failed");
    assert!(user.active);
    assert_eq!(user.role_id, role_before);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_init_roles_resyncs_drifted_rows() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    // Tamper with a role's bitmask directly.
    let user_role = permission::get_role(&db, RoleName::User)
        .await
        .expect("Role lookup failed");
    let mut active: fstop::orm::roles::ActiveModel = user_role.into();
    active.permissions = sea_orm::ActiveValue::Set(0);
    sea_orm::ActiveModelTrait::update(active, &db)
        .await
        .expect("Update failed");

    permission::init_roles(&db).await.expect("Re-sync failed");

    let user_role = permission::get_role(&db, RoleName::User)
        .await
        .expect("Role lookup failed");
    assert_eq!(
        Permission::from_db(user_role.permissions),
        RoleName::User.permissions()
    );

    // Running it again changes nothing.
    permission::init_roles(&db).await.expect("Re-sync failed");
    let roles_after = permission::get_role(&db, RoleName::User)
        .await
        .expect("Role lookup failed");
    assert_eq!(roles_after.id, user_role.id);

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_password_change_and_verify() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "changer", "oldpassword1")
        .await
        .expect("Failed to create user");

    assert!(fstop::session::verify_password(
        "oldpassword1",
        &user.password_hash
    ));

    let user = account::set_password(&db, user, "newpassword1")
        .await
        .expect("Set password failed");

    assert!(!fstop::session::verify_password(
        "oldpassword1",
        &user.password_hash
    ));
    assert!(fstop::session::verify_password(
        "newpassword1",
        &user.password_hash
    ));

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}

#[actix_rt::test]
#[serial]
async fn test_change_email_refuses_taken_address() {
    let db = setup_test_database()
        .await
        .expect("Failed to connect to test database");

    cleanup_test_data(&db).await.expect("Failed to cleanup");

    let user = create_test_user(&db, "mover", "password123")
        .await
        .expect("Failed to create user");
    create_test_user(&db, "squatter", "password123")
        .await
        .expect("Failed to create user");

    // squatter@test.com is taken.
    let refused = account::change_email(&db, user.clone(), "Squatter@test.com")
        .await
        .expect("Change email failed");
    assert!(refused.is_none());

    let moved = account::change_email(&db, user, "new@test.com")
        .await
        .expect("Change email failed")
        .expect("Address should be free");
    assert_eq!(moved.email, "new@test.com");

    cleanup_test_data(&db).await.expect("Failed to cleanup");
}
