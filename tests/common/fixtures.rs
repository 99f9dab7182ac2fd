//! Test fixtures for creating test data
#![allow(dead_code)]

use fstop::account::{self, NewUser};
use fstop::filesystem::SavedPhoto;
use fstop::orm::{photos, users};
use sea_orm::{DatabaseConnection, DbErr};

/// Admin address used by registration fixtures. Registering with this
/// address yields the Admin role.
pub const TEST_ADMIN_EMAIL: &str = "admin@test.com";

/// Create a test user through the real registration path, so the account
/// gets the default role and the structural self-follow edge.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, DbErr> {
    account::register(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{}@test.com", username),
            password: password.to_string(),
            name: username.to_string(),
        },
        TEST_ADMIN_EMAIL,
    )
    .await
    .map_err(|e| DbErr::Custom(format!("Registration failed: {}", e)))
}

/// Create a test user and mark the account confirmed.
pub async fn create_confirmed_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<users::Model, DbErr> {
    let user = create_test_user(db, username, password).await?;
    account::confirm(db, user).await
}

/// Create a photo row for a user. No files are written; the filenames are
/// plausible uuid-style stems.
pub async fn create_test_photo(
    db: &DatabaseConnection,
    author_id: i32,
    description: &str,
) -> Result<photos::Model, DbErr> {
    let stem = format!("{:032x}", rand::random::<u128>());
    let saved = SavedPhoto {
        filename: format!("{}.jpg", stem),
        filename_s: format!("{}_s.jpg", stem),
        filename_m: format!("{}_m.jpg", stem),
    };
    fstop::photo::create_photo(db, author_id, Some(description.to_string()), &saved).await
}
