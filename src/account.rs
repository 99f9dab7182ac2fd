//! Account lifecycle: registration, confirmation, credential changes and
//! the moderation switches (lock, block).
//!
//! Lock and block are distinct levers: locking swaps the account to the
//! Locked role (keeps the session, strips posting rights), blocking clears
//! `active` so the account cannot authenticate at all. Neither deletes data.

use crate::filesystem::SavedPhoto;
use crate::follow;
use crate::orm::{photo_tags, photos, users};
use crate::permission::{self, RoleName};
use crate::session;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, QueryFilter};

#[derive(Debug)]
pub enum RegisterError {
    UsernameTaken,
    EmailTaken,
    /// Password could not be hashed.
    Hash(String),
    Db(DbErr),
}

impl std::fmt::Display for RegisterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterError::UsernameTaken => write!(f, "Username is already taken"),
            RegisterError::EmailTaken => write!(f, "Email is already registered"),
            RegisterError::Hash(msg) => write!(f, "Password hashing failed: {}", msg),
            RegisterError::Db(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for RegisterError {}

impl From<DbErr> for RegisterError {
    fn from(e: DbErr) -> Self {
        RegisterError::Db(e)
    }
}

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Create an account. The registration email is lowercased; registering
/// with the configured admin address yields the Admin role, anything else
/// the default role. The structural self-follow edge is seeded here so the
/// caller's transaction covers both writes.
pub async fn register<C: ConnectionTrait>(
    db: &C,
    new: NewUser,
    admin_email: &str,
) -> Result<users::Model, RegisterError> {
    let email = new.email.trim().to_lowercase();
    let username = new.username.trim().to_owned();

    if users::Entity::find()
        .filter(users::Column::Username.eq(username.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(RegisterError::UsernameTaken);
    }
    if users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(RegisterError::EmailTaken);
    }

    let password_hash =
        session::hash_password(&new.password).map_err(|e| RegisterError::Hash(e.to_string()))?;

    let role = if email == admin_email.to_lowercase() {
        permission::get_role(db, RoleName::Admin).await?
    } else {
        permission::get_default_role(db).await?
    };

    let user = users::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(password_hash),
        name: Set(new.name.trim().to_owned()),
        member_since: Set(chrono::Utc::now().naive_utc()),
        confirmed: Set(false),
        role_id: Set(Some(role.id)),
        receive_comment_notification: Set(true),
        receive_follow_notification: Set(true),
        receive_collect_notification: Set(true),
        public_collections: Set(true),
        locked: Set(false),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    follow::seed_self_follow(db, user.id).await?;
    Ok(user)
}

pub async fn get_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(user_id).one(db).await
}

pub async fn get_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await
}

pub async fn get_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email.to_lowercase()))
        .one(db)
        .await
}

/// Mark the account confirmed. Idempotent.
pub async fn confirm<C: ConnectionTrait>(db: &C, user: users::Model) -> Result<users::Model, DbErr> {
    if user.confirmed {
        return Ok(user);
    }
    let mut active: users::ActiveModel = user.into();
    active.confirmed = Set(true);
    active.update(db).await
}

pub async fn set_password<C: ConnectionTrait>(
    db: &C,
    user: users::Model,
    new_password: &str,
) -> Result<users::Model, DbErr> {
    let hash = session::hash_password(new_password)
        .map_err(|e| DbErr::Custom(format!("password hashing failed: {}", e)))?;
    let mut active: users::ActiveModel = user.into();
    active.password_hash = Set(hash);
    active.update(db).await
}

/// Point the account at a new address. Returns `Ok(None)` when the address
/// is already registered to someone else.
pub async fn change_email<C: ConnectionTrait>(
    db: &C,
    user: users::Model,
    new_email: &str,
) -> Result<Option<users::Model>, DbErr> {
    let new_email = new_email.trim().to_lowercase();
    if let Some(existing) = get_user_by_email(db, &new_email).await? {
        if existing.id != user.id {
            return Ok(None);
        }
    }
    let mut active: users::ActiveModel = user.into();
    active.email = Set(new_email);
    active.update(db).await.map(Some)
}

/// Lock: swap to the Locked role and raise the flag.
pub async fn lock<C: ConnectionTrait>(db: &C, user: users::Model) -> Result<users::Model, DbErr> {
    let locked_role = permission::get_role(db, RoleName::Locked).await?;
    let mut active: users::ActiveModel = user.into();
    active.locked = Set(true);
    active.role_id = Set(Some(locked_role.id));
    active.update(db).await
}

/// Unlock: restore the default User role. An account locked while holding
/// a wider role comes back as a plain User.
pub async fn unlock<C: ConnectionTrait>(db: &C, user: users::Model) -> Result<users::Model, DbErr> {
    let user_role = permission::get_role(db, RoleName::User).await?;
    let mut active: users::ActiveModel = user.into();
    active.locked = Set(false);
    active.role_id = Set(Some(user_role.id));
    active.update(db).await
}

/// Block: refuse authentication. Role and data are untouched.
pub async fn block<C: ConnectionTrait>(db: &C, user: users::Model) -> Result<users::Model, DbErr> {
    let mut active: users::ActiveModel = user.into();
    active.active = Set(false);
    active.update(db).await
}

pub async fn unblock<C: ConnectionTrait>(db: &C, user: users::Model) -> Result<users::Model, DbErr> {
    let mut active: users::ActiveModel = user.into();
    active.active = Set(true);
    active.update(db).await
}

/// Delete the account row. Cascades take the photos, edges, comments and
/// notifications; tags orphaned by the cascade are swept here. Returns the
/// stored file sets so the caller can remove them after the transaction
/// commits.
pub async fn delete_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<SavedPhoto>, DbErr> {
    let owned_photos = photos::Entity::find()
        .filter(photos::Column::AuthorId.eq(user_id))
        .all(db)
        .await?;

    let photo_ids: Vec<i32> = owned_photos.iter().map(|p| p.id).collect();
    let tag_ids: Vec<i32> = if photo_ids.is_empty() {
        Vec::new()
    } else {
        photo_tags::Entity::find()
            .filter(photo_tags::Column::PhotoId.is_in(photo_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|edge| edge.tag_id)
            .collect()
    };

    users::Entity::delete_by_id(user_id).exec(db).await?;

    for tag_id in tag_ids {
        crate::tag::delete_if_orphan(db, tag_id).await?;
    }

    Ok(owned_photos
        .into_iter()
        .map(|p| SavedPhoto {
            filename: p.filename,
            filename_s: p.filename_s,
            filename_m: p.filename_m,
        })
        .collect())
}
