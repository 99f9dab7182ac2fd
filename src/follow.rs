//! Follow ledger.
//!
//! Edges live in the `follows` table keyed on (follower, followed), so a
//! repeat follow is a no-op enforced by the primary key rather than by a
//! read-then-write check. Every account also carries a structural self-edge
//! (seeded at registration) which puts the owner's own photos in their feed;
//! counts and listings exclude it with a filter.

use crate::orm::{follows, users};
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, QueryFilter};

/// Record that `follower_id` follows `followed_id`. Idempotent; returns
/// whether a new edge was written, so callers can keep a repeat follow
/// silent without racing a separate existence check.
pub async fn follow<C: ConnectionTrait>(
    db: &C,
    follower_id: i32,
    followed_id: i32,
) -> Result<bool, DbErr> {
    let edge = follows::ActiveModel {
        follower_id: Set(follower_id),
        followed_id: Set(followed_id),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    let result = follows::Entity::insert(edge)
        .on_conflict(
            OnConflict::columns([follows::Column::FollowerId, follows::Column::FollowedId])
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await;
    match result {
        Ok(_) => Ok(true),
        // Conflict on the primary key: the edge already exists.
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove the edge if present. Idempotent.
pub async fn unfollow<C: ConnectionTrait>(
    db: &C,
    follower_id: i32,
    followed_id: i32,
) -> Result<(), DbErr> {
    follows::Entity::delete_many()
        .filter(follows::Column::FollowerId.eq(follower_id))
        .filter(follows::Column::FollowedId.eq(followed_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn is_following<C: ConnectionTrait>(
    db: &C,
    follower_id: i32,
    followed_id: i32,
) -> Result<bool, DbErr> {
    Ok(follows::Entity::find_by_id((follower_id, followed_id))
        .one(db)
        .await?
        .is_some())
}

/// Seed the structural self-edge for a new account.
pub async fn seed_self_follow<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<(), DbErr> {
    follow(db, user_id, user_id).await.map(|_| ())
}

/// Number of accounts following `user_id`, excluding the self-edge.
pub async fn follower_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    follows::Entity::find()
        .filter(follows::Column::FollowedId.eq(user_id))
        .filter(follows::Column::FollowerId.ne(user_id))
        .count(db)
        .await
}

/// Number of accounts `user_id` follows, excluding the self-edge.
pub async fn following_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    follows::Entity::find()
        .filter(follows::Column::FollowerId.eq(user_id))
        .filter(follows::Column::FollowedId.ne(user_id))
        .count(db)
        .await
}

/// Page of accounts following `user_id`, newest edge first.
pub async fn followers_page<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find()
        .join_rev(JoinType::InnerJoin, follows::Relation::Follower.def())
        .filter(follows::Column::FollowedId.eq(user_id))
        .filter(follows::Column::FollowerId.ne(user_id))
        .order_by_desc(follows::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

/// Page of accounts `user_id` follows, newest edge first.
pub async fn following_page<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find()
        .join_rev(JoinType::InnerJoin, follows::Relation::Followed.def())
        .filter(follows::Column::FollowerId.eq(user_id))
        .filter(follows::Column::FollowedId.ne(user_id))
        .order_by_desc(follows::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}
