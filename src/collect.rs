//! Collection ledger: users bookmarking photos.
//!
//! Mirrors the follow ledger: edges keyed on (user, photo), repeat collects
//! absorbed by the primary key.

use crate::orm::{collections, photos, users};
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, QueryFilter};

/// Record that `user_id` collected `photo_id`. Idempotent; returns whether
/// a new edge was written.
pub async fn collect<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    photo_id: i32,
) -> Result<bool, DbErr> {
    let edge = collections::ActiveModel {
        user_id: Set(user_id),
        photo_id: Set(photo_id),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    let result = collections::Entity::insert(edge)
        .on_conflict(
            OnConflict::columns([collections::Column::UserId, collections::Column::PhotoId])
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await;
    match result {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove the edge if present. Idempotent.
pub async fn uncollect<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    photo_id: i32,
) -> Result<(), DbErr> {
    collections::Entity::delete_many()
        .filter(collections::Column::UserId.eq(user_id))
        .filter(collections::Column::PhotoId.eq(photo_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn is_collecting<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    photo_id: i32,
) -> Result<bool, DbErr> {
    Ok(collections::Entity::find_by_id((user_id, photo_id))
        .one(db)
        .await?
        .is_some())
}

pub async fn collector_count<C: ConnectionTrait>(db: &C, photo_id: i32) -> Result<u64, DbErr> {
    collections::Entity::find()
        .filter(collections::Column::PhotoId.eq(photo_id))
        .count(db)
        .await
}

pub async fn collection_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    collections::Entity::find()
        .filter(collections::Column::UserId.eq(user_id))
        .count(db)
        .await
}

/// Page of photos `user_id` collected, newest collect first.
pub async fn collected_photos_page<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .join_rev(JoinType::InnerJoin, collections::Relation::Photos.def())
        .filter(collections::Column::UserId.eq(user_id))
        .order_by_desc(collections::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

/// Page of users who collected `photo_id`, newest collect first.
pub async fn collectors_page<C: ConnectionTrait>(
    db: &C,
    photo_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<users::Model>, DbErr> {
    users::Entity::find()
        .join_rev(JoinType::InnerJoin, collections::Relation::Users.def())
        .filter(collections::Column::PhotoId.eq(photo_id))
        .order_by_desc(collections::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}
