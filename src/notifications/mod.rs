//! Notification fan-out and inbox queries.
//!
//! Each push checks the receiver's preference flag and suppresses
//! self-notification; callers never need to pre-check. Functions take a
//! connection so a push can ride in the transaction of the action that
//! triggered it.

pub mod types;

use crate::app_config;
use crate::orm::{notifications, users};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, QueryFilter};

async fn push<C: ConnectionTrait>(db: &C, receiver_id: i32, message: String) -> Result<(), DbErr> {
    notifications::ActiveModel {
        receiver_id: Set(receiver_id),
        message: Set(message),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Notify `receiver` that `follower` followed them.
pub async fn push_follow_notification<C: ConnectionTrait>(
    db: &C,
    follower: &users::Model,
    receiver: &users::Model,
) -> Result<(), DbErr> {
    if follower.id == receiver.id || !receiver.receive_follow_notification {
        return Ok(());
    }
    let message = types::render_follow(&app_config::site().base_url, &follower.username);
    push(db, receiver.id, message).await
}

/// Notify a photo's author about a new comment or reply.
pub async fn push_comment_notification<C: ConnectionTrait>(
    db: &C,
    commenter_id: i32,
    photo_id: i32,
    receiver: &users::Model,
) -> Result<(), DbErr> {
    if commenter_id == receiver.id || !receiver.receive_comment_notification {
        return Ok(());
    }
    let message = types::render_comment(&app_config::site().base_url, photo_id);
    push(db, receiver.id, message).await
}

/// Notify a photo's author that `collector` collected it.
pub async fn push_collect_notification<C: ConnectionTrait>(
    db: &C,
    collector: &users::Model,
    photo_id: i32,
    receiver: &users::Model,
) -> Result<(), DbErr> {
    if collector.id == receiver.id || !receiver.receive_collect_notification {
        return Ok(());
    }
    let message = types::render_collect(
        &app_config::site().base_url,
        &collector.username,
        photo_id,
    );
    push(db, receiver.id, message).await
}

pub async fn count_unread<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::ReceiverId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .count(db)
        .await
}

/// Mark one notification read. Scoped to the receiver so a user cannot
/// touch someone else's inbox.
pub async fn mark_read<C: ConnectionTrait>(
    db: &C,
    notification_id: i32,
    user_id: i32,
) -> Result<(), DbErr> {
    notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::Id.eq(notification_id))
        .filter(notifications::Column::ReceiverId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn mark_all_read<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<(), DbErr> {
    notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::ReceiverId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(())
}

/// Page of a user's notifications, newest first. `unread_only` narrows to
/// the unread ones.
pub async fn inbox_page<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    unread_only: bool,
    page: u64,
    per_page: u64,
) -> Result<Vec<notifications::Model>, DbErr> {
    let mut query = notifications::Entity::find()
        .filter(notifications::Column::ReceiverId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt);

    if unread_only {
        query = query.filter(notifications::Column::IsRead.eq(false));
    }

    query.paginate(db, per_page).fetch_page(page).await
}
