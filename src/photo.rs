//! Photo records, timeline queries and stream navigation.

use crate::filesystem::SavedPhoto;
use crate::orm::{follows, photo_tags, photos};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, QueryFilter};

/// Insert a photo row for a stored upload.
pub async fn create_photo<C: ConnectionTrait>(
    db: &C,
    author_id: i32,
    description: Option<String>,
    saved: &SavedPhoto,
) -> Result<photos::Model, DbErr> {
    photos::ActiveModel {
        author_id: Set(author_id),
        description: Set(description),
        filename: Set(saved.filename.clone()),
        filename_s: Set(saved.filename_s.clone()),
        filename_m: Set(saved.filename_m.clone()),
        can_comment: Set(true),
        flag: Set(0),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn get_photo<C: ConnectionTrait>(
    db: &C,
    photo_id: i32,
) -> Result<Option<photos::Model>, DbErr> {
    photos::Entity::find_by_id(photo_id).one(db).await
}

/// Photos authored by accounts `user_id` follows, newest first. The
/// structural self-edge puts the user's own photos in their feed.
pub async fn home_feed_page<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .join_rev(
            JoinType::InnerJoin,
            follows::Entity::belongs_to(photos::Entity)
                .from(follows::Column::FollowedId)
                .to(photos::Column::AuthorId)
                .into(),
        )
        .filter(follows::Column::FollowerId.eq(user_id))
        .order_by_desc(photos::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

/// Random sample of photos for the explore page.
pub async fn explore_random<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .order_by(Expr::cust("RANDOM()"), Order::Asc)
        .limit(limit)
        .all(db)
        .await
}

pub async fn photos_by_author_page<C: ConnectionTrait>(
    db: &C,
    author_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::AuthorId.eq(author_id))
        .order_by_desc(photos::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

pub async fn photos_by_tag_page<C: ConnectionTrait>(
    db: &C,
    tag_id: i32,
    page: u64,
    per_page: u64,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .join_rev(JoinType::InnerJoin, photo_tags::Relation::Photos.def())
        .filter(photo_tags::Column::TagId.eq(tag_id))
        .order_by_desc(photos::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

/// The next-older photo in the author's stream, if any.
pub async fn next_in_stream<C: ConnectionTrait>(
    db: &C,
    photo: &photos::Model,
) -> Result<Option<photos::Model>, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::AuthorId.eq(photo.author_id))
        .filter(photos::Column::Id.lt(photo.id))
        .order_by_desc(photos::Column::Id)
        .one(db)
        .await
}

/// The next-newer photo in the author's stream, if any.
pub async fn prev_in_stream<C: ConnectionTrait>(
    db: &C,
    photo: &photos::Model,
) -> Result<Option<photos::Model>, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::AuthorId.eq(photo.author_id))
        .filter(photos::Column::Id.gt(photo.id))
        .order_by_asc(photos::Column::Id)
        .one(db)
        .await
}

/// Bump a photo's report counter atomically.
pub async fn report_photo<C: ConnectionTrait>(db: &C, photo_id: i32) -> Result<(), DbErr> {
    photos::Entity::update_many()
        .col_expr(
            photos::Column::Flag,
            Expr::col(photos::Column::Flag).add(1),
        )
        .filter(photos::Column::Id.eq(photo_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Delete a photo row and release any tags it was the last user of.
/// File cleanup is the caller's concern; the row must go first so a
/// failed file deletion cannot leave a dangling record.
pub async fn delete_photo<C: ConnectionTrait>(db: &C, photo_id: i32) -> Result<(), DbErr> {
    let tag_ids: Vec<i32> = photo_tags::Entity::find()
        .filter(photo_tags::Column::PhotoId.eq(photo_id))
        .all(db)
        .await?
        .into_iter()
        .map(|edge| edge.tag_id)
        .collect();

    photos::Entity::delete_by_id(photo_id).exec(db).await?;

    for tag_id in tag_ids {
        crate::tag::delete_if_orphan(db, tag_id).await?;
    }
    Ok(())
}
