//! Substring search across users, photos and tags.

use crate::orm::{photos, tags, users};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, QueryFilter};

/// Escape LIKE metacharacters so the query is matched literally. Without
/// this a query of "%" would match every row.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if c == '\\' || c == '%' || c == '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Users whose username or display name contains the query.
pub async fn search_users<C: ConnectionTrait>(
    db: &C,
    query: &str,
    page: u64,
    per_page: u64,
) -> Result<Vec<users::Model>, DbErr> {
    let pattern = like_pattern(query);
    users::Entity::find()
        .filter(
            Condition::any()
                .add(users::Column::Username.like(&pattern))
                .add(users::Column::Name.like(&pattern)),
        )
        .order_by_asc(users::Column::Username)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

/// Photos whose description contains the query, newest first.
pub async fn search_photos<C: ConnectionTrait>(
    db: &C,
    query: &str,
    page: u64,
    per_page: u64,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::Description.like(&like_pattern(query)))
        .order_by_desc(photos::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}

/// Tags whose name contains the query.
pub async fn search_tags<C: ConnectionTrait>(
    db: &C,
    query: &str,
    page: u64,
    per_page: u64,
) -> Result<Vec<tags::Model>, DbErr> {
    tags::Entity::find()
        .filter(tags::Column::Name.like(&like_pattern(query)))
        .order_by_asc(tags::Column::Name)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
}
