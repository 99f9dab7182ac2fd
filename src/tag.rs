//! Tags and the photo/tag junction.
//!
//! Tags are shared rows looked up by name; the last photo leaving a tag
//! deletes it. Attachment is idempotent through the junction's primary key.

use crate::orm::{photo_tags, tags};
use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, FromQueryResult, QueryFilter};

/// Split a whitespace-separated tag field into unique names, order kept.
pub fn parse_tag_names(input: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for word in input.split_whitespace() {
        if !names.iter().any(|n| n == word) {
            names.push(word.to_owned());
        }
    }
    names
}

/// Find a tag by name, creating it if absent.
pub async fn get_or_create<C: ConnectionTrait>(db: &C, name: &str) -> Result<tags::Model, DbErr> {
    if let Some(tag) = tags::Entity::find()
        .filter(tags::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok(tag);
    }

    let insert = tags::Entity::insert(tags::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(tags::Column::Name).do_nothing().to_owned())
    .exec(db)
    .await;

    match insert {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }

    // Re-read so a concurrent insert still yields the winning row.
    tags::Entity::find()
        .filter(tags::Column::Name.eq(name))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("tag {} vanished after insert", name)))
}

/// Attach a tag to a photo. Idempotent.
pub async fn attach<C: ConnectionTrait>(db: &C, photo_id: i32, tag_id: i32) -> Result<(), DbErr> {
    let edge = photo_tags::ActiveModel {
        photo_id: Set(photo_id),
        tag_id: Set(tag_id),
    };
    let result = photo_tags::Entity::insert(edge)
        .on_conflict(
            OnConflict::columns([photo_tags::Column::PhotoId, photo_tags::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await;
    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Detach a tag from a photo and drop the tag when no photo uses it.
pub async fn detach<C: ConnectionTrait>(db: &C, photo_id: i32, tag_id: i32) -> Result<(), DbErr> {
    photo_tags::Entity::delete_many()
        .filter(photo_tags::Column::PhotoId.eq(photo_id))
        .filter(photo_tags::Column::TagId.eq(tag_id))
        .exec(db)
        .await?;
    delete_if_orphan(db, tag_id).await
}

/// Delete a tag that no longer appears on any photo.
pub async fn delete_if_orphan<C: ConnectionTrait>(db: &C, tag_id: i32) -> Result<(), DbErr> {
    let in_use = photo_tags::Entity::find()
        .filter(photo_tags::Column::TagId.eq(tag_id))
        .count(db)
        .await?;
    if in_use == 0 {
        tags::Entity::delete_by_id(tag_id).exec(db).await?;
    }
    Ok(())
}

pub async fn tags_of_photo<C: ConnectionTrait>(
    db: &C,
    photo_id: i32,
) -> Result<Vec<tags::Model>, DbErr> {
    tags::Entity::find()
        .join_rev(JoinType::InnerJoin, photo_tags::Relation::Tags.def())
        .filter(photo_tags::Column::PhotoId.eq(photo_id))
        .order_by_asc(tags::Column::Name)
        .all(db)
        .await
}

#[derive(Debug, FromQueryResult, serde::Serialize)]
pub struct TagWithCount {
    pub id: i32,
    pub name: String,
    pub photo_count: i64,
}

/// Tags ranked by how many photos carry them.
pub async fn hot_tags<C: ConnectionTrait>(db: &C, limit: u64) -> Result<Vec<TagWithCount>, DbErr> {
    tags::Entity::find()
        .select_only()
        .column(tags::Column::Id)
        .column(tags::Column::Name)
        .column_as(photo_tags::Column::PhotoId.count(), "photo_count")
        .join(JoinType::InnerJoin, tags::Relation::PhotoTags.def())
        .group_by(tags::Column::Id)
        .group_by(tags::Column::Name)
        .order_by_desc(photo_tags::Column::PhotoId.count())
        .limit(limit)
        .into_model::<TagWithCount>()
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_dedupes_tag_field() {
        assert_eq!(
            parse_tag_names("  sunset beach sunset  sky "),
            vec!["sunset", "beach", "sky"]
        );
    }

    #[test]
    fn empty_field_yields_no_tags() {
        assert!(parse_tag_names("").is_empty());
        assert!(parse_tag_names("   \t\n").is_empty());
    }

    #[test]
    fn tag_names_are_case_sensitive() {
        assert_eq!(parse_tag_names("Sunset sunset"), vec!["Sunset", "sunset"]);
    }
}
