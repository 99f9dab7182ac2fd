/// Comments and replies on photos.
use super::{db_error, PageQuery};
use crate::account;
use crate::app_config;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::comments;
use crate::permission::Permission;
use actix_web::{delete, error, get, post, web, Error, HttpResponse, Responder};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, QueryFilter, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_comments)
        .service(create_comment)
        .service(delete_comment)
        .service(report_comment);
}

/// GET /photo/{id}/comments - oldest first
#[get("/photo/{id}/comments")]
pub async fn list_comments(
    path: web::Path<i32>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let rows = comments::Entity::find()
        .filter(comments::Column::PhotoId.eq(*path))
        .order_by_asc(comments::Column::CreatedAt)
        .paginate(db, app_config::limits().comments_per_page)
        .fetch_page(page.index())
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "comments": rows })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, max = 500))]
    pub body: String,
    /// Id of the comment being replied to, if any.
    pub replied_id: Option<i32>,
}

/// POST /photo/{id}/comments - comment or reply
#[post("/photo/{id}/comments")]
pub async fn create_comment(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CommentForm>,
) -> Result<HttpResponse, Error> {
    let me = client.require_confirmed()?.clone();
    client.require_permission(Permission::COMMENT)?;
    form.validate().map_err(error::ErrorBadRequest)?;

    let db = get_db_pool();
    let photo = crate::photo::get_photo(db, *path)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error::ErrorNotFound("No such photo"))?;

    if !photo.can_comment {
        return Err(error::ErrorForbidden("Comments are closed on this photo"));
    }

    // A reply must target a comment on the same photo.
    let replied = match form.replied_id {
        Some(replied_id) => {
            let parent = comments::Entity::find_by_id(replied_id)
                .one(db)
                .await
                .map_err(db_error)?
                .ok_or_else(|| error::ErrorBadRequest("No such comment to reply to"))?;
            if parent.photo_id != photo.id {
                return Err(error::ErrorBadRequest("Reply targets another photo"));
            }
            Some(parent)
        }
        None => None,
    };

    let author = account::get_user(db, photo.author_id)
        .await
        .map_err(db_error)?;

    let txn = db.begin().await.map_err(db_error)?;
    let comment = comments::ActiveModel {
        body: Set(form.body.clone()),
        author_id: Set(me.id),
        photo_id: Set(photo.id),
        replied_id: Set(form.replied_id),
        flag: Set(0),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(db_error)?;

    if let Some(author) = &author {
        crate::notifications::push_comment_notification(&txn, me.id, photo.id, author)
            .await
            .map_err(db_error)?;
    }
    // A reply also pings the comment being answered.
    if let Some(parent) = replied {
        if parent.author_id != photo.author_id {
            if let Some(parent_author) = account::get_user(&txn, parent.author_id)
                .await
                .map_err(db_error)?
            {
                crate::notifications::push_comment_notification(&txn, me.id, photo.id, &parent_author)
                    .await
                    .map_err(db_error)?;
            }
        }
    }
    txn.commit().await.map_err(db_error)?;

    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /comment/{id} - comment author, photo owner or moderator
#[delete("/comment/{id}")]
pub async fn delete_comment(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let me_id = client.require_login()?;
    let db = get_db_pool();

    let comment = comments::Entity::find_by_id(*path)
        .one(db)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error::ErrorNotFound("No such comment"))?;

    let photo = crate::photo::get_photo(db, comment.photo_id)
        .await
        .map_err(db_error)?;
    let photo_owner = photo.map(|p| p.author_id);

    let allowed = comment.author_id == me_id
        || photo_owner == Some(me_id)
        || client.can(Permission::MODERATE);
    if !allowed {
        return Err(error::ErrorForbidden("You cannot delete this comment"));
    }

    comments::Entity::delete_by_id(comment.id)
        .exec(db)
        .await
        .map_err(db_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// POST /comment/{id}/report - flag for moderator attention
#[post("/comment/{id}/report")]
pub async fn report_comment(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_confirmed()?;
    let db = get_db_pool();

    let updated = comments::Entity::update_many()
        .col_expr(
            comments::Column::Flag,
            Expr::col(comments::Column::Flag).add(1),
        )
        .filter(comments::Column::Id.eq(*path))
        .exec(db)
        .await
        .map_err(db_error)?;

    if updated.rows_affected == 0 {
        return Err(error::ErrorNotFound("No such comment"));
    }
    Ok(HttpResponse::Ok().finish())
}
