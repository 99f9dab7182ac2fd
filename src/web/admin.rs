/// Moderation and administration.
///
/// Lock/block and the listings need MODERATE; the profile editor, which can
/// change roles, needs ADMINISTER. Neither lever works against an account
/// that itself holds MODERATE: demote it first.
use super::{db_error, PageQuery};
use crate::account;
use crate::app_config;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::orm::{comments, photos, tags, users};
use crate::permission::{self, Permission, RoleName};
use actix_web::{delete, error, get, post, web, Error, HttpResponse, Responder};
use sea_orm::{entity::*, query::*, QueryFilter, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(dashboard)
        .service(lock_user)
        .service(unlock_user)
        .service(block_user)
        .service(unblock_user)
        .service(edit_user_profile)
        .service(list_users)
        .service(list_photos)
        .service(list_comments)
        .service(list_tags)
        .service(delete_tag);
}

/// Load the target and refuse to act on fellow moderators.
async fn moderation_target(target_id: i32) -> Result<users::Model, Error> {
    let db = get_db_pool();
    let target = account::get_user(db, target_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error::ErrorNotFound("No such user"))?;

    let target_perms = permission::user_permissions(db, &target)
        .await
        .map_err(db_error)?;
    if target_perms.contains(Permission::MODERATE) {
        return Err(error::ErrorForbidden("Cannot moderate a moderator"));
    }
    Ok(target)
}

/// GET /admin - dashboard counts
#[get("/admin")]
pub async fn dashboard(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_permission(Permission::MODERATE)?;
    let db = get_db_pool();

    let user_count = users::Entity::find().count(db).await.map_err(db_error)?;
    let locked_count = users::Entity::find()
        .filter(users::Column::Locked.eq(true))
        .count(db)
        .await
        .map_err(db_error)?;
    let blocked_count = users::Entity::find()
        .filter(users::Column::Active.eq(false))
        .count(db)
        .await
        .map_err(db_error)?;
    let photo_count = photos::Entity::find().count(db).await.map_err(db_error)?;
    let reported_photos = photos::Entity::find()
        .filter(photos::Column::Flag.gt(0))
        .count(db)
        .await
        .map_err(db_error)?;
    let comment_count = comments::Entity::find().count(db).await.map_err(db_error)?;
    let reported_comments = comments::Entity::find()
        .filter(comments::Column::Flag.gt(0))
        .count(db)
        .await
        .map_err(db_error)?;
    let tag_count = tags::Entity::find().count(db).await.map_err(db_error)?;

    Ok(web::Json(json!({
        "users": user_count,
        "locked_users": locked_count,
        "blocked_users": blocked_count,
        "photos": photo_count,
        "reported_photos": reported_photos,
        "comments": comment_count,
        "reported_comments": reported_comments,
        "tags": tag_count,
    })))
}

/// POST /admin/users/{id}/lock
#[post("/admin/users/{id}/lock")]
pub async fn lock_user(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_permission(Permission::MODERATE)?;
    let target = moderation_target(*path).await?;

    let user = account::lock(get_db_pool(), target).await.map_err(db_error)?;
    log::info!("User {} locked by {:?}", user.id, client.get_id());
    Ok(HttpResponse::Ok().json(user))
}

/// POST /admin/users/{id}/unlock
#[post("/admin/users/{id}/unlock")]
pub async fn unlock_user(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_permission(Permission::MODERATE)?;
    let target = moderation_target(*path).await?;

    let user = account::unlock(get_db_pool(), target)
        .await
        .map_err(db_error)?;
    log::info!("User {} unlocked by {:?}", user.id, client.get_id());
    Ok(HttpResponse::Ok().json(user))
}

/// POST /admin/users/{id}/block
#[post("/admin/users/{id}/block")]
pub async fn block_user(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_permission(Permission::MODERATE)?;
    let target = moderation_target(*path).await?;

    let user = account::block(get_db_pool(), target).await.map_err(db_error)?;
    log::info!("User {} blocked by {:?}", user.id, client.get_id());
    Ok(HttpResponse::Ok().json(user))
}

/// POST /admin/users/{id}/unblock
#[post("/admin/users/{id}/unblock")]
pub async fn unblock_user(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_permission(Permission::MODERATE)?;
    let target = moderation_target(*path).await?;

    let user = account::unblock(get_db_pool(), target)
        .await
        .map_err(db_error)?;
    log::info!("User {} unblocked by {:?}", user.id, client.get_id());
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminProfileForm {
    #[validate(length(min = 1, max = 20))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub name: Option<String>,
    pub confirmed: Option<bool>,
    pub active: Option<bool>,
    /// Role name from the catalogue.
    pub role: Option<String>,
}

/// POST /admin/users/{id}/profile - admin profile editor, can change roles
#[post("/admin/users/{id}/profile")]
pub async fn edit_user_profile(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<AdminProfileForm>,
) -> Result<HttpResponse, Error> {
    client.require_permission(Permission::ADMINISTER)?;
    let form = form.into_inner();
    form.validate().map_err(error::ErrorBadRequest)?;

    let db = get_db_pool();
    let target = account::get_user(db, *path)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error::ErrorNotFound("No such user"))?;

    let role = match &form.role {
        Some(name) => {
            let role = RoleName::parse(name)
                .ok_or_else(|| error::ErrorBadRequest("Unknown role"))?;
            let row = permission::get_role(db, role).await.map_err(db_error)?;
            Some((role, row.id))
        }
        None => None,
    };

    let txn = db.begin().await.map_err(db_error)?;

    if let Some(username) = &form.username {
        if let Some(existing) = account::get_user_by_username(&txn, username)
            .await
            .map_err(db_error)?
        {
            if existing.id != target.id {
                return Err(error::ErrorConflict("Username is already taken"));
            }
        }
    }
    if let Some(email) = &form.email {
        if let Some(existing) = account::get_user_by_email(&txn, email)
            .await
            .map_err(db_error)?
        {
            if existing.id != target.id {
                return Err(error::ErrorConflict("Email is already registered"));
            }
        }
    }

    let mut active: users::ActiveModel = target.into();
    if let Some(username) = form.username {
        active.username = Set(username.trim().to_owned());
    }
    if let Some(email) = form.email {
        active.email = Set(email.trim().to_lowercase());
    }
    if let Some(name) = form.name {
        active.name = Set(name.trim().to_owned());
    }
    if let Some(confirmed) = form.confirmed {
        active.confirmed = Set(confirmed);
    }
    if let Some(is_active) = form.active {
        active.active = Set(is_active);
    }
    if let Some((role, role_id)) = role {
        // Assigning Locked is the same lever as the lock action, so the
        // flag follows the role.
        active.role_id = Set(Some(role_id));
        active.locked = Set(role == RoleName::Locked);
    }
    let user = active.update(&txn).await.map_err(db_error)?;
    txn.commit().await.map_err(db_error)?;

    log::info!("User {} edited by admin {:?}", user.id, client.get_id());
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    /// "locked", "blocked" or "all" (the default).
    pub filter: Option<String>,
}

/// GET /admin/users - paginated user listing with lifecycle filters
#[get("/admin/users")]
pub async fn list_users(
    client: ClientCtx,
    query: web::Query<UserListQuery>,
) -> Result<impl Responder, Error> {
    client.require_permission(Permission::MODERATE)?;
    let db = get_db_pool();

    let mut find = users::Entity::find().order_by_asc(users::Column::Id);
    match query.filter.as_deref().unwrap_or("all") {
        "locked" => find = find.filter(users::Column::Locked.eq(true)),
        "blocked" => find = find.filter(users::Column::Active.eq(false)),
        "all" => {}
        other => return Err(error::ErrorBadRequest(format!("Unknown filter: {}", other))),
    }

    let rows = find
        .paginate(db, app_config::limits().users_per_page)
        .fetch_page(PageQuery { page: query.page }.index())
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "users": rows })))
}

/// GET /admin/photos - most-reported first
#[get("/admin/photos")]
pub async fn list_photos(
    client: ClientCtx,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    client.require_permission(Permission::MODERATE)?;
    let rows = photos::Entity::find()
        .order_by_desc(photos::Column::Flag)
        .order_by_desc(photos::Column::CreatedAt)
        .paginate(get_db_pool(), app_config::limits().photos_per_page)
        .fetch_page(page.index())
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "photos": rows })))
}

/// GET /admin/comments - most-reported first
#[get("/admin/comments")]
pub async fn list_comments(
    client: ClientCtx,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    client.require_permission(Permission::MODERATE)?;
    let rows = comments::Entity::find()
        .order_by_desc(comments::Column::Flag)
        .order_by_desc(comments::Column::CreatedAt)
        .paginate(get_db_pool(), app_config::limits().comments_per_page)
        .fetch_page(page.index())
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "comments": rows })))
}

/// GET /admin/tags
#[get("/admin/tags")]
pub async fn list_tags(
    client: ClientCtx,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    client.require_permission(Permission::MODERATE)?;
    let rows = tags::Entity::find()
        .order_by_asc(tags::Column::Name)
        .paginate(get_db_pool(), app_config::limits().users_per_page)
        .fetch_page(page.index())
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "tags": rows })))
}

/// DELETE /admin/tags/{id} - remove a tag from every photo
#[delete("/admin/tags/{id}")]
pub async fn delete_tag(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_permission(Permission::MODERATE)?;
    let db = get_db_pool();

    let deleted = tags::Entity::delete_by_id(*path)
        .exec(db)
        .await
        .map_err(db_error)?;
    if deleted.rows_affected == 0 {
        return Err(error::ErrorNotFound("No such tag"));
    }
    Ok(HttpResponse::Ok().finish())
}
