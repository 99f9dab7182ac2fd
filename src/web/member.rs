/// Member profiles and the follow graph.
use super::{db_error, PageQuery};
use crate::account;
use crate::app_config;
use crate::collect;
use crate::db::get_db_pool;
use crate::follow;
use crate::middleware::ClientCtx;
use crate::permission::Permission;
use crate::photo;
use actix_web::{error, get, post, web, Error, HttpResponse, Responder};
use sea_orm::TransactionTrait;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(profile)
        .service(member_photos)
        .service(member_collections)
        .service(follow_member)
        .service(unfollow_member)
        .service(followers)
        .service(following);
}

async fn lookup_member(username: &str) -> Result<crate::orm::users::Model, Error> {
    account::get_user_by_username(get_db_pool(), username)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error::ErrorNotFound("No such user"))
}

/// GET /user/{username} - profile with counts
#[get("/user/{username}")]
pub async fn profile(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let user = lookup_member(&path).await?;

    let follower_total = follow::follower_count(db, user.id).await.map_err(db_error)?;
    let following_total = follow::following_count(db, user.id).await.map_err(db_error)?;
    let collections = collect::collection_count(db, user.id).await.map_err(db_error)?;
    let is_following = match client.get_id() {
        Some(viewer) => follow::is_following(db, viewer, user.id)
            .await
            .map_err(db_error)?,
        None => false,
    };

    Ok(web::Json(json!({
        "user": user,
        "followers": follower_total,
        "following": following_total,
        "collections": collections,
        "is_following": is_following,
    })))
}

/// GET /user/{username}/photos - the member's photo stream
#[get("/user/{username}/photos")]
pub async fn member_photos(
    path: web::Path<String>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let user = lookup_member(&path).await?;
    let photos = photo::photos_by_author_page(
        get_db_pool(),
        user.id,
        page.index(),
        app_config::limits().photos_per_page,
    )
    .await
    .map_err(db_error)?;
    Ok(web::Json(json!({ "photos": photos })))
}

/// GET /user/{username}/collections - photos the member collected
///
/// Respects the owner's collection privacy flag.
#[get("/user/{username}/collections")]
pub async fn member_collections(
    client: ClientCtx,
    path: web::Path<String>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let user = lookup_member(&path).await?;

    if !user.public_collections && client.get_id() != Some(user.id) {
        return Err(error::ErrorForbidden("This user's collections are private"));
    }

    let photos = collect::collected_photos_page(
        get_db_pool(),
        user.id,
        page.index(),
        app_config::limits().photos_per_page,
    )
    .await
    .map_err(db_error)?;
    Ok(web::Json(json!({ "photos": photos })))
}

/// POST /user/{username}/follow
#[post("/user/{username}/follow")]
pub async fn follow_member(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let me = client.require_confirmed()?.clone();
    client.require_permission(Permission::FOLLOW)?;

    let target = lookup_member(&path).await?;
    if target.id == me.id {
        return Err(error::ErrorBadRequest("You cannot follow yourself"));
    }

    let db = get_db_pool();
    let txn = db.begin().await.map_err(db_error)?;
    let inserted = follow::follow(&txn, me.id, target.id)
        .await
        .map_err(db_error)?;
    // Repeat follows stay silent; the insert itself reports whether the
    // edge was new, so concurrent repeats cannot both notify.
    if inserted {
        crate::notifications::push_follow_notification(&txn, &me, &target)
            .await
            .map_err(db_error)?;
    }
    txn.commit().await.map_err(db_error)?;

    Ok(HttpResponse::Ok().finish())
}

/// POST /user/{username}/unfollow
#[post("/user/{username}/unfollow")]
pub async fn unfollow_member(
    client: ClientCtx,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let me_id = client.require_login()?;
    let target = lookup_member(&path).await?;

    if target.id == me_id {
        return Err(error::ErrorBadRequest("You cannot unfollow yourself"));
    }

    follow::unfollow(get_db_pool(), me_id, target.id)
        .await
        .map_err(db_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// GET /user/{username}/followers
#[get("/user/{username}/followers")]
pub async fn followers(
    path: web::Path<String>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let user = lookup_member(&path).await?;
    let users = follow::followers_page(
        get_db_pool(),
        user.id,
        page.index(),
        app_config::limits().users_per_page,
    )
    .await
    .map_err(db_error)?;
    Ok(web::Json(json!({ "users": users })))
}

/// GET /user/{username}/following
#[get("/user/{username}/following")]
pub async fn following(
    path: web::Path<String>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let user = lookup_member(&path).await?;
    let users = follow::following_page(
        get_db_pool(),
        user.id,
        page.index(),
        app_config::limits().users_per_page,
    )
    .await
    .map_err(db_error)?;
    Ok(web::Json(json!({ "users": users })))
}
