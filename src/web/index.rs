/// Home feed and explore pages.
use super::{db_error, PageQuery};
use crate::app_config;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::photo;
use actix_web::{get, web, Error, Responder};
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(home).service(explore);
}

/// GET / - photos from followed accounts for users, a random sample for guests
#[get("/")]
pub async fn home(client: ClientCtx, page: web::Query<PageQuery>) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let per_page = app_config::limits().photos_per_page;

    let photos = match client.get_id() {
        Some(user_id) => photo::home_feed_page(db, user_id, page.index(), per_page)
            .await
            .map_err(db_error)?,
        None => photo::explore_random(db, per_page).await.map_err(db_error)?,
    };

    Ok(web::Json(json!({
        "photos": photos,
        "page": page.page.unwrap_or(1),
    })))
}

/// GET /explore - random photos
#[get("/explore")]
pub async fn explore(_client: ClientCtx) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let photos = photo::explore_random(db, app_config::limits().photos_per_page)
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "photos": photos })))
}
