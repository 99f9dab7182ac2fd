/// Search across users, photos and tags.
use super::{db_error, PageQuery};
use crate::app_config;
use crate::db::get_db_pool;
use crate::search;
use crate::tag;
use actix_web::{error, get, web, Error, Responder};
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(search_results)
        .service(hot_tags)
        .service(photos_by_tag);
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    /// "users", "tags" or "photos" (the default).
    pub kind: Option<String>,
    pub page: Option<u64>,
}

/// GET /search?q=...&kind=... - substring search
#[get("/search")]
pub async fn search_results(query: web::Query<SearchQuery>) -> Result<impl Responder, Error> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(error::ErrorBadRequest("Empty search query"));
    }

    let db = get_db_pool();
    let per_page = app_config::limits().search_results_per_page;
    let page = PageQuery { page: query.page }.index();

    let results = match query.kind.as_deref().unwrap_or("photos") {
        "users" => json!({
            "users": search::search_users(db, q, page, per_page).await.map_err(db_error)?
        }),
        "tags" => json!({
            "tags": search::search_tags(db, q, page, per_page).await.map_err(db_error)?
        }),
        "photos" => json!({
            "photos": search::search_photos(db, q, page, per_page).await.map_err(db_error)?
        }),
        other => return Err(error::ErrorBadRequest(format!("Unknown kind: {}", other))),
    };

    Ok(web::Json(json!({ "query": q, "results": results })))
}

/// GET /tags/hot - tags ranked by photo count
#[get("/tags/hot")]
pub async fn hot_tags() -> Result<impl Responder, Error> {
    let tags = tag::hot_tags(get_db_pool(), 10).await.map_err(db_error)?;
    Ok(web::Json(json!({ "tags": tags })))
}

/// GET /tag/{id}/photos - photos carrying a tag, newest first
#[get("/tag/{id}/photos")]
pub async fn photos_by_tag(
    path: web::Path<i32>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let photos = crate::photo::photos_by_tag_page(
        db,
        *path,
        page.index(),
        app_config::limits().photos_per_page,
    )
    .await
    .map_err(db_error)?;
    Ok(web::Json(json!({ "photos": photos })))
}
