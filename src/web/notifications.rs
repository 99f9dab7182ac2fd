/// Notification inbox.
use super::{db_error, PageQuery};
use crate::app_config;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::notifications;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(inbox)
        .service(unread_count)
        .service(mark_read)
        .service(mark_all_read);
}

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub page: Option<u64>,
    /// "unread" narrows to unread notifications; anything else shows all.
    pub filter: Option<String>,
}

/// GET /notifications - the user's inbox, newest first
#[get("/notifications")]
pub async fn inbox(client: ClientCtx, query: web::Query<InboxQuery>) -> Result<impl Responder, Error> {
    let me_id = client.require_login()?;
    let db = get_db_pool();

    let unread_only = query.filter.as_deref() == Some("unread");
    let page = PageQuery { page: query.page }.index();

    let rows = notifications::inbox_page(
        db,
        me_id,
        unread_only,
        page,
        app_config::limits().notifications_per_page,
    )
    .await
    .map_err(db_error)?;

    Ok(web::Json(json!({
        "notifications": rows,
        "unread": notifications::count_unread(db, me_id).await.map_err(db_error)?,
    })))
}

/// GET /notifications/count - unread badge count
#[get("/notifications/count")]
pub async fn unread_count(client: ClientCtx) -> Result<impl Responder, Error> {
    let me_id = client.require_login()?;
    let count = notifications::count_unread(get_db_pool(), me_id)
        .await
        .map_err(db_error)?;
    Ok(web::Json(json!({ "unread": count })))
}

/// POST /notifications/{id}/read
#[post("/notifications/{id}/read")]
pub async fn mark_read(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let me_id = client.require_login()?;
    notifications::mark_read(get_db_pool(), *path, me_id)
        .await
        .map_err(db_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// POST /notifications/read-all
#[post("/notifications/read-all")]
pub async fn mark_all_read(client: ClientCtx) -> Result<HttpResponse, Error> {
    let me_id = client.require_login()?;
    notifications::mark_all_read(get_db_pool(), me_id)
        .await
        .map_err(db_error)?;
    Ok(HttpResponse::Ok().finish())
}
