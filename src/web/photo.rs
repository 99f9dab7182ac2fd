/// Photo upload, display, moderation and the collect graph.
use super::{db_error, PageQuery};
use crate::app_config;
use crate::collect;
use crate::db::get_db_pool;
use crate::filesystem::{self, SavedPhoto};
use crate::middleware::ClientCtx;
use crate::permission::Permission;
use crate::photo;
use crate::tag;
use actix_multipart::Multipart;
use actix_web::{delete, error, get, post, web, Error, HttpResponse, Responder};
use futures_util::StreamExt;
use sea_orm::{entity::*, TransactionTrait};
use serde::Deserialize;
use serde_json::json;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(upload)
        .service(show)
        .service(serve_upload)
        .service(delete_photo)
        .service(update_description)
        .service(add_tags)
        .service(remove_tag)
        .service(collect_photo)
        .service(uncollect_photo)
        .service(collectors)
        .service(report)
        .service(set_comment_setting);
}

async fn lookup_photo(photo_id: i32) -> Result<crate::orm::photos::Model, Error> {
    photo::get_photo(get_db_pool(), photo_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error::ErrorNotFound("No such photo"))
}

fn saved_files(p: &crate::orm::photos::Model) -> SavedPhoto {
    SavedPhoto {
        filename: p.filename.clone(),
        filename_s: p.filename_s.clone(),
        filename_m: p.filename_m.clone(),
    }
}

/// POST /photo - multipart upload with an optional description field
#[post("/photo")]
pub async fn upload(client: ClientCtx, mut payload: Multipart) -> Result<HttpResponse, Error> {
    let me = client.require_confirmed()?.clone();
    client.require_permission(Permission::UPLOAD)?;

    let max_bytes = app_config::uploads().max_upload_size_mb as usize * 1024 * 1024;
    let mut file_bytes: Vec<u8> = Vec::new();
    let mut original_name = String::new();
    let mut description: Option<String> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(error::ErrorBadRequest)?;
        match field.name() {
            "file" => {
                original_name = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or_default()
                    .to_owned();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(error::ErrorBadRequest)?;
                    if file_bytes.len() + chunk.len() > max_bytes {
                        return Err(error::ErrorPayloadTooLarge("Upload exceeds size limit"));
                    }
                    file_bytes.extend_from_slice(&chunk);
                }
            }
            "description" => {
                let mut text = Vec::new();
                while let Some(chunk) = field.next().await {
                    text.extend_from_slice(&chunk.map_err(error::ErrorBadRequest)?);
                }
                let text = String::from_utf8(text)
                    .map_err(|_| error::ErrorBadRequest("Description must be UTF-8"))?;
                if text.chars().count() > 500 {
                    return Err(error::ErrorBadRequest("Description is too long"));
                }
                if !text.is_empty() {
                    description = Some(text);
                }
            }
            _ => {}
        }
    }

    if file_bytes.is_empty() {
        return Err(error::ErrorBadRequest("No file uploaded"));
    }

    let saved = filesystem::save_photo(file_bytes, &original_name)
        .await
        .map_err(error::ErrorBadRequest)?;

    let created = photo::create_photo(get_db_pool(), me.id, description, &saved).await;
    match created {
        Ok(created) => {
            log::info!("User {} uploaded photo {}", me.id, created.id);
            Ok(HttpResponse::Created().json(created))
        }
        Err(e) => {
            // Roll the files back so a failed insert leaves no orphans.
            if let Err(fe) = filesystem::delete_photo_files(saved).await {
                log::warn!("Failed to clean up files after insert error: {}", fe);
            }
            Err(db_error(e))
        }
    }
}

/// GET /photo/{id} - photo with tags, collect count and stream neighbors
#[get("/photo/{id}")]
pub async fn show(client: ClientCtx, path: web::Path<i32>) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let photo_row = lookup_photo(*path).await?;

    let tags = tag::tags_of_photo(db, photo_row.id).await.map_err(db_error)?;
    let collector_total = collect::collector_count(db, photo_row.id)
        .await
        .map_err(db_error)?;
    let is_collecting = match client.get_id() {
        Some(viewer) => collect::is_collecting(db, viewer, photo_row.id)
            .await
            .map_err(db_error)?,
        None => false,
    };
    let next = photo::next_in_stream(db, &photo_row).await.map_err(db_error)?;
    let prev = photo::prev_in_stream(db, &photo_row).await.map_err(db_error)?;

    Ok(web::Json(json!({
        "photo": photo_row,
        "tags": tags,
        "collectors": collector_total,
        "is_collecting": is_collecting,
        "next_id": next.map(|p| p.id),
        "prev_id": prev.map(|p| p.id),
    })))
}

/// GET /uploads/{filename} - serve a stored photo file
#[get("/uploads/{filename}")]
pub async fn serve_upload(path: web::Path<String>) -> Result<HttpResponse, Error> {
    let filename = path.into_inner();
    // Uploaded names are uuid stems; anything else is not ours to serve.
    if filename.contains('/') || filename.contains("..") {
        return Err(error::ErrorNotFound("No such file"));
    }

    let full_path = filesystem::upload_path(&filename);
    let bytes = web::block(move || std::fs::read(full_path))
        .await
        .map_err(|e| error::ErrorInternalServerError(e.to_string()))?
        .map_err(|_| error::ErrorNotFound("No such file"))?;

    Ok(HttpResponse::Ok()
        .content_type(filesystem::get_mime_type(&filename))
        .body(bytes))
}

/// DELETE /photo/{id} - owner or moderator
#[delete("/photo/{id}")]
pub async fn delete_photo(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let photo_row = lookup_photo(*path).await?;

    if !client.can_modify(photo_row.author_id, Permission::MODERATE) {
        return Err(error::ErrorForbidden("You cannot delete this photo"));
    }

    let db = get_db_pool();
    let files = saved_files(&photo_row);
    let txn = db.begin().await.map_err(db_error)?;
    photo::delete_photo(&txn, photo_row.id).await.map_err(db_error)?;
    txn.commit().await.map_err(db_error)?;

    if let Err(e) = filesystem::delete_photo_files(files).await {
        log::warn!("Leftover files after deleting photo {}: {}", photo_row.id, e);
    }

    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct DescriptionForm {
    pub description: Option<String>,
}

/// POST /photo/{id}/description - owner or moderator
#[post("/photo/{id}/description")]
pub async fn update_description(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<DescriptionForm>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let photo_row = lookup_photo(*path).await?;

    if !client.can_modify(photo_row.author_id, Permission::MODERATE) {
        return Err(error::ErrorForbidden("You cannot edit this photo"));
    }
    if let Some(text) = &form.description {
        if text.chars().count() > 500 {
            return Err(error::ErrorBadRequest("Description is too long"));
        }
    }

    let mut active: crate::orm::photos::ActiveModel = photo_row.into();
    active.description = Set(form.into_inner().description);
    let updated = active.update(get_db_pool()).await.map_err(db_error)?;

    Ok(HttpResponse::Ok().json(updated))
}

#[derive(Debug, Deserialize)]
pub struct TagsForm {
    /// Whitespace-separated tag names.
    pub tags: String,
}

/// POST /photo/{id}/tags - attach tags, creating them as needed
#[post("/photo/{id}/tags")]
pub async fn add_tags(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<TagsForm>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let photo_row = lookup_photo(*path).await?;

    if !client.can_modify(photo_row.author_id, Permission::MODERATE) {
        return Err(error::ErrorForbidden("You cannot tag this photo"));
    }

    let names = tag::parse_tag_names(&form.tags);
    if names.is_empty() {
        return Err(error::ErrorBadRequest("No tags given"));
    }

    let db = get_db_pool();
    let txn = db.begin().await.map_err(db_error)?;
    for name in names {
        if name.chars().count() > 64 {
            return Err(error::ErrorBadRequest("Tag name is too long"));
        }
        let tag_row = tag::get_or_create(&txn, &name).await.map_err(db_error)?;
        tag::attach(&txn, photo_row.id, tag_row.id)
            .await
            .map_err(db_error)?;
    }
    txn.commit().await.map_err(db_error)?;

    let tags = tag::tags_of_photo(db, photo_row.id).await.map_err(db_error)?;
    Ok(HttpResponse::Ok().json(json!({ "tags": tags })))
}

/// DELETE /photo/{id}/tags/{tag_id} - detach a tag
#[delete("/photo/{id}/tags/{tag_id}")]
pub async fn remove_tag(
    client: ClientCtx,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse, Error> {
    let (photo_id, tag_id) = path.into_inner();
    client.require_login()?;
    let photo_row = lookup_photo(photo_id).await?;

    if !client.can_modify(photo_row.author_id, Permission::MODERATE) {
        return Err(error::ErrorForbidden("You cannot edit this photo"));
    }

    let db = get_db_pool();
    let txn = db.begin().await.map_err(db_error)?;
    tag::detach(&txn, photo_id, tag_id).await.map_err(db_error)?;
    txn.commit().await.map_err(db_error)?;

    Ok(HttpResponse::Ok().finish())
}

/// POST /photo/{id}/collect
#[post("/photo/{id}/collect")]
pub async fn collect_photo(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    let me = client.require_confirmed()?.clone();
    client.require_permission(Permission::COLLECT)?;

    let photo_row = lookup_photo(*path).await?;
    let db = get_db_pool();

    let author = crate::account::get_user(db, photo_row.author_id)
        .await
        .map_err(db_error)?;

    let txn = db.begin().await.map_err(db_error)?;
    let inserted = collect::collect(&txn, me.id, photo_row.id)
        .await
        .map_err(db_error)?;
    // Repeat collects stay silent, keyed off the insert result.
    if inserted {
        if let Some(author) = &author {
            crate::notifications::push_collect_notification(&txn, &me, photo_row.id, author)
                .await
                .map_err(db_error)?;
        }
    }
    txn.commit().await.map_err(db_error)?;

    Ok(HttpResponse::Ok().finish())
}

/// POST /photo/{id}/uncollect
#[post("/photo/{id}/uncollect")]
pub async fn uncollect_photo(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let me_id = client.require_login()?;
    let photo_row = lookup_photo(*path).await?;

    collect::uncollect(get_db_pool(), me_id, photo_row.id)
        .await
        .map_err(db_error)?;
    Ok(HttpResponse::Ok().finish())
}

/// GET /photo/{id}/collectors
#[get("/photo/{id}/collectors")]
pub async fn collectors(
    path: web::Path<i32>,
    page: web::Query<PageQuery>,
) -> Result<impl Responder, Error> {
    let photo_row = lookup_photo(*path).await?;
    let users = collect::collectors_page(
        get_db_pool(),
        photo_row.id,
        page.index(),
        app_config::limits().users_per_page,
    )
    .await
    .map_err(db_error)?;
    Ok(web::Json(json!({ "users": users })))
}

/// POST /photo/{id}/report - flag for moderator attention
#[post("/photo/{id}/report")]
pub async fn report(client: ClientCtx, path: web::Path<i32>) -> Result<HttpResponse, Error> {
    client.require_confirmed()?;
    let photo_row = lookup_photo(*path).await?;

    photo::report_photo(get_db_pool(), photo_row.id)
        .await
        .map_err(db_error)?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct CommentSettingForm {
    pub can_comment: bool,
}

/// POST /photo/{id}/comment-setting - open or close the comment section
#[post("/photo/{id}/comment-setting")]
pub async fn set_comment_setting(
    client: ClientCtx,
    path: web::Path<i32>,
    form: web::Json<CommentSettingForm>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let photo_row = lookup_photo(*path).await?;

    if !client.can_modify(photo_row.author_id, Permission::MODERATE) {
        return Err(error::ErrorForbidden("You cannot change this setting"));
    }

    let mut active: crate::orm::photos::ActiveModel = photo_row.into();
    active.can_comment = Set(form.can_comment);
    let updated = active.update(get_db_pool()).await.map_err(db_error)?;

    Ok(HttpResponse::Ok().json(updated))
}
