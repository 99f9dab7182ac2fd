/// Account confirmation and settings.
use crate::account;
use crate::app_config;
use crate::db::get_db_pool;
use crate::email::templates::send_change_email_email;
use crate::filesystem;
use crate::middleware::ClientCtx;
use crate::session;
use crate::token::{self, Operation, SigningKey};
use actix_session::Session;
use actix_web::{error, get, post, web, Error, HttpResponse};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(confirm)
        .service(update_profile)
        .service(change_password)
        .service(update_notification_settings)
        .service(update_privacy_settings)
        .service(request_email_change)
        .service(confirm_email_change)
        .service(delete_account);
}

/// GET /auth/confirm/{token} - confirm the account from an emailed link
#[get("/auth/confirm/{token}")]
pub async fn confirm(
    path: web::Path<String>,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    let claims = token::verify(key.as_bytes(), &path, Operation::Confirm)
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;

    let db = get_db_pool();
    let user = account::get_user(db, claims.id)
        .await
        .map_err(super::db_error)?
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;

    let user = account::confirm(db, user).await.map_err(super::db_error)?;
    log::info!("User {} confirmed their account", user.id);
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 30))]
    pub name: String,
    #[validate(length(max = 255), url)]
    pub website: Option<String>,
    #[validate(length(max = 120))]
    pub bio: Option<String>,
    #[validate(length(max = 50))]
    pub location: Option<String>,
}

/// POST /settings/profile - update display name and profile fields
#[post("/settings/profile")]
pub async fn update_profile(
    client: ClientCtx,
    form: web::Json<ProfileForm>,
) -> Result<HttpResponse, Error> {
    let user = client.require_user()?.clone();
    let form = form.into_inner();
    form.validate().map_err(error::ErrorBadRequest)?;
    let db = get_db_pool();

    use sea_orm::entity::*;
    let mut active: crate::orm::users::ActiveModel = user.into();
    active.name = Set(form.name);
    active.website = Set(form.website);
    active.bio = Set(form.bio);
    active.location = Set(form.location);
    let user = active.update(db).await.map_err(super::db_error)?;

    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordForm {
    pub old_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// POST /settings/password - change the password, old one required
#[post("/settings/password")]
pub async fn change_password(
    client: ClientCtx,
    form: web::Json<PasswordForm>,
) -> Result<HttpResponse, Error> {
    let user = client.require_user()?.clone();
    form.validate().map_err(error::ErrorBadRequest)?;

    if !session::verify_password(&form.old_password, &user.password_hash) {
        return Err(error::ErrorForbidden("Current password is incorrect"));
    }

    let db = get_db_pool();
    account::set_password(db, user, &form.new_password)
        .await
        .map_err(super::db_error)?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize)]
pub struct NotificationSettingsForm {
    pub receive_comment_notification: bool,
    pub receive_follow_notification: bool,
    pub receive_collect_notification: bool,
}

/// POST /settings/notifications - toggle notification preference flags
#[post("/settings/notifications")]
pub async fn update_notification_settings(
    client: ClientCtx,
    form: web::Json<NotificationSettingsForm>,
) -> Result<HttpResponse, Error> {
    let user = client.require_user()?.clone();
    let db = get_db_pool();

    use sea_orm::entity::*;
    let mut active: crate::orm::users::ActiveModel = user.into();
    active.receive_comment_notification = Set(form.receive_comment_notification);
    active.receive_follow_notification = Set(form.receive_follow_notification);
    active.receive_collect_notification = Set(form.receive_collect_notification);
    let user = active.update(db).await.map_err(super::db_error)?;

    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize)]
pub struct PrivacySettingsForm {
    pub public_collections: bool,
}

/// POST /settings/privacy - toggle collection visibility
#[post("/settings/privacy")]
pub async fn update_privacy_settings(
    client: ClientCtx,
    form: web::Json<PrivacySettingsForm>,
) -> Result<HttpResponse, Error> {
    let user = client.require_user()?.clone();
    let db = get_db_pool();

    use sea_orm::entity::*;
    let mut active: crate::orm::users::ActiveModel = user.into();
    active.public_collections = Set(form.public_collections);
    let user = active.update(db).await.map_err(super::db_error)?;

    Ok(HttpResponse::Ok().json(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailChangeForm {
    pub password: String,
    #[validate(email)]
    pub new_email: String,
}

/// POST /settings/email - send a confirmation link to the new address
#[post("/settings/email")]
pub async fn request_email_change(
    client: ClientCtx,
    form: web::Json<EmailChangeForm>,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    let user = client.require_user()?.clone();
    form.validate().map_err(error::ErrorBadRequest)?;

    if !session::verify_password(&form.password, &user.password_hash) {
        return Err(error::ErrorForbidden("Password is incorrect"));
    }

    let new_email = form.new_email.trim().to_lowercase();
    let token = token::generate(
        key.as_bytes(),
        user.id,
        Operation::ChangeEmail,
        Some(new_email.clone()),
        token::DEFAULT_TTL_SECS,
    )
    .map_err(|e| {
        log::error!("Failed to mint email-change token for {}: {}", user.id, e);
        error::ErrorInternalServerError("Failed to start email change")
    })?;

    actix_web::rt::spawn(async move {
        if let Err(e) = send_change_email_email(
            &new_email,
            &user.username,
            &token,
            &app_config::site().base_url,
        )
        .await
        {
            log::error!("Failed to send email-change mail to {}: {}", new_email, e);
        }
    });

    Ok(HttpResponse::Ok().finish())
}

/// GET /auth/change-email/{token} - apply the email change from the link
#[get("/auth/change-email/{token}")]
pub async fn confirm_email_change(
    path: web::Path<String>,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    let claims = token::verify(key.as_bytes(), &path, Operation::ChangeEmail)
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;
    let new_email = claims
        .new_email
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;

    let db = get_db_pool();
    let user = account::get_user(db, claims.id)
        .await
        .map_err(super::db_error)?
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;

    match account::change_email(db, user, &new_email)
        .await
        .map_err(super::db_error)?
    {
        Some(user) => {
            log::info!("User {} changed their email", user.id);
            Ok(HttpResponse::Ok().json(user))
        }
        None => Err(error::ErrorConflict("Email is already registered")),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountForm {
    pub password: String,
}

/// POST /settings/delete - delete the account and its content
#[post("/settings/delete")]
pub async fn delete_account(
    session: Session,
    client: ClientCtx,
    form: web::Json<DeleteAccountForm>,
) -> Result<HttpResponse, Error> {
    let user = client.require_user()?.clone();

    if !session::verify_password(&form.password, &user.password_hash) {
        return Err(error::ErrorForbidden("Password is incorrect"));
    }

    let db = get_db_pool();
    let txn = db.begin().await.map_err(super::db_error)?;
    let files = account::delete_user(&txn, user.id)
        .await
        .map_err(super::db_error)?;
    txn.commit().await.map_err(super::db_error)?;

    // Files go after the commit; a leftover file is better than a photo
    // row pointing at nothing.
    for photo in files {
        if let Err(e) = filesystem::delete_photo_files(photo).await {
            log::warn!("Leftover photo files after account deletion: {}", e);
        }
    }

    session::forget_user(&session);
    log::info!("User {} deleted their account", user.id);
    Ok(HttpResponse::Ok().finish())
}
