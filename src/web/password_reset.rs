/// Password reset flow.
use crate::account;
use crate::app_config;
use crate::db::get_db_pool;
use crate::email::templates::send_password_reset_email;
use crate::token::{self, Operation, SigningKey};
use actix_web::{error, post, web, Error, HttpResponse};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(forgot_password).service(reset_password);
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[validate(email)]
    pub email: String,
}

/// POST /auth/forgot-password - email a reset link
///
/// Responds 200 whether or not the address is registered, so the endpoint
/// cannot be used to enumerate accounts.
#[post("/auth/forgot-password")]
pub async fn forgot_password(
    form: web::Json<ForgotPasswordForm>,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    form.validate().map_err(error::ErrorBadRequest)?;

    let db = get_db_pool();
    if let Some(user) = account::get_user_by_email(db, &form.email)
        .await
        .map_err(super::db_error)?
    {
        match token::generate(
            key.as_bytes(),
            user.id,
            Operation::ResetPassword,
            None,
            token::DEFAULT_TTL_SECS,
        ) {
            Ok(token) => {
                actix_web::rt::spawn(async move {
                    if let Err(e) = send_password_reset_email(
                        &user.email,
                        &user.username,
                        &token,
                        &app_config::site().base_url,
                    )
                    .await
                    {
                        log::error!("Failed to send reset email to {}: {}", user.email, e);
                    }
                });
            }
            Err(e) => log::error!("Failed to mint reset token for {}: {}", user.id, e),
        }
    }

    Ok(HttpResponse::Ok().finish())
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// POST /auth/reset-password/{token} - set a new password from the link
#[post("/auth/reset-password/{token}")]
pub async fn reset_password(
    path: web::Path<String>,
    form: web::Json<ResetPasswordForm>,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    form.validate().map_err(error::ErrorBadRequest)?;

    let claims = token::verify(key.as_bytes(), &path, Operation::ResetPassword)
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;

    let db = get_db_pool();
    let user = account::get_user(db, claims.id)
        .await
        .map_err(super::db_error)?
        .ok_or_else(|| error::ErrorBadRequest("Invalid or expired token"))?;

    account::set_password(db, user, &form.password)
        .await
        .map_err(super::db_error)?;

    log::info!("Password reset completed for user {}", claims.id);
    Ok(HttpResponse::Ok().finish())
}
