/// Account registration.
use crate::account::{self, NewUser, RegisterError};
use crate::app_config;
use crate::db::get_db_pool;
use crate::email::templates::send_confirmation_email;
use crate::middleware::ClientCtx;
use crate::token::{self, Operation, SigningKey};
use actix_web::{error, post, web, Error, HttpResponse};
use sea_orm::TransactionTrait;
use serde::Deserialize;
use validator::{Validate, ValidationError};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(register).service(resend_confirmation);
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.is_empty() && username.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ValidationError::new("username_not_alphanumeric"))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(length(min = 1, max = 20), custom = "validate_username")]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 30))]
    pub name: String,
}

/// POST /auth/register - create an account and send the confirmation link
#[post("/auth/register")]
pub async fn register(
    form: web::Json<RegisterForm>,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    let form = form.into_inner();
    form.validate().map_err(error::ErrorBadRequest)?;

    let db = get_db_pool();
    let txn = db.begin().await.map_err(super::db_error)?;

    let user = account::register(
        &txn,
        NewUser {
            username: form.username,
            email: form.email,
            password: form.password,
            name: form.name,
        },
        &app_config::site().admin_email,
    )
    .await
    .map_err(|e| match e {
        RegisterError::UsernameTaken | RegisterError::EmailTaken => {
            error::ErrorConflict(e.to_string())
        }
        other => {
            log::error!("Registration failed: {}", other);
            error::ErrorInternalServerError("Failed to create account")
        }
    })?;

    txn.commit().await.map_err(super::db_error)?;

    log::info!("Registered user {} ({})", user.username, user.id);
    send_confirmation_link(&key, &user);

    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/resend-confirmation - mint a fresh confirmation link
#[post("/auth/resend-confirmation")]
pub async fn resend_confirmation(
    client: ClientCtx,
    key: web::Data<SigningKey>,
) -> Result<HttpResponse, Error> {
    let user = client
        .get_user()
        .ok_or_else(|| error::ErrorUnauthorized("Login required"))?;

    if user.confirmed {
        return Err(error::ErrorBadRequest("Account is already confirmed"));
    }

    send_confirmation_link(&key, user);
    Ok(HttpResponse::Ok().finish())
}

/// Delivery happens off the request path; failures are logged, not
/// surfaced, since the user can always ask for another link.
fn send_confirmation_link(key: &SigningKey, user: &crate::orm::users::Model) {
    let token = match token::generate(
        key.as_bytes(),
        user.id,
        Operation::Confirm,
        None,
        token::DEFAULT_TTL_SECS,
    ) {
        Ok(token) => token,
        Err(e) => {
            log::error!("Failed to mint confirmation token for {}: {}", user.id, e);
            return;
        }
    };

    let email = user.email.clone();
    let username = user.username.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) =
            send_confirmation_email(&email, &username, &token, &app_config::site().base_url).await
        {
            log::error!("Failed to send confirmation email to {}: {}", email, e);
        }
    });
}
