/// Login and logout.
use crate::account;
use crate::db::get_db_pool;
use crate::middleware::ClientCtx;
use crate::session;
use actix_session::Session;
use actix_web::{error, post, web, Error, HttpResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(login).service(logout);
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Username or email address.
    pub login: String,
    pub password: String,
}

/// POST /auth/login - authenticate and open a session
#[post("/auth/login")]
pub async fn login(session: Session, form: web::Json<LoginForm>) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let login = form.login.trim();

    let user = if login.contains('@') {
        account::get_user_by_email(db, login).await
    } else {
        account::get_user_by_username(db, login).await
    }
    .map_err(super::db_error)?;

    let user = match user {
        Some(user) => user,
        None => return Err(error::ErrorUnauthorized("Invalid credentials")),
    };

    if !session::verify_password(&form.password, &user.password_hash) {
        return Err(error::ErrorUnauthorized("Invalid credentials"));
    }

    // Credential check first so a blocked probe cannot enumerate accounts.
    if !user.active {
        return Err(error::ErrorForbidden("Account is blocked"));
    }

    session::remember_user(&session, user.id);
    log::info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(user))
}

/// POST /auth/logout - close the session
#[post("/auth/logout")]
pub async fn logout(session: Session, _client: ClientCtx) -> HttpResponse {
    session::forget_user(&session);
    HttpResponse::Ok().finish()
}
