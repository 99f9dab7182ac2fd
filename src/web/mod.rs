pub mod account;
pub mod admin;
pub mod comment;
pub mod index;
pub mod login;
pub mod member;
pub mod notifications;
pub mod password_reset;
pub mod photo;
pub mod register;
pub mod search;

use serde::Deserialize;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    account::configure(conf);
    admin::configure(conf);
    comment::configure(conf);
    login::configure(conf);
    member::configure(conf);
    notifications::configure(conf);
    password_reset::configure(conf);
    photo::configure(conf);
    register::configure(conf);
    search::configure(conf);
}

/// Common `?page=` query parameter. Pages are 1-based on the wire.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

impl PageQuery {
    /// Zero-based page index for the paginator.
    pub fn index(&self) -> u64 {
        self.page.unwrap_or(1).saturating_sub(1)
    }
}

/// Log a database error and hide it behind a 500.
pub(crate) fn db_error(e: sea_orm::DbErr) -> actix_web::Error {
    log::error!("Database error: {}", e);
    actix_web::error::ErrorInternalServerError("Internal server error")
}
