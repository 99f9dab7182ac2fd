use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use fstop::db::{get_db_pool, init_db};
use fstop::middleware::ClientCtx;
use fstop::token::SigningKey;
use rand::{distributions::Alphanumeric, Rng};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    init_our_mods();
    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    fstop::db::create_schema(get_db_pool())
        .await
        .expect("Failed to apply database schema.");

    // Sync the role catalogue so permission changes ship with the binary.
    fstop::permission::init_roles(get_db_pool())
        .await
        .expect("Failed to seed roles.");

    let secret = match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= 64 => key,
        other => {
            let random_string: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(128)
                .map(char::from)
                .collect();
            log::warn!(
                "SECRET_KEY was missing or too short ({:?}). Sessions and emailed \
                 tokens will invalidate on every restart. A secret key must be at \
                 least 64 bytes.\r\nNeed a key? How about:\r\n{}",
                other.map(|k| k.len()),
                random_string
            );
            random_string
        }
    };
    let cookie_key = Key::from(secret.as_bytes());
    let signing_key = SigningKey::new(secret.into_bytes());

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(signing_key.clone()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), cookie_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(false) // Allow HTTP for development
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %{User-Agent}i"))
            .configure(fstop::web::configure)
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
pub fn init_lib_mods() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

/// Initialize all local mods.
pub fn init_our_mods() {
    fstop::app_config::init();
}
