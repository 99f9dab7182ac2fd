//! Password hashing and cookie-session helpers.

use actix_session::Session;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use once_cell::sync::OnceCell;

/// Session key holding the logged-in user's id.
pub const USER_ID_KEY: &str = "uid";

static ARGON2: OnceCell<Argon2<'static>> = OnceCell::new();

pub fn get_argon2() -> &'static Argon2<'static> {
    ARGON2.get_or_init(Argon2::default)
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    get_argon2()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))
        .map(|hash| hash.to_string())
}

/// Returns false for both a mismatch and an unparseable stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => get_argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Store the user id in the session and rotate the session key.
pub fn remember_user(session: &Session, user_id: i32) {
    if session.insert(USER_ID_KEY, user_id).is_err() {
        log::error!("Failed to serialize user id {} into session", user_id);
    }
    session.renew();
}

pub fn forget_user(session: &Session) {
    session.purge();
}

pub fn session_user_id(session: &Session) -> Option<i32> {
    session.get::<i32>(USER_ID_KEY).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}
