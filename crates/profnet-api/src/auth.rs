use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use tracing::{info, warn};

use profnet_db::Database;
use profnet_types::User;
use profnet_types::api::{LoginRequest, RegisterRequest};

use crate::convert;
use crate::error::{FlowError, FlowResult};

const MAX_LOGIN_LEN: usize = 50;

pub fn register(db: &Database, req: &RegisterRequest) -> FlowResult<User> {
    let user_id = req.user_id.trim();

    // Validate input
    if user_id.is_empty() || user_id.chars().count() > MAX_LOGIN_LEN {
        return Err(FlowError::InvalidInput(format!(
            "login must be 1 to {} characters",
            MAX_LOGIN_LEN
        )));
    }
    if req.password.is_empty() {
        return Err(FlowError::InvalidInput("password must not be empty".into()));
    }
    if req.email.trim().is_empty() {
        return Err(FlowError::InvalidInput("email must not be empty".into()));
    }

    // Check if login is taken
    if db.user_exists(user_id)? {
        return Err(FlowError::UserExists(user_id.to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    db.create_user(user_id, &password_hash, req.email.trim())?;
    info!(user = user_id, "User registered");

    let row = db
        .get_user(user_id)?
        .ok_or_else(|| FlowError::UserNotFound(user_id.to_string()))?;
    Ok(convert::user(row))
}

/// Returns the authenticated user; an unknown login and a wrong password
/// are indistinguishable to the caller.
pub fn login(db: &Database, req: &LoginRequest) -> FlowResult<User> {
    let row = db
        .get_user(req.user_id.trim())?
        .ok_or(FlowError::InvalidCredentials)?;

    if !verify_password(&req.password, &row.password)? {
        warn!(user = %row.user_id, "Login rejected");
        return Err(FlowError::InvalidCredentials);
    }

    info!(user = %row.user_id, "User logged in");
    Ok(convert::user(row))
}

pub fn change_password(db: &Database, user_id: &str, new_password: &str) -> FlowResult<()> {
    if new_password.is_empty() {
        return Err(FlowError::InvalidInput("password must not be empty".into()));
    }
    let password_hash = hash_password(new_password)?;
    if db.update_password(user_id, &password_hash)? == 0 {
        return Err(FlowError::UserNotFound(user_id.to_string()));
    }
    info!(user = user_id, "Password changed");
    Ok(())
}

/// Hash password with Argon2id
fn hash_password(password: &str) -> FlowResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| FlowError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> FlowResult<bool> {
    let parsed_hash =
        PasswordHash::new(stored).map_err(|e| FlowError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_req(user_id: &str, password: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            user_id: user_id.into(),
            password: password.into(),
            email: email.into(),
        }
    }

    fn login_req(user_id: &str, password: &str) -> LoginRequest {
        LoginRequest {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    #[test]
    fn register_then_login() {
        let db = Database::open_in_memory().unwrap();
        let user = register(&db, &register_req("alice", "pw1", "a@x.com")).unwrap();
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.email, "a@x.com");

        let stored = db.get_user("alice").unwrap().unwrap();
        assert_ne!(stored.password, "pw1");

        assert_eq!(login(&db, &login_req("alice", "pw1")).unwrap().user_id, "alice");
        assert!(matches!(
            login(&db, &login_req("alice", "nope")),
            Err(FlowError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&db, &login_req("mallory", "pw1")),
            Err(FlowError::InvalidCredentials)
        ));
    }

    #[test]
    fn register_rejects_taken_and_empty_logins() {
        let db = Database::open_in_memory().unwrap();
        register(&db, &register_req("alice", "pw1", "a@x.com")).unwrap();

        assert!(matches!(
            register(&db, &register_req("alice", "pw2", "b@x.com")),
            Err(FlowError::UserExists(_))
        ));
        assert!(matches!(
            register(&db, &register_req("  ", "pw", "c@x.com")),
            Err(FlowError::InvalidInput(_))
        ));
        assert!(matches!(
            register(&db, &register_req("carol", "", "c@x.com")),
            Err(FlowError::InvalidInput(_))
        ));
    }

    #[test]
    fn changed_password_replaces_the_old_one() {
        let db = Database::open_in_memory().unwrap();
        register(&db, &register_req("alice", "pw1", "a@x.com")).unwrap();

        change_password(&db, "alice", "pw9").unwrap();
        assert!(login(&db, &login_req("alice", "pw1")).is_err());
        assert!(login(&db, &login_req("alice", "pw9")).is_ok());
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("same", &first).unwrap());
        assert!(verify_password("same", &second).unwrap());
        assert!(!verify_password("other", &first).unwrap());
    }
}
