use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use diesel::SqliteConnection;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::db::{create_user, query_user_by_username};
use crate::error::{AppError, AppResult};
use crate::models::NewUser;

pub const DEFAULT_ROLE: &str = "user";
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_ROLE: &str = "admin";

/// What a successful login hands back to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: i32,
    pub username: String,
    pub role: String,
}

pub fn hash_password(plain: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AppError::failed(e)
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AppError::failed(e)
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Unknown users, wrong passwords and unreadable stored hashes all fail the
/// same way so callers cannot tell which usernames exist.
pub fn login(conn: &mut SqliteConnection, username: &str, password: &str) -> AppResult<Session> {
    let Some(user) = query_user_by_username(conn, username)? else {
        info!(username, "login rejected");
        return Err(AppError::InvalidCredentials);
    };
    let matches = verify_password(password, &user.password).unwrap_or_else(|err| {
        warn!(username, error = %err, "stored password hash unreadable");
        false
    });
    if !matches {
        info!(username, "login rejected");
        return Err(AppError::InvalidCredentials);
    }
    info!(user_id = user.id, username, "login accepted");
    Ok(Session {
        id: user.id,
        username: user.username,
        role: user.role,
    })
}

pub fn register(conn: &mut SqliteConnection, username: &str, password: &str) -> AppResult<i32> {
    register_with_role(conn, username, password, DEFAULT_ROLE)
}

fn register_with_role(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    role: &str,
) -> AppResult<i32> {
    let hash = hash_password(password)?;
    let new_user = NewUser {
        username,
        password: &hash,
        role,
    };
    match create_user(conn, &new_user) {
        Ok(user_id) => {
            info!(user_id, username, role, "user registered");
            Ok(user_id)
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
            Err(AppError::DuplicateUsername(info.message().to_string()))
        }
        Err(err) => Err(AppError::failed(err)),
    }
}

/// Bootstrap account for a freshly created store.
pub(crate) fn seed_admin(conn: &mut SqliteConnection) -> AppResult<()> {
    register_with_role(conn, ADMIN_USERNAME, ADMIN_PASSWORD, ADMIN_ROLE).map(|_| ())
}
