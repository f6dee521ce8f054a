mod common;

use common::Fixture;
use ricemill::AppError;
use ricemill::auth::{self, DEFAULT_ROLE};
use ricemill::db::Store;

#[test]
fn fresh_store_seeds_admin() {
    let mut fx = Fixture::new();
    let session = auth::login(fx.store.conn().unwrap(), "admin", "admin123").unwrap();
    assert_eq!(session.username, "admin");
    assert_eq!(session.role, "admin");
}

#[test]
fn reopened_store_keeps_users() {
    let mut fx = Fixture::new();
    let path = fx.store.path().to_path_buf();
    auth::register(fx.store.conn().unwrap(), "clerk", "pw").unwrap();
    drop(fx.store);

    let mut store = Store::open(&path).unwrap();
    let session = auth::login(store.conn().unwrap(), "clerk", "pw").unwrap();
    assert_eq!(session.role, DEFAULT_ROLE);
    assert!(matches!(
        auth::register(store.conn().unwrap(), "admin", "x"),
        Err(AppError::DuplicateUsername(_))
    ));
}

#[test]
fn register_then_login() {
    let mut fx = Fixture::new();
    let id = auth::register(fx.store.conn().unwrap(), "munshi", "ledger").unwrap();
    let session = auth::login(fx.store.conn().unwrap(), "munshi", "ledger").unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.role, "user");
}

#[test]
fn duplicate_username_surfaces_database_message() {
    let mut fx = Fixture::new();
    auth::register(fx.store.conn().unwrap(), "munshi", "ledger").unwrap();
    match auth::register(fx.store.conn().unwrap(), "munshi", "other") {
        Err(AppError::DuplicateUsername(message)) => assert!(message.contains("UNIQUE")),
        other => panic!("expected duplicate username, got {other:?}"),
    }
}

#[test]
fn wrong_password_and_unknown_user_fail_identically() {
    let mut fx = Fixture::new();
    let wrong_password = auth::login(fx.store.conn().unwrap(), "admin", "nope").unwrap_err();
    let unknown_user = auth::login(fx.store.conn().unwrap(), "ghost", "admin123").unwrap_err();
    assert!(matches!(wrong_password, AppError::InvalidCredentials));
    assert!(matches!(unknown_user, AppError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[test]
fn passwords_are_not_stored_in_plain_text() {
    let mut fx = Fixture::new();
    auth::register(fx.store.conn().unwrap(), "munshi", "ledger").unwrap();
    let user = ricemill::db::query_user_by_username(fx.store.conn().unwrap(), "munshi")
        .unwrap()
        .unwrap();
    assert_ne!(user.password, "ledger");
    assert!(user.password.starts_with("$argon2"));
}
