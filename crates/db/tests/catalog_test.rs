//! Integration tests for catalog, ledger queries, and sessions.
//!
//! These tests need a running Postgres instance; they connect to
//! `DATABASE_URL` (or `BIBLIO__DATABASE__URL`) and skip when neither is set.

#![allow(clippy::uninlined_format_args)]

use std::env;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use biblio_core::catalog::BookDraft;
use biblio_db::entities::sea_orm_active_enums::{LendingState, TransactionKind, UserRole};
use biblio_db::migration::Migrator;
use biblio_db::repositories::book::CatalogError;
use biblio_db::{
    BookRepository, CirculationRepository, LedgerRepository, SessionRepository, UserRepository,
};

fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("BIBLIO__DATABASE__URL"))
        .ok()
}

async fn test_db() -> Option<DatabaseConnection> {
    let url = database_url()?;
    let db = biblio_db::connect(&url).await.expect("connect failed");
    Migrator::up(&db, None).await.expect("migration failed");
    Some(db)
}

#[tokio::test]
async fn register_book_with_defaults() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let books = BookRepository::new(db.clone());
    let draft = BookDraft::new(&format!("Dune {}", Uuid::new_v4()), "Herbert", None, None).unwrap();
    let book = books.create(&draft).await.unwrap();

    assert_eq!(book.lending_state, LendingState::Available);
    assert_eq!(book.pages, 0);
    assert_eq!(book.price, Decimal::ZERO);

    let listed = books.list().await.unwrap();
    assert!(listed.iter().any(|b| b.id == book.id));
}

#[tokio::test]
async fn list_orders_newest_first() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let books = BookRepository::new(db.clone());

    let first = books
        .create(&BookDraft::new(&format!("Older {}", Uuid::new_v4()), "A", None, None).unwrap())
        .await
        .unwrap();
    let second = books
        .create(&BookDraft::new(&format!("Newer {}", Uuid::new_v4()), "B", None, None).unwrap())
        .await
        .unwrap();

    let listed = books.list().await.unwrap();
    let pos_first = listed.iter().position(|b| b.id == first.id).unwrap();
    let pos_second = listed.iter().position(|b| b.id == second.id).unwrap();
    assert!(pos_second < pos_first, "newer book listed before older");
}

#[tokio::test]
async fn delete_cascades_to_ledger() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let users = UserRepository::new(db.clone());
    let books = BookRepository::new(db.clone());
    let circulation = CirculationRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    let user = users
        .create(
            &format!("reader-{}", Uuid::new_v4()),
            "$argon2id$v=19$m=65536,t=3,p=4$test_hash",
            UserRole::Teacher,
        )
        .await
        .unwrap();
    let book = books
        .create(&BookDraft::new(&format!("Dune {}", Uuid::new_v4()), "Herbert", None, None).unwrap())
        .await
        .unwrap();

    circulation.issue(book.id, user.id).await.unwrap();
    circulation.return_book(book.id, user.id).await.unwrap();
    assert_eq!(ledger.list_for_user(user.id).await.unwrap().len(), 2);

    books.delete(book.id).await.unwrap();

    // The book and its whole history are gone; the user survives
    assert!(books.find_by_id(book.id).await.unwrap().is_none());
    assert!(ledger.list_for_user(user.id).await.unwrap().is_empty());
    assert!(users.find_by_id(user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_unknown_book_reports_not_found() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let books = BookRepository::new(db.clone());
    let missing = Uuid::new_v4();
    let err = books.delete(missing).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(id) if id == missing));
}

#[tokio::test]
async fn admin_ledger_view_enriches_book_and_user() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let users = UserRepository::new(db.clone());
    let books = BookRepository::new(db.clone());
    let circulation = CirculationRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    let username = format!("reader-{}", Uuid::new_v4());
    let user = users
        .create(&username, "$argon2id$v=19$m=65536,t=3,p=4$test_hash", UserRole::Student)
        .await
        .unwrap();
    let title = format!("Dune {}", Uuid::new_v4());
    let book = books
        .create(&BookDraft::new(&title, "Herbert", Some(412), Some(dec!(9.99))).unwrap())
        .await
        .unwrap();

    circulation.issue(book.id, user.id).await.unwrap();

    let all = ledger.list_all().await.unwrap();
    let entry = all.iter().find(|e| e.book_id == book.id).unwrap();
    assert_eq!(entry.kind, TransactionKind::Issued);
    assert_eq!(entry.book_name.as_deref(), Some(title.as_str()));
    assert_eq!(entry.book_author.as_deref(), Some("Herbert"));
    assert_eq!(entry.username.as_deref(), Some(username.as_str()));
}

#[tokio::test]
async fn username_uniqueness_enforced() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let users = UserRepository::new(db.clone());
    let username = format!("reader-{}", Uuid::new_v4());

    assert!(!users.username_exists(&username).await.unwrap());
    users
        .create(&username, "$argon2id$v=19$m=65536,t=3,p=4$test_hash", UserRole::Student)
        .await
        .unwrap();
    assert!(users.username_exists(&username).await.unwrap());

    // A second insert with the same username violates the unique constraint
    let duplicate = users
        .create(&username, "$argon2id$v=19$m=65536,t=3,p=4$test_hash", UserRole::Student)
        .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn session_lifecycle() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let users = UserRepository::new(db.clone());
    let sessions = SessionRepository::new(db.clone());

    let user = users
        .create(
            &format!("reader-{}", Uuid::new_v4()),
            "$argon2id$v=19$m=65536,t=3,p=4$test_hash",
            UserRole::Student,
        )
        .await
        .unwrap();

    let token = format!("opaque-token-{}", Uuid::new_v4());
    sessions
        .create(user.id, &token, Utc::now() + Duration::hours(3))
        .await
        .unwrap();

    let live = sessions.find_live(&token).await.unwrap();
    assert!(live.is_some());
    assert_eq!(live.unwrap().user_id, user.id);

    sessions.revoke(&token).await.unwrap();
    assert!(sessions.find_live(&token).await.unwrap().is_none());

    // Revoking again is a no-op
    sessions.revoke(&token).await.unwrap();

    // An expired session is not live
    let expired = format!("expired-token-{}", Uuid::new_v4());
    sessions
        .create(user.id, &expired, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();
    assert!(sessions.find_live(&expired).await.unwrap().is_none());
}
