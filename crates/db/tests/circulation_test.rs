//! Integration tests for the circulation repository.
//!
//! These tests need a running Postgres instance; they connect to
//! `DATABASE_URL` (or `BIBLIO__DATABASE__URL`) and skip when neither is set.

#![allow(clippy::uninlined_format_args)]

use std::env;
use std::sync::Arc;

use biblio_core::lending::LendingError;
use futures::future::join_all;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::sync::Barrier;
use uuid::Uuid;

use biblio_core::catalog::BookDraft;
use biblio_db::entities::sea_orm_active_enums::{LendingState, TransactionKind, UserRole};
use biblio_db::migration::Migrator;
use biblio_db::repositories::circulation::CirculationError;
use biblio_db::{BookRepository, CirculationRepository, LedgerRepository, UserRepository};

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

async fn seed_user(db: &DatabaseConnection) -> Uuid {
    let users = UserRepository::new(db.clone());
    let user = users
        .create(
            &format!("reader-{}", Uuid::new_v4()),
            "$argon2id$v=19$m=65536,t=3,p=4$test_hash",
            UserRole::Student,
        )
        .await
        .expect("create user failed");
    user.id
}

async fn seed_book(db: &DatabaseConnection) -> Uuid {
    let books = BookRepository::new(db.clone());
    let draft = BookDraft::new(
        &format!("Dune {}", Uuid::new_v4()),
        "Herbert",
        Some(412),
        None,
    )
    .unwrap();
    let book = books.create(&draft).await.expect("create book failed");
    book.id
}

#[tokio::test]
async fn issue_then_return_round_trip() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let user_id = seed_user(&db).await;
    let book_id = seed_book(&db).await;

    let books = BookRepository::new(db.clone());
    let circulation = CirculationRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    // Fresh book is available with an empty ledger
    let book = books.find_by_id(book_id).await.unwrap().unwrap();
    assert_eq!(book.lending_state, LendingState::Available);
    assert!(ledger.list_for_user(user_id).await.unwrap().is_empty());

    // Issue: state flips and exactly one record appears
    let record = circulation.issue(book_id, user_id).await.unwrap();
    assert_eq!(record.kind, TransactionKind::Issued);

    let book = books.find_by_id(book_id).await.unwrap().unwrap();
    assert_eq!(book.lending_state, LendingState::Issued);

    let entries = ledger.list_for_user(user_id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, TransactionKind::Issued);
    assert_eq!(entries[0].book_author.as_deref(), Some("Herbert"));

    // Return: state flips back, records are newest first
    circulation.return_book(book_id, user_id).await.unwrap();

    let book = books.find_by_id(book_id).await.unwrap().unwrap();
    assert_eq!(book.lending_state, LendingState::Available);

    let entries = ledger.list_for_user(user_id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, TransactionKind::Returned);
    assert_eq!(entries[1].kind, TransactionKind::Issued);
}

#[tokio::test]
async fn issue_conflict_mutates_nothing() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let user_a = seed_user(&db).await;
    let user_b = seed_user(&db).await;
    let book_id = seed_book(&db).await;

    let books = BookRepository::new(db.clone());
    let circulation = CirculationRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    circulation.issue(book_id, user_a).await.unwrap();

    // A second issue by a different user is rejected without touching state
    let err = circulation.issue(book_id, user_b).await.unwrap_err();
    assert!(matches!(
        err,
        CirculationError::Conflict(LendingError::AlreadyIssued)
    ));

    let book = books.find_by_id(book_id).await.unwrap().unwrap();
    assert_eq!(book.lending_state, LendingState::Issued);
    assert_eq!(ledger.list_for_user(user_a).await.unwrap().len(), 1);
    assert!(ledger.list_for_user(user_b).await.unwrap().is_empty());
}

#[tokio::test]
async fn return_available_book_rejected() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let user_id = seed_user(&db).await;
    let book_id = seed_book(&db).await;

    let circulation = CirculationRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    let err = circulation.return_book(book_id, user_id).await.unwrap_err();
    assert!(matches!(
        err,
        CirculationError::Conflict(LendingError::AlreadyAvailable)
    ));
    assert!(ledger.list_for_user(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_book_reports_not_found() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let user_id = seed_user(&db).await;
    let circulation = CirculationRepository::new(db.clone());

    let missing = Uuid::new_v4();
    let err = circulation.issue(missing, user_id).await.unwrap_err();
    assert!(matches!(err, CirculationError::BookNotFound(id) if id == missing));
}

#[tokio::test]
async fn any_user_may_return_an_issued_book() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let borrower = seed_user(&db).await;
    let other = seed_user(&db).await;
    let book_id = seed_book(&db).await;

    let circulation = CirculationRepository::new(db.clone());
    let ledger = LedgerRepository::new(db.clone());

    circulation.issue(book_id, borrower).await.unwrap();

    // Deliberate policy: the returner need not be the issuer
    let record = circulation.return_book(book_id, other).await.unwrap();
    assert_eq!(record.kind, TransactionKind::Returned);
    assert_eq!(record.user_id, other);

    let entries = ledger.list_for_user(other).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, TransactionKind::Returned);
}

#[tokio::test]
async fn concurrent_issues_yield_exactly_one_winner() {
    let Some(db) = test_db().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    const RACERS: usize = 8;

    let book_id = seed_book(&db).await;
    let mut user_ids = Vec::with_capacity(RACERS);
    for _ in 0..RACERS {
        user_ids.push(seed_user(&db).await);
    }

    let barrier = Arc::new(Barrier::new(RACERS));
    let mut tasks = Vec::with_capacity(RACERS);

    for user_id in user_ids {
        let db = db.clone();
        let barrier = Arc::clone(&barrier);
        tasks.push(tokio::spawn(async move {
            let circulation = CirculationRepository::new(db);
            barrier.wait().await;
            circulation.issue(book_id, user_id).await
        }));
    }

    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(CirculationError::Conflict(LendingError::AlreadyIssued))
            )
        })
        .count();

    assert_eq!(successes, 1, "exactly one racer may win");
    assert_eq!(conflicts, RACERS - 1, "all other racers see AlreadyIssued");

    // Exactly one ledger record exists for the book
    let ledger = LedgerRepository::new(db.clone());
    let all = ledger.list_all().await.unwrap();
    let for_book = all.iter().filter(|e| e.book_id == book_id).count();
    assert_eq!(for_book, 1);

    let books = BookRepository::new(db.clone());
    let book = books.find_by_id(book_id).await.unwrap().unwrap();
    assert_eq!(book.lending_state, LendingState::Issued);
}
