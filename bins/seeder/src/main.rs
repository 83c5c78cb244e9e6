//! Database seeder for Biblio development and testing.
//!
//! Seeds one user per role and a handful of catalog books for local
//! development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::str::FromStr;
use uuid::Uuid;

use biblio_core::auth::hash_password;
use biblio_db::entities::{
    books, users,
    sea_orm_active_enums::{LendingState, UserRole},
};

/// Seed user IDs (consistent for all seeds)
const ADMIN_ID: &str = "00000000-0000-0000-0000-000000000001";
const TEACHER_ID: &str = "00000000-0000-0000-0000-000000000002";
const STUDENT_ID: &str = "00000000-0000-0000-0000-000000000003";

/// Every seed user logs in with this password.
const SEED_PASSWORD: &str = "biblio-dev";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = biblio_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding users...");
    seed_users(&db).await;

    println!("Seeding books...");
    seed_books(&db).await;

    println!("Seeding complete!");
}

/// Seeds one user per role, skipping any that already exist.
async fn seed_users(db: &DatabaseConnection) {
    let seeds = [
        (ADMIN_ID, "admin", UserRole::Admin),
        (TEACHER_ID, "teacher", UserRole::Teacher),
        (STUDENT_ID, "student", UserRole::Student),
    ];

    for (id, username, role) in seeds {
        let id = Uuid::parse_str(id).expect("seed user id is valid");

        if users::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {username} already exists, skipping...");
            continue;
        }

        let password_hash = hash_password(SEED_PASSWORD).expect("seed password hashes");

        let user = users::ActiveModel {
            id: Set(id),
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(role),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {username}: {e}");
        } else {
            println!("  Created user: {username} (password: {SEED_PASSWORD})");
        }
    }
}

/// Seeds a handful of catalog books, all starting available.
async fn seed_books(db: &DatabaseConnection) {
    let seeds = [
        ("The Rust Programming Language", "Steve Klabnik", 560, "39.95"),
        ("Designing Data-Intensive Applications", "Martin Kleppmann", 616, "44.99"),
        ("The Mythical Man-Month", "Frederick Brooks", 336, "29.99"),
        ("Structure and Interpretation of Computer Programs", "Harold Abelson", 657, "0"),
        ("A Philosophy of Software Design", "John Ousterhout", 196, "21.00"),
    ];

    let mut inserted = 0;
    for (name, author, pages, price) in seeds {
        let exists = books::Entity::find()
            .all(db)
            .await
            .ok()
            .is_some_and(|rows| rows.iter().any(|b| b.name == name));
        if exists {
            continue;
        }

        let book = books::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            author: Set(author.to_string()),
            pages: Set(pages),
            price: Set(Decimal::from_str(price).expect("seed price parses")),
            lending_state: Set(LendingState::Available),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = book.insert(db).await {
            eprintln!("Failed to insert book {name}: {e}");
        } else {
            inserted += 1;
        }
    }

    println!("  Inserted {inserted} books");
}
