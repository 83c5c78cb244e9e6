//! Ledger repository for querying the transaction audit trail.
//!
//! The ledger is append-only; appends happen inside the circulation
//! repository's transition transaction. This repository only reads, and it
//! performs no authorization - the gate in front of the routes does.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::{books, sea_orm_active_enums::TransactionKind, transactions, users};

/// One ledger record enriched with referenced names.
///
/// Enrichment is best-effort: if the referenced book or user no longer
/// exists the fields stay `None` rather than failing the query.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// Record ID.
    pub id: Uuid,
    /// The acting user.
    pub user_id: Uuid,
    /// The referenced book.
    pub book_id: Uuid,
    /// Issued or Returned.
    pub kind: TransactionKind,
    /// Event timestamp.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    /// Referenced book's name, when it still exists.
    pub book_name: Option<String>,
    /// Referenced book's author, when it still exists.
    pub book_author: Option<String>,
    /// Acting user's username; filled for the admin view.
    pub username: Option<String>,
}

impl LedgerEntry {
    fn from_row(record: transactions::Model, book: Option<books::Model>) -> Self {
        let (book_name, book_author) = match book {
            Some(b) => (Some(b.name), Some(b.author)),
            None => (None, None),
        };
        Self {
            id: record.id,
            user_id: record.user_id,
            book_id: record.book_id,
            kind: record.kind,
            created_at: record.created_at,
            book_name,
            book_author,
            username: None,
        }
    }
}

/// Ledger repository for query operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists one user's records, enriched with book name and author,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<LedgerEntry>, DbErr> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .find_also_related(books::Entity)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(record, book)| LedgerEntry::from_row(record, book))
            .collect())
    }

    /// Lists every record, enriched with book name/author and the acting
    /// user's username, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<LedgerEntry>, DbErr> {
        let rows = transactions::Entity::find()
            .find_also_related(books::Entity)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        // Batch-resolve usernames instead of one lookup per record.
        let user_ids: Vec<Uuid> = rows.iter().map(|(r, _)| r.user_id).collect();
        let usernames: HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(record, book)| {
                let username = usernames.get(&record.user_id).cloned();
                let mut entry = LedgerEntry::from_row(record, book);
                entry.username = username;
                entry
            })
            .collect())
    }
}
