//! Book repository for catalog store operations.

use biblio_core::catalog::BookDraft;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{books, sea_orm_active_enums::LendingState, transactions};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Book not found.
    #[error("Book not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Book repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    db: DatabaseConnection,
}

impl BookRepository {
    /// Creates a new book repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a validated draft to the catalog. New books start `Available`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, draft: &BookDraft) -> Result<books::Model, DbErr> {
        let book = books::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name.clone()),
            author: Set(draft.author.clone()),
            pages: Set(draft.pages),
            price: Set(draft.price),
            lending_state: Set(LendingState::Available),
            created_at: Set(chrono::Utc::now().into()),
        };

        book.insert(&self.db).await
    }

    /// Lists the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<books::Model>, DbErr> {
        books::Entity::find()
            .order_by_desc(books::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Finds a book by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<books::Model>, DbErr> {
        books::Entity::find_by_id(id).one(&self.db).await
    }

    /// Deletes a book and all of its ledger records.
    ///
    /// The ledger rows are removed in the same database transaction as the
    /// book, matching the FK cascade, so a reader never observes a ledger
    /// record for a book that no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the book does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), CatalogError> {
        let txn = self.db.begin().await?;

        transactions::Entity::delete_many()
            .filter(transactions::Column::BookId.eq(id))
            .exec(&txn)
            .await?;

        let result = books::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound(id));
        }

        txn.commit().await?;
        Ok(())
    }
}
