//! Circulation repository: atomic issue/return transitions.
//!
//! Executes the lending state machine against the catalog store. The
//! precondition check and the state write are one conditional update
//! (compare-and-swap on `lending_state`), and the ledger append happens in
//! the same database transaction, so the availability flag and the audit
//! trail cannot diverge: a failed append rolls the state change back, and of
//! two racing issue calls at most one succeeds.

use biblio_core::lending::{LendingError, TransactionKind};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use crate::entities::{books, sea_orm_active_enums, transactions};

/// Error types for circulation operations.
#[derive(Debug, thiserror::Error)]
pub enum CirculationError {
    /// Book not found.
    #[error("Book not found: {0}")]
    BookNotFound(Uuid),

    /// State machine precondition failed; nothing was mutated.
    #[error(transparent)]
    Conflict(#[from] LendingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Circulation repository driving the lending state machine.
#[derive(Debug, Clone)]
pub struct CirculationRepository {
    db: DatabaseConnection,
}

impl CirculationRepository {
    /// Creates a new circulation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues an available book to a user.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` if the book does not exist, or
    /// `Conflict(AlreadyIssued)` if it is already checked out.
    pub async fn issue(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<transactions::Model, CirculationError> {
        self.transition(book_id, user_id, TransactionKind::Issued)
            .await
    }

    /// Returns an issued book. Any authenticated user may return any issued
    /// book; the ledger records who did.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` if the book does not exist, or
    /// `Conflict(AlreadyAvailable)` if it is already on the shelf.
    pub async fn return_book(
        &self,
        book_id: Uuid,
        user_id: Uuid,
    ) -> Result<transactions::Model, CirculationError> {
        self.transition(book_id, user_id, TransactionKind::Returned)
            .await
    }

    /// Runs one state transition and appends its ledger record atomically.
    async fn transition(
        &self,
        book_id: Uuid,
        user_id: Uuid,
        kind: TransactionKind,
    ) -> Result<transactions::Model, CirculationError> {
        let required = sea_orm_active_enums::LendingState::from(kind.required_state());
        let resulting = sea_orm_active_enums::LendingState::from(kind.resulting_state());

        let txn = self.db.begin().await?;

        // Compare-and-swap: the update applies only if the row still holds
        // the required prior state. Under a concurrent transition the loser
        // re-evaluates the filter after the winner commits and matches
        // nothing.
        let update = books::Entity::update_many()
            .col_expr(books::Column::LendingState, Expr::value(resulting))
            .filter(books::Column::Id.eq(book_id))
            .filter(books::Column::LendingState.eq(required))
            .exec(&txn)
            .await?;

        if update.rows_affected == 0 {
            // Distinguish a missing book from a precondition conflict.
            let exists = books::Entity::find_by_id(book_id).one(&txn).await?;
            txn.rollback().await?;
            return match exists {
                None => Err(CirculationError::BookNotFound(book_id)),
                Some(_) => Err(CirculationError::Conflict(kind.conflict())),
            };
        }

        let record = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            book_id: Set(book_id),
            kind: Set(kind.into()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let record = record.insert(&txn).await?;

        txn.commit().await?;
        Ok(record)
    }
}
