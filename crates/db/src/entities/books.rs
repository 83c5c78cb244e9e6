//! `SeaORM` Entity for the books table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LendingState;

/// A lendable catalog item.
///
/// `lending_state` transitions only through the circulation repository's
/// conditional update, never by direct writes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Title, non-empty.
    pub name: String,
    /// Author, non-empty.
    pub author: String,
    /// Page count, non-negative.
    pub pages: i32,
    /// Price, non-negative.
    pub price: Decimal,
    /// Current lending state.
    pub lending_state: LendingState,
    /// Creation timestamp, immutable.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Ledger records referencing this book.
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
