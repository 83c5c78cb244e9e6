//! `SeaORM` active enums backed by Postgres enum types.

use biblio_core::authz::Role;
use biblio_core::lending;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role stored in the `user_role` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Ordinary member.
    #[sea_orm(string_value = "student")]
    Student,
    /// May delete catalog items.
    #[sea_orm(string_value = "teacher")]
    Teacher,
    /// Full access including the admin ledger view.
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Lending state stored in the `lending_state` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "lending_state")]
pub enum LendingState {
    /// On the shelf.
    #[sea_orm(string_value = "Available")]
    Available,
    /// Checked out.
    #[sea_orm(string_value = "Issued")]
    Issued,
}

/// Ledger record kind stored in the `transaction_kind` Postgres enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    /// Item handed out.
    #[sea_orm(string_value = "Issued")]
    Issued,
    /// Item brought back.
    #[sea_orm(string_value = "Returned")]
    Returned,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => Self::Student,
            Role::Teacher => Self::Teacher,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<&UserRole> for Role {
    fn from(role: &UserRole) -> Self {
        match role {
            UserRole::Student => Self::Student,
            UserRole::Teacher => Self::Teacher,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<lending::LendingState> for LendingState {
    fn from(state: lending::LendingState) -> Self {
        match state {
            lending::LendingState::Available => Self::Available,
            lending::LendingState::Issued => Self::Issued,
        }
    }
}

impl From<&LendingState> for lending::LendingState {
    fn from(state: &LendingState) -> Self {
        match state {
            LendingState::Available => Self::Available,
            LendingState::Issued => Self::Issued,
        }
    }
}

impl From<lending::TransactionKind> for TransactionKind {
    fn from(kind: lending::TransactionKind) -> Self {
        match kind {
            lending::TransactionKind::Issued => Self::Issued,
            lending::TransactionKind::Returned => Self::Returned,
        }
    }
}

impl From<&TransactionKind> for lending::TransactionKind {
    fn from(kind: &TransactionKind) -> Self {
        match kind {
            TransactionKind::Issued => Self::Issued,
            TransactionKind::Returned => Self::Returned,
        }
    }
}
