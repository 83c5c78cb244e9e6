//! `SeaORM` entity definitions.

pub mod books;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod transactions;
pub mod users;
