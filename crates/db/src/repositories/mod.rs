//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod book;
pub mod circulation;
pub mod ledger;
pub mod session;
pub mod user;

pub use book::{BookRepository, CatalogError};
pub use circulation::{CirculationError, CirculationRepository};
pub use ledger::{LedgerEntry, LedgerRepository};
pub use session::SessionRepository;
pub use user::UserRepository;
