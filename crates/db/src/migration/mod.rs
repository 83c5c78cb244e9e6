//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20260820_000001_initial;

/// Migration runner for the Biblio schema.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260820_000001_initial::Migration)]
    }
}
