pub use sea_orm_migration::prelude::*;

mod m20250901_000001_init;
mod m20250920_000001_receipt_positions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_init::Migration),
            Box::new(m20250920_000001_receipt_positions::Migration),
        ]
    }
}
