//! Adds an explicit ordering column to receipt lines so the review screen
//! shows them in the order they appeared on the receipt.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ReceiptLines {
    Table,
    Position,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ReceiptLines::Table)
                    .add_column(
                        ColumnDef::new(ReceiptLines::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ReceiptLines::Table)
                    .drop_column(ReceiptLines::Position)
                    .to_owned(),
            )
            .await
    }
}
