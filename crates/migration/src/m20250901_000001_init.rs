//! Initial schema migration.
//!
//! Creates the complete ledger schema:
//!
//! - `users`: basic-auth credentials
//! - `categories`: expense categories with a normalized unique name
//! - `category_rules`: keyword rules feeding the category guesser
//! - `receipts`: staged receipt drafts with a declared total
//! - `receipt_lines`: extracted line items under review
//! - `expenses`: recorded outflows, optionally linked to a receipt
//! - `incomes`: recorded inflows
//! - `budgets`: monthly caps, per category or overall

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    Archived,
}

#[derive(Iden)]
enum CategoryRules {
    Table,
    Id,
    CategoryId,
    Keyword,
    KeywordNorm,
}

#[derive(Iden)]
enum Receipts {
    Table,
    Id,
    Date,
    Total,
    ImagePath,
    CommittedAt,
    CreatedAt,
}

#[derive(Iden)]
enum ReceiptLines {
    Table,
    Id,
    ReceiptId,
    Item,
    Amount,
    CategoryId,
    RawText,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Date,
    Item,
    Amount,
    CategoryId,
    Memo,
    ReceiptId,
    CreatedAt,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    Date,
    Source,
    Amount,
    Note,
    CreatedAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Month,
    CategoryId,
    Amount,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Categories::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CategoryRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryRules::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CategoryRules::CategoryId).blob().not_null())
                    .col(ColumnDef::new(CategoryRules::Keyword).string().not_null())
                    .col(
                        ColumnDef::new(CategoryRules::KeywordNorm)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_rules-category_id")
                            .from(CategoryRules::Table, CategoryRules::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-category_rules-keyword_norm-unique")
                    .table(CategoryRules::Table)
                    .col(CategoryRules::KeywordNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Receipts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Receipts::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Receipts::Date).date().not_null())
                    .col(ColumnDef::new(Receipts::Total).big_integer().not_null())
                    .col(ColumnDef::new(Receipts::ImagePath).string())
                    .col(ColumnDef::new(Receipts::CommittedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Receipts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ReceiptLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReceiptLines::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReceiptLines::ReceiptId).blob().not_null())
                    .col(ColumnDef::new(ReceiptLines::Item).string().not_null())
                    .col(
                        ColumnDef::new(ReceiptLines::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReceiptLines::CategoryId).blob())
                    .col(ColumnDef::new(ReceiptLines::RawText).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipt_lines-receipt_id")
                            .from(ReceiptLines::Table, ReceiptLines::ReceiptId)
                            .to(Receipts::Table, Receipts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-receipt_lines-category_id")
                            .from(ReceiptLines::Table, ReceiptLines::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-receipt_lines-receipt_id")
                    .table(ReceiptLines::Table)
                    .col(ReceiptLines::ReceiptId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::Item).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).blob())
                    .col(ColumnDef::new(Expenses::Memo).string())
                    .col(ColumnDef::new(Expenses::ReceiptId).blob())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-receipt_id")
                            .from(Expenses::Table, Expenses::ReceiptId)
                            .to(Receipts::Table, Receipts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-date")
                    .table(Expenses::Table)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incomes::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incomes::Date).date().not_null())
                    .col(ColumnDef::new(Incomes::Source).string().not_null())
                    .col(ColumnDef::new(Incomes::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Incomes::Note).string())
                    .col(
                        ColumnDef::new(Incomes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-date")
                    .table(Incomes::Table)
                    .col(Incomes::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::Month).date().not_null())
                    .col(ColumnDef::new(Budgets::CategoryId).blob())
                    .col(ColumnDef::new(Budgets::Amount).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-category_id")
                            .from(Budgets::Table, Budgets::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL category rows (the overall cap) are deduplicated by the
        // engine; SQLite treats NULLs as distinct in unique indexes.
        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-month-category_id-unique")
                    .table(Budgets::Table)
                    .col(Budgets::Month)
                    .col(Budgets::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReceiptLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Receipts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
