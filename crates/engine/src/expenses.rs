//! Expense primitives.
//!
//! An `Expense` is a single recorded outflow: a dated item with an integer
//! yen amount, an optional category and an optional link to the receipt it
//! was imported from.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    pub item: String,
    /// Integer yen; always >= 1.
    pub amount: i64,
    pub category_id: Option<Uuid>,
    /// Resolved category name, when the category is loaded alongside.
    pub category_name: Option<String>,
    pub memo: Option<String>,
    pub receipt_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        item: String,
        amount: i64,
        category_id: Option<Uuid>,
        memo: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount < 1 {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 1".to_string(),
            ));
        }
        if item.trim().is_empty() {
            return Err(EngineError::InvalidName(
                "item must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            item,
            amount,
            category_id,
            category_name: None,
            memo,
            receipt_id: None,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub item: String,
    pub amount: i64,
    pub category_id: Option<Uuid>,
    pub memo: Option<String>,
    pub receipt_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::receipts::Entity",
        from = "Column::ReceiptId",
        to = "super::receipts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Receipt,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            date: ActiveValue::Set(expense.date),
            item: ActiveValue::Set(expense.item.clone()),
            amount: ActiveValue::Set(expense.amount),
            category_id: ActiveValue::Set(expense.category_id),
            memo: ActiveValue::Set(expense.memo.clone()),
            receipt_id: ActiveValue::Set(expense.receipt_id),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            item: model.item,
            amount: model.amount,
            category_id: model.category_id,
            category_name: None,
            memo: model.memo,
            receipt_id: model.receipt_id,
            created_at: model.created_at,
        }
    }
}
