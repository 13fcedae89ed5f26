//! Monthly budget primitives.
//!
//! A budget caps spending for one calendar month, either per category or
//! overall (`category_id` is `None`). At most one budget may exist per
//! (month, category) pair.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, month};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    /// First day of the target month.
    pub month: NaiveDate,
    pub category_id: Option<Uuid>,
    /// Resolved category name, when loaded alongside. `None` with a `None`
    /// `category_id` means the overall budget.
    pub category_name: Option<String>,
    /// Integer yen; always >= 1.
    pub amount: i64,
}

impl Budget {
    pub fn new(month_day: NaiveDate, category_id: Option<Uuid>, amount: i64) -> ResultEngine<Self> {
        if amount < 1 {
            return Err(EngineError::InvalidAmount(
                "budget amount must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            month: month::first_of_month(month_day),
            category_id,
            category_name: None,
            amount,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub month: Date,
    pub category_id: Option<Uuid>,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(budget.id),
            month: ActiveValue::Set(budget.month),
            category_id: ActiveValue::Set(budget.category_id),
            amount: ActiveValue::Set(budget.amount),
        }
    }
}

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            month: model.month,
            category_id: model.category_id,
            category_name: None,
            amount: model.amount,
        }
    }
}
