//! Income primitives.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub date: NaiveDate,
    pub source: String,
    /// Integer yen; always >= 1.
    pub amount: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Income {
    pub fn new(
        date: NaiveDate,
        source: String,
        amount: i64,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount < 1 {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 1".to_string(),
            ));
        }
        if source.trim().is_empty() {
            return Err(EngineError::InvalidName(
                "source must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            date,
            source,
            amount,
            note,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub source: String,
    pub amount: i64,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Income> for ActiveModel {
    fn from(income: &Income) -> Self {
        Self {
            id: ActiveValue::Set(income.id),
            date: ActiveValue::Set(income.date),
            source: ActiveValue::Set(income.source.clone()),
            amount: ActiveValue::Set(income.amount),
            note: ActiveValue::Set(income.note.clone()),
            created_at: ActiveValue::Set(income.created_at),
        }
    }
}

impl From<Model> for Income {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            source: model.source,
            amount: model.amount,
            note: model.note,
            created_at: model.created_at,
        }
    }
}
