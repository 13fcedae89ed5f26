//! Income CRUD and monthly listing.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, Income, ResultEngine, incomes, month};

use super::{Engine, normalize_optional_text};

const DEFAULT_PER_PAGE: u64 = 10;
const MAX_PER_PAGE: u64 = 500;

#[derive(Clone, Debug)]
pub struct NewIncome {
    pub date: NaiveDate,
    pub source: String,
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Clone, Debug)]
pub struct IncomePage {
    pub incomes: Vec<Income>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl Engine {
    pub async fn create_income(&self, new: NewIncome) -> ResultEngine<Income> {
        let income = Income::new(
            new.date,
            new.source.trim().to_string(),
            new.amount,
            normalize_optional_text(new.note.as_deref()),
            Utc::now(),
        )?;
        let active = incomes::ActiveModel::from(&income);
        active.insert(&self.database).await?;
        Ok(income)
    }

    pub async fn income(&self, income_id: Uuid) -> ResultEngine<Income> {
        let model = incomes::Entity::find_by_id(income_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))?;
        Ok(model.into())
    }

    pub async fn update_income(&self, income_id: Uuid, update: NewIncome) -> ResultEngine<Income> {
        if update.amount < 1 {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 1".to_string(),
            ));
        }
        let source = update.source.trim();
        if source.is_empty() {
            return Err(EngineError::InvalidName(
                "source must not be empty".to_string(),
            ));
        }
        let model = incomes::Entity::find_by_id(income_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))?;

        let mut active: incomes::ActiveModel = model.into();
        active.date = ActiveValue::Set(update.date);
        active.source = ActiveValue::Set(source.to_string());
        active.amount = ActiveValue::Set(update.amount);
        active.note = ActiveValue::Set(normalize_optional_text(update.note.as_deref()));
        let model = active.update(&self.database).await?;
        Ok(model.into())
    }

    pub async fn delete_income(&self, income_id: Uuid) -> ResultEngine<()> {
        let result = incomes::Entity::delete_by_id(income_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("income not exists".to_string()));
        }
        Ok(())
    }

    /// Incomes of one month, newest first.
    pub async fn list_incomes(
        &self,
        month_day: NaiveDate,
        page: u64,
        per_page: Option<u64>,
    ) -> ResultEngine<IncomePage> {
        let (start, end) = month::month_bounds(month_day)?;
        let base = incomes::Entity::find()
            .filter(incomes::Column::Date.gte(start))
            .filter(incomes::Column::Date.lt(end));
        let total = base.clone().count(&self.database).await?;

        let page = page.max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let models = base
            .order_by_desc(incomes::Column::Date)
            .order_by_desc(incomes::Column::CreatedAt)
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(&self.database)
            .await?;

        Ok(IncomePage {
            incomes: models.into_iter().map(Income::from).collect(),
            total,
            page,
            per_page,
        })
    }
}
