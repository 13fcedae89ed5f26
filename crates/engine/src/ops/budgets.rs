//! Monthly budget CRUD.
//!
//! At most one budget may exist per (month, category) pair; `category_id`
//! `None` is the overall monthly cap and follows the same uniqueness rule.

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DbBackend, QueryFilter, QueryOrder, Statement, prelude::*,
};
use uuid::Uuid;

use crate::{Budget, EngineError, ResultEngine, budgets, categories, month};

use super::Engine;

#[derive(Clone, Debug)]
pub struct NewBudget {
    /// Any day of the target month.
    pub month: NaiveDate,
    pub category_id: Option<Uuid>,
    pub amount: i64,
}

impl Engine {
    pub async fn create_budget(&self, new: NewBudget) -> ResultEngine<Budget> {
        if let Some(category_id) = new.category_id {
            self.category(category_id).await?;
        }
        let mut budget = Budget::new(new.month, new.category_id, new.amount)?;
        self.check_duplicate(&budget, None).await?;

        let active = budgets::ActiveModel::from(&budget);
        active.insert(&self.database).await?;
        budget.category_name = self.budget_category_name(budget.category_id).await?;
        Ok(budget)
    }

    pub async fn budget(&self, budget_id: Uuid) -> ResultEngine<Budget> {
        let found = budgets::Entity::find_by_id(budget_id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;
        Ok(with_category(found))
    }

    pub async fn update_budget(&self, budget_id: Uuid, update: NewBudget) -> ResultEngine<Budget> {
        if let Some(category_id) = update.category_id {
            self.category(category_id).await?;
        }
        let model = budgets::Entity::find_by_id(budget_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;

        let replacement = Budget::new(update.month, update.category_id, update.amount)?;
        self.check_duplicate(&replacement, Some(budget_id)).await?;

        let mut active: budgets::ActiveModel = model.into();
        active.month = ActiveValue::Set(replacement.month);
        active.category_id = ActiveValue::Set(replacement.category_id);
        active.amount = ActiveValue::Set(replacement.amount);
        active.update(&self.database).await?;

        self.budget(budget_id).await
    }

    pub async fn delete_budget(&self, budget_id: Uuid) -> ResultEngine<()> {
        let result = budgets::Entity::delete_by_id(budget_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("budget not exists".to_string()));
        }
        Ok(())
    }

    /// Budgets of one month: the overall cap first, then per-category rows
    /// ordered by category name.
    pub async fn list_budgets(&self, month_day: NaiveDate) -> ResultEngine<Vec<Budget>> {
        let first = month::first_of_month(month_day);
        let rows = budgets::Entity::find()
            .filter(budgets::Column::Month.eq(first))
            .find_also_related(categories::Entity)
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        let mut budgets: Vec<Budget> = rows.into_iter().map(with_category).collect();
        budgets.sort_by_key(|b| b.category_id.is_some());
        Ok(budgets)
    }

    /// The overall (category-less) budget amount for a month, if set.
    pub async fn overall_budget(&self, month_day: NaiveDate) -> ResultEngine<Option<i64>> {
        let first = month::first_of_month(month_day);
        let query = Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT amount FROM budgets WHERE month = ? AND category_id IS NULL",
            [first.into()],
        );
        let row = self.database.query_one(query).await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<i64>("", "amount")?)),
            None => Ok(None),
        }
    }

    async fn check_duplicate(&self, budget: &Budget, exclude: Option<Uuid>) -> ResultEngine<()> {
        let mut query = budgets::Entity::find().filter(budgets::Column::Month.eq(budget.month));
        query = match budget.category_id {
            Some(category_id) => query.filter(budgets::Column::CategoryId.eq(category_id)),
            None => query.filter(budgets::Column::CategoryId.is_null()),
        };
        if let Some(id) = exclude {
            query = query.filter(budgets::Column::Id.ne(id));
        }
        if query.one(&self.database).await?.is_some() {
            return Err(EngineError::ExistingKey(format!(
                "budget for {}",
                month::month_str(budget.month)
            )));
        }
        Ok(())
    }

    async fn budget_category_name(&self, category_id: Option<Uuid>) -> ResultEngine<Option<String>> {
        match category_id {
            Some(id) => Ok(Some(self.category(id).await?.name)),
            None => Ok(None),
        }
    }
}

fn with_category((model, category): (budgets::Model, Option<categories::Model>)) -> Budget {
    let mut budget = Budget::from(model);
    budget.category_name = category.map(|c| c.name);
    budget
}
