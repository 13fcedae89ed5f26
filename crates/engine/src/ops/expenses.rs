//! Expense CRUD, filtered listing and the monthly summary aggregate.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DbBackend, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Statement, Value, prelude::*,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Expense, EngineError, ResultEngine, categories, expenses, month};

use super::{Engine, normalize_optional_text};

const DEFAULT_PER_PAGE: u64 = 10;
const MAX_PER_PAGE: u64 = 500;
const SUMMARY_PER_PAGE: u64 = 12;

/// Input for creating an expense. When `category_id` is absent the engine
/// tries to guess one from the item and memo text.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub item: String,
    pub amount: i64,
    pub category_id: Option<Uuid>,
    pub memo: Option<String>,
}

/// Full-record update: every field is written, absent options clear the
/// column.
#[derive(Clone, Debug)]
pub struct ExpenseUpdate {
    pub date: NaiveDate,
    pub item: String,
    pub amount: i64,
    pub category_id: Option<Uuid>,
    pub memo: Option<String>,
}

/// Listing filter. When neither bound is set, the listing is restricted to
/// `month` (defaulting to the current month) unless `PageRequest::all` asks
/// for the whole history.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring match against the item text.
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    /// Any day of the target month.
    pub month: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseSort {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
    ItemAsc,
    ItemDesc,
    CategoryAsc,
    CategoryDesc,
}

#[derive(Copy, Clone, Debug, Default)]
pub struct PageRequest {
    /// 1-based page number; 0 is treated as 1.
    pub page: u64,
    pub per_page: Option<u64>,
    /// Disable pagination and the default month restriction.
    pub all: bool,
}

impl PageRequest {
    fn page(&self) -> u64 {
        self.page.max(1)
    }

    fn per_page(&self, default: u64) -> u64 {
        self.per_page.unwrap_or(default).clamp(1, MAX_PER_PAGE)
    }
}

#[derive(Clone, Debug)]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct MonthlySummaryRow {
    /// `YYYY-MM`.
    pub month: String,
    pub total: i64,
    pub count: i64,
}

#[derive(Clone, Debug)]
pub struct MonthlySummaryPage {
    pub rows: Vec<MonthlySummaryRow>,
    pub grand_total: i64,
    pub month_count: u64,
    pub page: u64,
    pub per_page: u64,
}

impl ExpenseFilter {
    /// Resolve the effective date window. Explicit bounds win; otherwise the
    /// listing is pinned to one month unless `all` lifts the restriction.
    fn bounds(&self, all: bool) -> ResultEngine<(Option<NaiveDate>, Option<NaiveDate>)> {
        if self.start_date.is_some() || self.end_date.is_some() {
            if let (Some(start), Some(end)) = (self.start_date, self.end_date)
                && start > end
            {
                return Err(EngineError::InvalidDate(
                    "start date is after end date".to_string(),
                ));
            }
            return Ok((
                self.start_date,
                self.end_date.and_then(|d| d.succ_opt()),
            ));
        }
        // `all` opens the whole history even when a month is on the query.
        if all {
            return Ok((None, None));
        }
        let month_day = self.month.unwrap_or_else(|| Utc::now().date_naive());
        let (start, end) = month::month_bounds(month_day)?;
        Ok((Some(start), Some(end)))
    }

    fn apply(
        &self,
        mut query: Select<expenses::Entity>,
        all: bool,
    ) -> ResultEngine<Select<expenses::Entity>> {
        let (start, end) = self.bounds(all)?;
        if let Some(start) = start {
            query = query.filter(expenses::Column::Date.gte(start));
        }
        if let Some(end) = end {
            query = query.filter(expenses::Column::Date.lt(end));
        }
        if let Some(category_id) = self.category_id {
            query = query.filter(expenses::Column::CategoryId.eq(category_id));
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(expenses::Column::Item.contains(q));
        }
        Ok(query)
    }
}

impl Engine {
    pub async fn create_expense(&self, new: NewExpense) -> ResultEngine<Expense> {
        let memo = normalize_optional_text(new.memo.as_deref());
        let category = self
            .guess_category(&new.item, memo.as_deref().unwrap_or(""), new.category_id)
            .await?;
        let mut expense = Expense::new(
            new.date,
            new.item.trim().to_string(),
            new.amount,
            category.as_ref().map(|c| c.id),
            memo,
            Utc::now(),
        )?;
        expense.category_name = category.map(|c| c.name);

        let active = expenses::ActiveModel::from(&expense);
        active.insert(&self.database).await?;
        Ok(expense)
    }

    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let found = expenses::Entity::find_by_id(expense_id)
            .find_also_related(categories::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Ok(with_category(found))
    }

    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        update: ExpenseUpdate,
    ) -> ResultEngine<Expense> {
        if update.amount < 1 {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 1".to_string(),
            ));
        }
        let item = update.item.trim();
        if item.is_empty() {
            return Err(EngineError::InvalidName(
                "item must not be empty".to_string(),
            ));
        }
        let model = expenses::Entity::find_by_id(expense_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;

        let mut active: expenses::ActiveModel = model.into();
        active.date = ActiveValue::Set(update.date);
        active.item = ActiveValue::Set(item.to_string());
        active.amount = ActiveValue::Set(update.amount);
        active.category_id = ActiveValue::Set(update.category_id);
        active.memo = ActiveValue::Set(normalize_optional_text(update.memo.as_deref()));
        active.update(&self.database).await?;

        self.expense(expense_id).await
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        let result = expenses::Entity::delete_by_id(expense_id)
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(())
    }

    /// Delete a batch of expenses, returning how many rows went away.
    /// Unknown ids are skipped, matching bulk-delete form semantics.
    pub async fn delete_expenses(&self, ids: &[Uuid]) -> ResultEngine<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_expenses(
        &self,
        filter: &ExpenseFilter,
        sort: ExpenseSort,
        page: PageRequest,
    ) -> ResultEngine<ExpensePage> {
        let base = filter.apply(expenses::Entity::find(), page.all)?;
        let total = base.clone().count(&self.database).await?;

        let mut query = base.find_also_related(categories::Entity);
        query = match sort {
            ExpenseSort::DateDesc => query
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::CreatedAt),
            ExpenseSort::DateAsc => query
                .order_by_asc(expenses::Column::Date)
                .order_by_asc(expenses::Column::CreatedAt),
            ExpenseSort::AmountDesc => query
                .order_by_desc(expenses::Column::Amount)
                .order_by_desc(expenses::Column::Date),
            ExpenseSort::AmountAsc => query
                .order_by_asc(expenses::Column::Amount)
                .order_by_desc(expenses::Column::Date),
            ExpenseSort::ItemAsc => query
                .order_by_asc(expenses::Column::Item)
                .order_by_desc(expenses::Column::Date),
            ExpenseSort::ItemDesc => query
                .order_by_desc(expenses::Column::Item)
                .order_by_desc(expenses::Column::Date),
            ExpenseSort::CategoryAsc => query
                .order_by_asc(categories::Column::Name)
                .order_by_desc(expenses::Column::Date),
            ExpenseSort::CategoryDesc => query
                .order_by_desc(categories::Column::Name)
                .order_by_desc(expenses::Column::Date),
        };

        let page_number = page.page();
        let per_page = page.per_page(DEFAULT_PER_PAGE);
        if !page.all {
            query = query
                .offset((page_number - 1) * per_page)
                .limit(per_page);
        }

        let rows = query.all(&self.database).await?;
        Ok(ExpensePage {
            expenses: rows.into_iter().map(with_category).collect(),
            total,
            page: page_number,
            per_page,
        })
    }

    /// Expenses of one month with category names, oldest first. Feeds the
    /// CSV export.
    pub async fn expenses_for_month(&self, month_day: NaiveDate) -> ResultEngine<Vec<Expense>> {
        let (start, end) = month::month_bounds(month_day)?;
        let rows = expenses::Entity::find()
            .filter(expenses::Column::Date.gte(start))
            .filter(expenses::Column::Date.lt(end))
            .find_also_related(categories::Entity)
            .order_by_asc(expenses::Column::Date)
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(with_category).collect())
    }

    /// Per-month totals over the filtered window, newest month first.
    pub async fn monthly_summary(
        &self,
        filter: &ExpenseFilter,
        page: PageRequest,
    ) -> ResultEngine<MonthlySummaryPage> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(start) = filter.start_date {
            clauses.push("date >= ?".to_string());
            values.push(start.into());
        }
        if let Some(end) = filter.end_date {
            clauses.push("date <= ?".to_string());
            values.push(end.into());
        }
        if let Some(category_id) = filter.category_id {
            clauses.push("category_id = ?".to_string());
            values.push(category_id.into());
        }
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            clauses.push("item LIKE ?".to_string());
            values.push(format!("%{q}%").into());
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT strftime('%Y-%m', date) AS month, \
             COALESCE(SUM(amount), 0) AS total, \
             COUNT(*) AS count \
             FROM expenses {where_clause} \
             GROUP BY strftime('%Y-%m', date) \
             ORDER BY month DESC"
        );
        let rows = MonthlySummaryRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            &sql,
            values,
        ))
        .all(&self.database)
        .await?;

        let grand_total = rows.iter().map(|row| row.total).sum();
        let month_count = rows.len() as u64;
        let page_number = page.page();
        let per_page = page.per_page(SUMMARY_PER_PAGE);
        let rows = if page.all {
            rows
        } else {
            rows.into_iter()
                .skip(((page_number - 1) * per_page) as usize)
                .take(per_page as usize)
                .collect()
        };

        Ok(MonthlySummaryPage {
            rows,
            grand_total,
            month_count,
            page: page_number,
            per_page,
        })
    }
}

fn with_category((model, category): (expenses::Model, Option<categories::Model>)) -> Expense {
    let mut expense = Expense::from(model);
    expense.category_name = category.map(|c| c.name);
    expense
}
