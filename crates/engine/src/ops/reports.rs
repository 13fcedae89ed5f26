//! Monthly dashboard and spending analytics aggregates.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use sea_orm::{DbBackend, FromQueryResult, Statement, prelude::*};

use crate::{Budget, Expense, ResultEngine, month};

use super::Engine;

const RECENT_EXPENSES: u64 = 10;
const TREND_MONTHS: i32 = 6;

/// Spend per category; `name` is `None` for uncategorized expenses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub name: Option<String>,
    pub total: i64,
}

/// One month of the expense/income trend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub expense_total: i64,
    pub income_total: i64,
}

/// One month of the expense-only trend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthSpend {
    pub month: String,
    pub total: i64,
}

/// Budget consumption for one category (or the overall cap).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetProgressRow {
    pub name: Option<String>,
    pub is_overall: bool,
    pub spent: i64,
    /// `None` when spending exists without a budget for the category.
    pub budget: Option<i64>,
    pub remain: Option<i64>,
}

/// One day of the dashboard calendar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub expense_total: i64,
    pub income_total: i64,
}

/// A reference period and the percentage change against it. `pct` is `None`
/// when the reference total is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodComparison {
    pub total: i64,
    pub pct: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct Dashboard {
    /// `YYYY-MM`.
    pub month: String,
    pub prev_month: String,
    pub next_month: String,
    pub expense_total: i64,
    pub income_total: i64,
    pub net_total: i64,
    pub overall_budget: Option<i64>,
    pub by_category: Vec<CategoryTotal>,
    pub last_six_months: Vec<MonthTotal>,
    pub budget_progress: Vec<BudgetProgressRow>,
    pub recent_expenses: Vec<Expense>,
    /// Monday-first weeks; `None` pads days outside the month.
    pub calendar: Vec<Vec<Option<DayCell>>>,
}

#[derive(Clone, Debug)]
pub struct Analytics {
    /// `YYYY-MM`.
    pub month: String,
    pub total: i64,
    pub by_category: Vec<CategoryTotal>,
    pub last_six_months: Vec<MonthSpend>,
    /// Versus the previous month.
    pub mom: PeriodComparison,
    /// Versus the same month one year earlier.
    pub yoy: PeriodComparison,
    pub suggestions: Vec<String>,
}

#[derive(FromQueryResult)]
struct TotalRow {
    total: i64,
}

#[derive(FromQueryResult)]
struct CategoryTotalRow {
    name: Option<String>,
    total: i64,
}

#[derive(FromQueryResult)]
struct DaySumRow {
    date: Date,
    total: i64,
}

impl Engine {
    pub async fn dashboard(&self, month_day: NaiveDate) -> ResultEngine<Dashboard> {
        let first = month::first_of_month(month_day);
        let (start, end) = month::month_bounds(first)?;

        let expense_total = self.sum_between("expenses", start, end).await?;
        let income_total = self.sum_between("incomes", start, end).await?;
        let by_category = self.category_totals(start, end).await?;
        let budgets = self.list_budgets(first).await?;
        let overall_budget = budgets
            .iter()
            .find(|b| b.category_id.is_none())
            .map(|b| b.amount);

        let mut last_six_months = Vec::with_capacity(TREND_MONTHS as usize);
        for offset in (0..TREND_MONTHS).rev() {
            let m = month::add_months(first, -offset)?;
            let (m_start, m_end) = month::month_bounds(m)?;
            last_six_months.push(MonthTotal {
                month: month::month_str(m),
                expense_total: self.sum_between("expenses", m_start, m_end).await?,
                income_total: self.sum_between("incomes", m_start, m_end).await?,
            });
        }

        let budget_progress = budget_progress(&budgets, &by_category, expense_total);

        let recent = self
            .list_expenses(
                &crate::ExpenseFilter {
                    month: Some(first),
                    ..Default::default()
                },
                crate::ExpenseSort::DateDesc,
                crate::PageRequest {
                    page: 1,
                    per_page: Some(RECENT_EXPENSES),
                    all: false,
                },
            )
            .await?;

        let calendar = self.calendar(first).await?;

        Ok(Dashboard {
            month: month::month_str(first),
            prev_month: month::month_str(month::add_months(first, -1)?),
            next_month: month::month_str(month::add_months(first, 1)?),
            expense_total,
            income_total,
            net_total: income_total - expense_total,
            overall_budget,
            by_category,
            last_six_months,
            budget_progress,
            recent_expenses: recent.expenses,
            calendar,
        })
    }

    pub async fn analytics(&self, month_day: NaiveDate) -> ResultEngine<Analytics> {
        let first = month::first_of_month(month_day);
        let (start, end) = month::month_bounds(first)?;
        let total = self.sum_between("expenses", start, end).await?;
        let by_category = self.category_totals(start, end).await?;

        let mut last_six_months = Vec::with_capacity(TREND_MONTHS as usize);
        for offset in (0..TREND_MONTHS).rev() {
            let m = month::add_months(first, -offset)?;
            let (m_start, m_end) = month::month_bounds(m)?;
            last_six_months.push(MonthSpend {
                month: month::month_str(m),
                total: self.sum_between("expenses", m_start, m_end).await?,
            });
        }

        let mom = self
            .comparison(total, month::add_months(first, -1)?)
            .await?;
        let yoy = self
            .comparison(total, month::add_months(first, -12)?)
            .await?;
        let suggestions = suggestions(total, &by_category, &mom);

        Ok(Analytics {
            month: month::month_str(first),
            total,
            by_category,
            last_six_months,
            mom,
            yoy,
            suggestions,
        })
    }

    async fn comparison(
        &self,
        current: i64,
        reference_month: NaiveDate,
    ) -> ResultEngine<PeriodComparison> {
        let (start, end) = month::month_bounds(reference_month)?;
        let total = self.sum_between("expenses", start, end).await?;
        let pct = if total == 0 {
            None
        } else {
            Some((current - total) as f64 / total as f64 * 100.0)
        };
        Ok(PeriodComparison { total, pct })
    }

    async fn sum_between(&self, table: &str, start: NaiveDate, end: NaiveDate) -> ResultEngine<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) AS total FROM {table} WHERE date >= ? AND date < ?"
        );
        let row = TotalRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            &sql,
            [start.into(), end.into()],
        ))
        .one(&self.database)
        .await?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }

    async fn category_totals(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        let rows = CategoryTotalRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT c.name AS name, COALESCE(SUM(e.amount), 0) AS total \
             FROM expenses e LEFT JOIN categories c ON c.id = e.category_id \
             WHERE e.date >= ? AND e.date < ? \
             GROUP BY e.category_id \
             ORDER BY total DESC, name ASC",
            [start.into(), end.into()],
        ))
        .all(&self.database)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| CategoryTotal {
                name: row.name,
                total: row.total,
            })
            .collect())
    }

    async fn calendar(&self, first: NaiveDate) -> ResultEngine<Vec<Vec<Option<DayCell>>>> {
        let (start, end) = month::month_bounds(first)?;
        let expense_by_day = self.day_sums("expenses", start, end).await?;
        let income_by_day = self.day_sums("incomes", start, end).await?;

        let days = month::days_in_month(first)?;
        let mut weeks: Vec<Vec<Option<DayCell>>> = Vec::new();
        let mut week: Vec<Option<DayCell>> =
            vec![None; first.weekday().num_days_from_monday() as usize];

        for day in 1..=days {
            // Every day of the month is valid by construction.
            let Some(date) = first.with_day(day) else {
                continue;
            };
            week.push(Some(DayCell {
                date,
                expense_total: expense_by_day.get(&date).copied().unwrap_or(0),
                income_total: income_by_day.get(&date).copied().unwrap_or(0),
            }));
            if week.len() == 7 {
                weeks.push(std::mem::take(&mut week));
            }
        }
        if !week.is_empty() {
            week.resize(7, None);
            weeks.push(week);
        }
        Ok(weeks)
    }

    async fn day_sums(
        &self,
        table: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<HashMap<NaiveDate, i64>> {
        let sql = format!(
            "SELECT date, COALESCE(SUM(amount), 0) AS total FROM {table} \
             WHERE date >= ? AND date < ? GROUP BY date"
        );
        let rows = DaySumRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            &sql,
            [start.into(), end.into()],
        ))
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(|row| (row.date, row.total)).collect())
    }
}

fn budget_progress(
    budgets: &[Budget],
    by_category: &[CategoryTotal],
    expense_total: i64,
) -> Vec<BudgetProgressRow> {
    let mut rows = Vec::new();

    if let Some(overall) = budgets.iter().find(|b| b.category_id.is_none()) {
        rows.push(BudgetProgressRow {
            name: None,
            is_overall: true,
            spent: expense_total,
            budget: Some(overall.amount),
            remain: Some(overall.amount - expense_total),
        });
    }

    let spent_by_name: HashMap<Option<&str>, i64> = by_category
        .iter()
        .map(|c| (c.name.as_deref(), c.total))
        .collect();

    let mut budgeted: Vec<&Budget> = budgets.iter().filter(|b| b.category_id.is_some()).collect();
    budgeted.sort_by(|a, b| a.category_name.cmp(&b.category_name));
    for budget in &budgeted {
        let spent = spent_by_name
            .get(&budget.category_name.as_deref())
            .copied()
            .unwrap_or(0);
        rows.push(BudgetProgressRow {
            name: budget.category_name.clone(),
            is_overall: false,
            spent,
            budget: Some(budget.amount),
            remain: Some(budget.amount - spent),
        });
    }

    // Spending in categories without a budget still shows up, after the
    // budgeted rows and in name order.
    let budgeted_names: Vec<Option<&str>> =
        budgeted.iter().map(|b| b.category_name.as_deref()).collect();
    let mut unbudgeted: Vec<&CategoryTotal> = by_category
        .iter()
        .filter(|c| !budgeted_names.contains(&c.name.as_deref()))
        .collect();
    unbudgeted.sort_by(|a, b| a.name.cmp(&b.name));
    for category in unbudgeted {
        rows.push(BudgetProgressRow {
            name: category.name.clone(),
            is_overall: false,
            spent: category.total,
            budget: None,
            remain: None,
        });
    }

    rows
}

fn suggestions(total: i64, by_category: &[CategoryTotal], mom: &PeriodComparison) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(pct) = mom.pct
        && pct > 20.0
    {
        out.push("先月比で20%以上増。固定費（住宅/通信/保険）を点検しましょう。".to_string());
    }

    if total > 0
        && let Some(top) = by_category.first()
    {
        let share = top.total as f64 / total as f64 * 100.0;
        if share > 40.0 {
            let name = top.name.as_deref().unwrap_or("未分類");
            // Truncated, not rounded: 45.9% reads as 45%.
            let share = share as i64;
            out.push(format!(
                "「{name}」が今月の{share}%を占めています。まとめ買い・クーポン活用を検討。"
            ));
        }
    }

    if out.is_empty() {
        out.push(
            "支出は安定しています。来月は貯蓄・投資の自動積立比率を+1〜2%上げるのがおすすめ。"
                .to_string(),
        );
    }

    out
}
