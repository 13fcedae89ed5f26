use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: NaiveDate,
        pub item: String,
        pub amount: i64,
        /// When absent the server guesses a category from the text.
        pub category_id: Option<Uuid>,
        pub memo: Option<String>,
    }

    /// Full-record update; absent options clear the field.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub date: NaiveDate,
        pub item: String,
        pub amount: i64,
        pub category_id: Option<Uuid>,
        pub memo: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub item: String,
        pub amount: i64,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub memo: Option<String>,
        pub receipt_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        /// `YYYY-MM`; defaults to the current month when no explicit bounds
        /// are given.
        pub month: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        /// Substring match against item and memo.
        pub q: Option<String>,
        pub category_id: Option<Uuid>,
        pub sort: Option<ExpenseSort>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
        /// Disable pagination and the month restriction.
        pub all: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        pub total: u64,
        pub page: u64,
        pub per_page: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkDelete {
        pub ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkDeleted {
        pub deleted: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryRow {
        /// `YYYY-MM`.
        pub month: String,
        pub total: i64,
        pub count: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryResponse {
        pub rows: Vec<SummaryRow>,
        pub grand_total: i64,
        pub month_count: u64,
        pub page: u64,
        pub per_page: u64,
    }
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeNew {
        pub date: NaiveDate,
        pub source: String,
        pub amount: i64,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub source: String,
        pub amount: i64,
        pub note: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeListQuery {
        /// `YYYY-MM`; defaults to the current month.
        pub month: Option<String>,
        pub page: Option<u64>,
        pub per_page: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeListResponse {
        pub incomes: Vec<IncomeView>,
        pub total: u64,
        pub page: u64,
        pub per_page: u64,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        /// `YYYY-MM`.
        pub month: String,
        /// `None` sets the overall cap for the month.
        pub category_id: Option<Uuid>,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        /// `YYYY-MM`.
        pub month: String,
        pub category_id: Option<Uuid>,
        pub category_name: Option<String>,
        pub amount: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetListQuery {
        /// `YYYY-MM`; defaults to the current month.
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub archived: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryListQuery {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleNew {
        pub keyword: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RuleView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub keyword: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GuessQuery {
        pub item: Option<String>,
        pub memo: Option<String>,
        /// Category already picked by the user; it wins over any guess.
        pub category: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GuessResponse {
        pub category: Option<CategoryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Seeded {
        pub created: u64,
    }
}

pub mod receipt {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StagedLineNew {
        pub item: String,
        pub amount: i64,
        pub raw_text: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptStage {
        pub date: NaiveDate,
        /// Declared total in integer yen.
        pub total: i64,
        /// Base64-encoded photo, stored under the media directory.
        pub image_base64: Option<String>,
        pub lines: Vec<StagedLineNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptLineView {
        pub id: Uuid,
        pub item: String,
        pub amount: i64,
        pub category_id: Option<Uuid>,
        pub raw_text: Option<String>,
        pub position: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub total: i64,
        pub lines_total: i64,
        pub image_path: Option<String>,
        pub committed: bool,
        pub lines: Vec<ReceiptLineView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptListResponse {
        pub receipts: Vec<ReceiptView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReceiptListQuery {
        /// When true only uncommitted drafts are returned.
        pub pending: Option<bool>,
    }

    /// One line as edited on the review screen; the amount arrives as free
    /// text and is reduced to its digits.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LineEditNew {
        pub item: String,
        pub amount: String,
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptLinesUpdate {
        pub total: Option<i64>,
        pub lines: Vec<LineEditNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReceiptCommitted {
        /// How many expenses the commit created.
        pub created: u64,
    }
}

pub mod report {
    use super::*;
    use crate::expense::ExpenseView;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthQuery {
        /// `YYYY-MM`; defaults to the current month.
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotalView {
        /// `None` groups uncategorized expenses.
        pub name: Option<String>,
        pub total: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthTotalView {
        /// `YYYY-MM`.
        pub month: String,
        pub expense_total: i64,
        pub income_total: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthSpendView {
        pub month: String,
        pub total: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetProgressView {
        pub name: Option<String>,
        pub is_overall: bool,
        pub spent: i64,
        pub budget: Option<i64>,
        pub remain: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DayCellView {
        pub date: NaiveDate,
        pub expense_total: i64,
        pub income_total: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ComparisonView {
        pub total: i64,
        /// Percentage change; `None` when the reference total is zero.
        pub pct: Option<f64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardResponse {
        pub month: String,
        pub prev_month: String,
        pub next_month: String,
        pub expense_total: i64,
        pub income_total: i64,
        pub net_total: i64,
        pub overall_budget: Option<i64>,
        pub by_category: Vec<CategoryTotalView>,
        pub last_six_months: Vec<MonthTotalView>,
        pub budget_progress: Vec<BudgetProgressView>,
        pub recent_expenses: Vec<ExpenseView>,
        /// Monday-first weeks; `null` pads days outside the month.
        pub calendar: Vec<Vec<Option<DayCellView>>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyticsResponse {
        pub month: String,
        pub total: i64,
        pub by_category: Vec<CategoryTotalView>,
        pub last_six_months: Vec<MonthSpendView>,
        pub mom: ComparisonView,
        pub yoy: ComparisonView,
        pub suggestions: Vec<String>,
    }
}
