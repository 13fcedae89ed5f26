//! Household ledger engine: expenses, incomes, categories, budgets and
//! receipt intake over a sea-orm database.

pub use budgets::Budget;
pub use categories::Category;
pub use category_rules::CategoryRule;
pub use error::EngineError;
pub use expenses::Expense;
pub use incomes::Income;
pub use ops::{
    Analytics, BudgetProgressRow, CategoryTotal, Dashboard, DayCell, Engine, EngineBuilder,
    ExpenseFilter, ExpensePage, ExpenseSort, ExpenseUpdate, IncomePage, LineEdit, MonthSpend,
    MonthTotal, MonthlySummaryPage, MonthlySummaryRow, NewBudget, NewExpense, NewIncome,
    PageRequest, PeriodComparison, StagedLine,
};
pub use receipt_lines::ReceiptLine;
pub use receipts::{MAX_LINE_AMOUNT, Receipt, is_noise_line};

pub mod month;

mod budgets;
mod categories;
mod category_rules;
mod error;
mod expenses;
mod incomes;
mod ops;
mod receipt_lines;
mod receipts;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
