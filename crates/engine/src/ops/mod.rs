use std::path::PathBuf;

use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod budgets;
mod categories;
mod expenses;
mod incomes;
mod receipts;
mod reports;

pub use budgets::NewBudget;
pub use expenses::{
    ExpenseFilter, ExpensePage, ExpenseSort, ExpenseUpdate, MonthlySummaryPage, MonthlySummaryRow,
    NewExpense, PageRequest,
};
pub use incomes::{IncomePage, NewIncome};
pub use receipts::{LineEdit, StagedLine};
pub use reports::{
    Analytics, BudgetProgressRow, CategoryTotal, Dashboard, DayCell, MonthSpend, MonthTotal,
    PeriodComparison,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    media_dir: PathBuf,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    media_dir: PathBuf,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            media_dir: PathBuf::from("./media"),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Directory where receipt images are stored (default `./media`).
    pub fn media_dir(mut self, dir: impl Into<PathBuf>) -> EngineBuilder {
        self.media_dir = dir.into();
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            media_dir: self.media_dir,
        })
    }
}
