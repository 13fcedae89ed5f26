use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod budgets;
mod categories;
mod expenses;
mod incomes;
mod receipts;
mod reports;
mod server;
mod user;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{
            BulkDelete, BulkDeleted, ExpenseListQuery, ExpenseListResponse, ExpenseNew,
            ExpenseSort, ExpenseUpdate, ExpenseView, SummaryResponse, SummaryRow,
        };
    }

    pub mod income {
        pub use api_types::income::{IncomeListQuery, IncomeListResponse, IncomeNew, IncomeView};
    }

    pub mod budget {
        pub use api_types::budget::{BudgetListQuery, BudgetListResponse, BudgetNew, BudgetView};
    }

    pub mod category {
        pub use api_types::category::{
            CategoryListQuery, CategoryNew, CategoryUpdate, CategoryView, GuessQuery,
            GuessResponse, RuleNew, RuleView, Seeded,
        };
    }

    pub mod receipt {
        pub use api_types::receipt::{
            LineEditNew, ReceiptCommitted, ReceiptLineView, ReceiptLinesUpdate, ReceiptListQuery,
            ReceiptListResponse, ReceiptStage, ReceiptView, StagedLineNew,
        };
    }

    pub mod report {
        pub use api_types::report::{AnalyticsResponse, DashboardResponse, MonthQuery};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidImage(_)
        | EngineError::ReceiptMismatch(_)
        | EngineError::AlreadyCommitted(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Storage(io_err) => {
            tracing::error!("storage error: {io_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parse an optional `YYYY-MM` query value. Missing or unparseable input
/// falls back to the current month.
fn parse_month_param(month: Option<&str>) -> chrono::NaiveDate {
    month
        .and_then(engine::month::parse_month)
        .unwrap_or_else(|| engine::month::first_of_month(chrono::Utc::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res =
            ServerError::from(EngineError::ReceiptMismatch("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res =
            ServerError::from(EngineError::AlreadyCommitted("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn month_param_falls_back_to_the_current_month() {
        let current = engine::month::first_of_month(chrono::Utc::now().date_naive());
        assert_eq!(parse_month_param(None), current);
        assert_eq!(parse_month_param(Some("2025-13")), current);
        assert_eq!(parse_month_param(Some("june")), current);
        assert_eq!(
            parse_month_param(Some("2025-06")),
            chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn server_error_is_debuggable() {
        let err = ServerError::from(EngineError::KeyNotFound("x".to_string()));
        assert!(format!("{err:?}").contains("KeyNotFound"));
    }
}
