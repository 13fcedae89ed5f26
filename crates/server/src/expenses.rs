//! Expense API endpoints.

use api_types::expense::{
    BulkDelete, BulkDeleted, ExpenseListQuery, ExpenseListResponse, ExpenseNew, ExpenseSort,
    ExpenseUpdate, ExpenseView, SummaryResponse, SummaryRow,
};
use api_types::report::MonthQuery;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{ServerError, parse_month_param, server::ServerState, user};

pub(crate) fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        date: expense.date,
        item: expense.item,
        amount: expense.amount,
        category_id: expense.category_id,
        category_name: expense.category_name,
        memo: expense.memo,
        receipt_id: expense.receipt_id,
    }
}

fn sort_of(sort: Option<ExpenseSort>) -> engine::ExpenseSort {
    match sort.unwrap_or_default() {
        ExpenseSort::DateDesc => engine::ExpenseSort::DateDesc,
        ExpenseSort::DateAsc => engine::ExpenseSort::DateAsc,
        ExpenseSort::AmountDesc => engine::ExpenseSort::AmountDesc,
        ExpenseSort::AmountAsc => engine::ExpenseSort::AmountAsc,
        ExpenseSort::ItemAsc => engine::ExpenseSort::ItemAsc,
        ExpenseSort::ItemDesc => engine::ExpenseSort::ItemDesc,
        ExpenseSort::CategoryAsc => engine::ExpenseSort::CategoryAsc,
        ExpenseSort::CategoryDesc => engine::ExpenseSort::CategoryDesc,
    }
}

fn filter_of(query: &ExpenseListQuery) -> engine::ExpenseFilter {
    engine::ExpenseFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        q: query.q.clone(),
        category_id: query.category_id,
        // An unparseable month is ignored; the listing then defaults to the
        // current month.
        month: query.month.as_deref().and_then(engine::month::parse_month),
    }
}

fn page_of(query: &ExpenseListQuery) -> engine::PageRequest {
    engine::PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page,
        all: query.all.unwrap_or(false),
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state
        .engine
        .create_expense(engine::NewExpense {
            date: payload.date,
            item: payload.item,
            amount: payload.amount,
            category_id: payload.category_id,
            memo: payload.memo,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view(expense))))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let filter = filter_of(&query);
    let page = state
        .engine
        .list_expenses(&filter, sort_of(query.sort), page_of(&query))
        .await?;
    Ok(Json(ExpenseListResponse {
        expenses: page.expenses.into_iter().map(view).collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

pub async fn detail(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(id).await?;
    Ok(Json(view(expense)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            id,
            engine::ExpenseUpdate {
                date: payload.date,
                item: payload.item,
                amount: payload.amount,
                category_id: payload.category_id,
                memo: payload.memo,
            },
        )
        .await?;
    Ok(Json(view(expense)))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BulkDelete>,
) -> Result<Json<BulkDeleted>, ServerError> {
    let deleted = state.engine.delete_expenses(&payload.ids).await?;
    Ok(Json(BulkDeleted { deleted }))
}

pub async fn summary(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<SummaryResponse>, ServerError> {
    let filter = filter_of(&query);
    let summary = state
        .engine
        .monthly_summary(&filter, page_of(&query))
        .await?;
    Ok(Json(SummaryResponse {
        rows: summary
            .rows
            .into_iter()
            .map(|row| SummaryRow {
                month: row.month,
                total: row.total,
                count: row.count,
            })
            .collect(),
        grand_total: summary.grand_total,
        month_count: summary.month_count,
        page: summary.page,
        per_page: summary.per_page,
    }))
}

/// One month of expenses as a CSV attachment.
pub async fn export_csv(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let month = parse_month_param(query.month.as_deref());
    let expenses = state.engine.expenses_for_month(month).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["date", "item", "amount", "category", "memo"])
        .map_err(|err| ServerError::Generic(err.to_string()))?;
    for expense in expenses {
        writer
            .write_record([
                expense.date.to_string(),
                expense.item,
                expense.amount.to_string(),
                expense.category_name.unwrap_or_default(),
                expense.memo.unwrap_or_default(),
            ])
            .map_err(|err| ServerError::Generic(err.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    let filename = format!(
        "attachment; filename=\"expenses-{}.csv\"",
        engine::month::month_str(month)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        bytes,
    ))
}
