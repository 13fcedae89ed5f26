//! Income API endpoints.

use api_types::income::{IncomeListQuery, IncomeListResponse, IncomeNew, IncomeView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, parse_month_param, server::ServerState, user};

fn view(income: engine::Income) -> IncomeView {
    IncomeView {
        id: income.id,
        date: income.date,
        source: income.source,
        amount: income.amount,
        note: income.note,
    }
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<IncomeView>), ServerError> {
    let income = state
        .engine
        .create_income(engine::NewIncome {
            date: payload.date,
            source: payload.source,
            amount: payload.amount,
            note: payload.note,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view(income))))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<IncomeListQuery>,
) -> Result<Json<IncomeListResponse>, ServerError> {
    let month = parse_month_param(query.month.as_deref());
    let page = state
        .engine
        .list_incomes(month, query.page.unwrap_or(1), query.per_page)
        .await?;
    Ok(Json(IncomeListResponse {
        incomes: page.incomes.into_iter().map(view).collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

pub async fn detail(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncomeView>, ServerError> {
    let income = state.engine.income(id).await?;
    Ok(Json(view(income)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IncomeNew>,
) -> Result<Json<IncomeView>, ServerError> {
    let income = state
        .engine
        .update_income(
            id,
            engine::NewIncome {
                date: payload.date,
                source: payload.source,
                amount: payload.amount,
                note: payload.note,
            },
        )
        .await?;
    Ok(Json(view(income)))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_income(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
