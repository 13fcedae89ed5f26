//! Budget API endpoints.

use api_types::budget::{BudgetListQuery, BudgetListResponse, BudgetNew, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, parse_month_param, server::ServerState, user};

fn view(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        month: engine::month::month_str(budget.month),
        category_id: budget.category_id,
        category_name: budget.category_name,
        amount: budget.amount,
    }
}

fn new_of(payload: BudgetNew) -> Result<engine::NewBudget, ServerError> {
    let month = engine::month::parse_month(&payload.month)
        .ok_or_else(|| ServerError::Generic(format!("invalid month: {}", payload.month)))?;
    Ok(engine::NewBudget {
        month,
        category_id: payload.category_id,
        amount: payload.amount,
    })
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state.engine.create_budget(new_of(payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(budget))))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<BudgetListQuery>,
) -> Result<Json<BudgetListResponse>, ServerError> {
    let month = parse_month_param(query.month.as_deref());
    let budgets = state.engine.list_budgets(month).await?;
    Ok(Json(BudgetListResponse {
        budgets: budgets.into_iter().map(view).collect(),
    }))
}

pub async fn detail(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget(id).await?;
    Ok(Json(view(budget)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetNew>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.update_budget(id, new_of(payload)?).await?;
    Ok(Json(view(budget)))
}

pub async fn delete(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
