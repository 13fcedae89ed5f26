//! Category API endpoints, including keyword rules and the guesser.

use api_types::category::{
    CategoryListQuery, CategoryNew, CategoryUpdate, CategoryView, GuessQuery, GuessResponse,
    RuleNew, RuleView, Seeded,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        archived: category.archived,
    }
}

fn rule_view(rule: engine::CategoryRule) -> RuleView {
    RuleView {
        id: rule.id,
        category_id: rule.category_id,
        keyword: rule.keyword,
    }
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories(query.include_archived.unwrap_or(false))
        .await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn create(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.engine.create_category(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn detail(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id).await?;
    Ok(Json(view(category)))
}

pub async fn update(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(id, payload.name.as_deref(), payload.archived)
        .await?;
    Ok(Json(view(category)))
}

pub async fn seed(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Seeded>, ServerError> {
    let created = state.engine.seed_default_categories().await?;
    Ok(Json(Seeded { created }))
}

pub async fn guess(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<GuessQuery>,
) -> Result<Json<GuessResponse>, ServerError> {
    let category = state
        .engine
        .guess_category(
            query.item.as_deref().unwrap_or(""),
            query.memo.as_deref().unwrap_or(""),
            query.category,
        )
        .await?;
    Ok(Json(GuessResponse {
        category: category.map(view),
    }))
}

pub async fn list_rules(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RuleView>>, ServerError> {
    let rules = state.engine.list_category_rules(id).await?;
    Ok(Json(rules.into_iter().map(rule_view).collect()))
}

pub async fn create_rule(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RuleNew>,
) -> Result<(StatusCode, Json<RuleView>), ServerError> {
    let rule = state.engine.create_category_rule(id, &payload.keyword).await?;
    Ok((StatusCode::CREATED, Json(rule_view(rule))))
}

pub async fn delete_rule(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path((id, rule_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category_rule(id, rule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
