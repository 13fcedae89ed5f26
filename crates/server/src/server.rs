use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{budgets, categories, expenses, incomes, receipts, reports, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/bulkDelete", post(expenses::bulk_delete))
        .route("/expenses/summary", get(expenses::summary))
        .route("/expenses/export", get(expenses::export_csv))
        .route(
            "/expenses/{id}",
            get(expenses::detail)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/incomes", get(incomes::list).post(incomes::create))
        .route(
            "/incomes/{id}",
            get(incomes::detail)
                .put(incomes::update)
                .delete(incomes::delete),
        )
        .route("/budgets", get(budgets::list).post(budgets::create))
        .route(
            "/budgets/{id}",
            get(budgets::detail)
                .put(budgets::update)
                .delete(budgets::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route("/categories/seed", post(categories::seed))
        .route("/categories/guess", get(categories::guess))
        .route(
            "/categories/{id}",
            get(categories::detail).patch(categories::update),
        )
        .route(
            "/categories/{id}/rules",
            get(categories::list_rules).post(categories::create_rule),
        )
        .route(
            "/categories/{id}/rules/{rule_id}",
            axum::routing::delete(categories::delete_rule),
        )
        .route("/receipts", get(receipts::list).post(receipts::stage))
        .route(
            "/receipts/{id}",
            get(receipts::detail).delete(receipts::discard),
        )
        .route("/receipts/{id}/lines", put(receipts::replace_lines))
        .route("/receipts/{id}/commit", post(receipts::commit))
        .route("/dashboard", get(reports::dashboard))
        .route("/analytics", get(reports::analytics))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
