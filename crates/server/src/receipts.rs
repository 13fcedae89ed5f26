//! Receipt intake API endpoints: stage, review, commit, discard.

use api_types::receipt::{
    ReceiptCommitted, ReceiptLineView, ReceiptLinesUpdate, ReceiptListQuery, ReceiptListResponse,
    ReceiptStage, ReceiptView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(receipt: engine::Receipt) -> ReceiptView {
    let lines_total = receipt.lines_total();
    ReceiptView {
        id: receipt.id,
        date: receipt.date,
        total: receipt.total,
        lines_total,
        image_path: receipt.image_path,
        committed: receipt.committed_at.is_some(),
        lines: receipt
            .lines
            .into_iter()
            .map(|line| ReceiptLineView {
                id: line.id,
                item: line.item,
                amount: line.amount,
                category_id: line.category_id,
                raw_text: line.raw_text,
                position: line.position,
            })
            .collect(),
    }
}

pub async fn stage(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptStage>,
) -> Result<(StatusCode, Json<ReceiptView>), ServerError> {
    let lines = payload
        .lines
        .into_iter()
        .map(|line| engine::StagedLine {
            item: line.item,
            amount: line.amount,
            raw_text: line.raw_text,
        })
        .collect();
    let receipt = state
        .engine
        .stage_receipt(
            payload.date,
            payload.total,
            payload.image_base64.as_deref(),
            lines,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(receipt))))
}

pub async fn list(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ReceiptListQuery>,
) -> Result<Json<ReceiptListResponse>, ServerError> {
    let receipts = state
        .engine
        .list_receipts(query.pending.unwrap_or(true))
        .await?;
    Ok(Json(ReceiptListResponse {
        receipts: receipts.into_iter().map(view).collect(),
    }))
}

pub async fn detail(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceiptView>, ServerError> {
    let receipt = state.engine.receipt(id).await?;
    Ok(Json(view(receipt)))
}

pub async fn replace_lines(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiptLinesUpdate>,
) -> Result<Json<ReceiptView>, ServerError> {
    let edits = payload
        .lines
        .into_iter()
        .map(|line| engine::LineEdit {
            item: line.item,
            amount: line.amount,
            category_id: line.category_id,
        })
        .collect();
    let receipt = state
        .engine
        .replace_receipt_lines(id, payload.total, edits)
        .await?;
    Ok(Json(view(receipt)))
}

pub async fn commit(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReceiptCommitted>, ServerError> {
    let created = state.engine.commit_receipt(id).await?;
    Ok(Json(ReceiptCommitted { created }))
}

pub async fn discard(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.discard_receipt(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
