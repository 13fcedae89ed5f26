//! Receipt intake: staging, review edits, commit and discard.
//!
//! A staged receipt holds the extracted lines for review. Committing turns
//! every kept line into an expense in one transaction, but only when the
//! declared total equals the sum of the lines.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, Receipt, ReceiptLine, ResultEngine, expenses, is_noise_line,
    receipt_lines, receipts,
    util::{normalize_display, parse_amount_digits},
};

use super::{Engine, with_tx};

/// One extracted line as it arrives from the upload, before filtering.
#[derive(Clone, Debug)]
pub struct StagedLine {
    pub item: String,
    pub amount: i64,
    pub raw_text: Option<String>,
}

/// One line as edited on the review screen. The amount arrives as free text
/// and is reduced to its digits.
#[derive(Clone, Debug)]
pub struct LineEdit {
    pub item: String,
    pub amount: String,
    pub category_id: Option<Uuid>,
}

impl Engine {
    /// Stage a receipt draft: drop noise lines, guess a category per kept
    /// line and store the optional photo under the media directory.
    pub async fn stage_receipt(
        &self,
        date: NaiveDate,
        total: i64,
        image_base64: Option<&str>,
        lines: Vec<StagedLine>,
    ) -> ResultEngine<Receipt> {
        if total < 1 {
            return Err(EngineError::InvalidAmount(
                "receipt total must be >= 1".to_string(),
            ));
        }

        let receipt_id = Uuid::new_v4();
        let image_path = match image_base64 {
            Some(encoded) => Some(self.store_image(receipt_id, encoded)?),
            None => None,
        };

        let mut kept = Vec::new();
        for staged in lines {
            let item = match normalize_display(&staged.item) {
                Some(item) => item,
                None => continue,
            };
            if is_noise_line(&item, staged.amount) {
                continue;
            }
            let guessed = self.guess_category(&item, "", None).await?;
            kept.push(ReceiptLine {
                id: Uuid::new_v4(),
                receipt_id,
                item,
                amount: staged.amount,
                category_id: guessed.map(|c| c.id),
                raw_text: staged.raw_text.clone(),
                position: kept.len() as i32,
            });
        }

        let receipt = Receipt {
            id: receipt_id,
            date,
            total,
            image_path,
            committed_at: None,
            created_at: Utc::now(),
            lines: kept,
        };

        with_tx!(self, |tx| {
            receipts::ActiveModel::from(&receipt).insert(&tx).await?;
            if !receipt.lines.is_empty() {
                receipt_lines::Entity::insert_many(
                    receipt.lines.iter().map(receipt_lines::ActiveModel::from),
                )
                .exec(&tx)
                .await?;
            }
            Ok::<_, EngineError>(())
        })?;

        Ok(receipt)
    }

    pub async fn receipt(&self, receipt_id: Uuid) -> ResultEngine<Receipt> {
        let model = receipts::Entity::find_by_id(receipt_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("receipt not exists".to_string()))?;
        let lines = receipt_lines::Entity::find()
            .filter(receipt_lines::Column::ReceiptId.eq(receipt_id))
            .order_by_asc(receipt_lines::Column::Position)
            .all(&self.database)
            .await?;
        let mut receipt = Receipt::from(model);
        receipt.lines = lines.into_iter().map(ReceiptLine::from).collect();
        Ok(receipt)
    }

    /// Pending drafts for the review screen, or the whole history.
    pub async fn list_receipts(&self, pending_only: bool) -> ResultEngine<Vec<Receipt>> {
        let mut query = receipts::Entity::find().order_by_desc(receipts::Column::CreatedAt);
        if pending_only {
            query = query.filter(receipts::Column::CommittedAt.is_null());
        }
        let models = query.all(&self.database).await?;
        let mut receipts = Vec::with_capacity(models.len());
        for model in models {
            let lines = receipt_lines::Entity::find()
                .filter(receipt_lines::Column::ReceiptId.eq(model.id))
                .order_by_asc(receipt_lines::Column::Position)
                .all(&self.database)
                .await?;
            let mut receipt = Receipt::from(model);
            receipt.lines = lines.into_iter().map(ReceiptLine::from).collect();
            receipts.push(receipt);
        }
        Ok(receipts)
    }

    /// Replace the lines (and optionally the declared total) of an
    /// uncommitted draft. Blank items are dropped, amounts are reduced to
    /// their digits.
    pub async fn replace_receipt_lines(
        &self,
        receipt_id: Uuid,
        total: Option<i64>,
        edits: Vec<LineEdit>,
    ) -> ResultEngine<Receipt> {
        let receipt = self.receipt(receipt_id).await?;
        if receipt.committed_at.is_some() {
            return Err(EngineError::AlreadyCommitted(receipt_id.to_string()));
        }
        if let Some(total) = total
            && total < 1
        {
            return Err(EngineError::InvalidAmount(
                "receipt total must be >= 1".to_string(),
            ));
        }

        let mut lines = Vec::new();
        for edit in edits {
            let item = match normalize_display(&edit.item) {
                Some(item) => item,
                None => continue,
            };
            lines.push(ReceiptLine {
                id: Uuid::new_v4(),
                receipt_id,
                item,
                amount: parse_amount_digits(&edit.amount),
                category_id: edit.category_id,
                raw_text: None,
                position: lines.len() as i32,
            });
        }

        with_tx!(self, |tx| {
            receipt_lines::Entity::delete_many()
                .filter(receipt_lines::Column::ReceiptId.eq(receipt_id))
                .exec(&tx)
                .await?;
            if !lines.is_empty() {
                receipt_lines::Entity::insert_many(
                    lines.iter().map(receipt_lines::ActiveModel::from),
                )
                .exec(&tx)
                .await?;
            }
            if let Some(total) = total {
                let mut active: receipts::ActiveModel =
                    receipts::ActiveModel::new();
                active.id = ActiveValue::Unchanged(receipt_id);
                active.total = ActiveValue::Set(total);
                receipts::Entity::update(active).exec(&tx).await?;
            }
            Ok::<_, EngineError>(())
        })?;

        self.receipt(receipt_id).await
    }

    /// Turn every kept line into an expense, dated with the receipt date and
    /// linked back to the receipt. Fails when the declared total disagrees
    /// with the sum of the lines. Returns how many expenses were created.
    pub async fn commit_receipt(&self, receipt_id: Uuid) -> ResultEngine<u64> {
        let receipt = self.receipt(receipt_id).await?;
        if receipt.committed_at.is_some() {
            return Err(EngineError::AlreadyCommitted(receipt_id.to_string()));
        }

        let kept: Vec<&ReceiptLine> = receipt
            .lines
            .iter()
            .filter(|line| !line.item.trim().is_empty() && line.amount >= 1)
            .collect();
        let lines_total: i64 = kept.iter().map(|line| line.amount).sum();
        if lines_total != receipt.total {
            return Err(EngineError::ReceiptMismatch(format!(
                "declared total {} but lines sum to {lines_total}",
                receipt.total
            )));
        }

        let now = Utc::now();
        let mut new_expenses = Vec::with_capacity(kept.len());
        for line in &kept {
            let mut expense = Expense::new(
                receipt.date,
                line.item.clone(),
                line.amount,
                line.category_id,
                None,
                now,
            )?;
            expense.receipt_id = Some(receipt_id);
            new_expenses.push(expense);
        }

        with_tx!(self, |tx| {
            if !new_expenses.is_empty() {
                expenses::Entity::insert_many(
                    new_expenses.iter().map(expenses::ActiveModel::from),
                )
                .exec(&tx)
                .await?;
            }
            let mut active = receipts::ActiveModel::new();
            active.id = ActiveValue::Unchanged(receipt_id);
            active.committed_at = ActiveValue::Set(Some(now));
            receipts::Entity::update(active).exec(&tx).await?;
            Ok::<_, EngineError>(())
        })?;

        Ok(new_expenses.len() as u64)
    }

    /// Drop an uncommitted draft together with its lines and stored photo.
    pub async fn discard_receipt(&self, receipt_id: Uuid) -> ResultEngine<()> {
        let receipt = self.receipt(receipt_id).await?;
        if receipt.committed_at.is_some() {
            return Err(EngineError::AlreadyCommitted(receipt_id.to_string()));
        }

        with_tx!(self, |tx| {
            receipt_lines::Entity::delete_many()
                .filter(receipt_lines::Column::ReceiptId.eq(receipt_id))
                .exec(&tx)
                .await?;
            receipts::Entity::delete_by_id(receipt_id).exec(&tx).await?;
            Ok::<_, EngineError>(())
        })?;

        if let Some(path) = receipt.image_path {
            // Best effort; a missing file must not fail the discard.
            let _ = std::fs::remove_file(self.media_dir.join(path));
        }
        Ok(())
    }

    fn store_image(&self, receipt_id: Uuid, encoded: &str) -> ResultEngine<String> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|err| EngineError::InvalidImage(err.to_string()))?;
        if bytes.is_empty() {
            return Err(EngineError::InvalidImage("empty image".to_string()));
        }
        let relative = PathBuf::from("receipts").join(format!("{receipt_id}.jpg"));
        let absolute = self.media_dir.join(&relative);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&absolute, bytes)?;
        Ok(relative.to_string_lossy().into_owned())
    }
}
