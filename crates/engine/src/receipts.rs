//! Receipt primitives and the intake noise filter.
//!
//! A receipt is staged as a draft (date, declared total, optional photo,
//! extracted lines), reviewed, then committed into one expense per line.
//! Committing requires the declared total to equal the sum of the lines.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::receipt_lines::ReceiptLine;

/// Line amounts above this are assumed to be scanner noise (phone numbers,
/// card digits) rather than a purchase.
pub const MAX_LINE_AMOUNT: i64 = 300_000;

/// Markers of non-purchase lines on Japanese receipts: subtotal/total rows,
/// tax rows, register metadata, loyalty points. Matched on NFKC-folded,
/// lowercased text.
const SKIP_MARKERS: &[&str] = &[
    "小計",
    "合計",
    "消費税",
    "内税",
    "外税",
    "領収",
    "お会計",
    "会計",
    "担当",
    "レジ",
    "番号",
    "no.",
    "有効期限",
    "tel",
    "電話",
    "ポイント",
    "t-point",
    "tpoint",
    "dポイント",
    "楽天ポイント",
];

/// Decide whether an extracted line should be dropped during staging.
///
/// Mirrors the filters applied at upload time: blank or 1-char items,
/// subtotal/tax/register markers, bare 1-2 letter codes, long digit runs
/// and implausibly large amounts.
pub fn is_noise_line(item: &str, amount: i64) -> bool {
    let trimmed = item.trim();
    if trimmed.chars().count() < 2 {
        return true;
    }

    let folded = crate::util::normalize_match_text(trimmed);
    if SKIP_MARKERS.iter().any(|marker| folded.contains(marker)) {
        return true;
    }

    // Bare register codes: one or two ASCII letters and nothing else.
    if trimmed.chars().count() <= 2 && trimmed.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return true;
    }

    // Long digit runs are phone numbers or card tails, not items.
    if trimmed.chars().count() >= 6 && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return true;
    }

    amount > MAX_LINE_AMOUNT
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: Uuid,
    /// Purchase date applied to every expense created from this receipt.
    pub date: NaiveDate,
    /// Declared total in integer yen; must equal the sum of the lines at
    /// commit time.
    pub total: i64,
    pub image_path: Option<String>,
    pub committed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
}

impl Receipt {
    pub fn lines_total(&self) -> i64 {
        self.lines.iter().map(|line| line.amount).sum()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: Date,
    pub total: i64,
    pub image_path: Option<String>,
    pub committed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::receipt_lines::Entity")]
    Lines,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::receipt_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Receipt> for ActiveModel {
    fn from(receipt: &Receipt) -> Self {
        Self {
            id: ActiveValue::Set(receipt.id),
            date: ActiveValue::Set(receipt.date),
            total: ActiveValue::Set(receipt.total),
            image_path: ActiveValue::Set(receipt.image_path.clone()),
            committed_at: ActiveValue::Set(receipt.committed_at),
            created_at: ActiveValue::Set(receipt.created_at),
        }
    }
}

impl From<Model> for Receipt {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            total: model.total,
            image_path: model.image_path,
            committed_at: model.committed_at,
            created_at: model.created_at,
            lines: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_ordinary_purchase_lines() {
        assert!(!is_noise_line("牛乳", 238));
        assert!(!is_noise_line("お弁当", 498));
    }

    #[test]
    fn drops_totals_tax_and_points() {
        assert!(is_noise_line("小計", 1280));
        assert!(is_noise_line("合計", 1380));
        assert!(is_noise_line("消費税等", 100));
        assert!(is_noise_line("Tポイント", 12));
        // Half-width katakana folds to the same marker.
        assert!(is_noise_line("ﾎﾟｲﾝﾄ残高", 340));
    }

    #[test]
    fn drops_codes_digit_runs_and_blanks() {
        assert!(is_noise_line("A", 100));
        assert!(is_noise_line("AB", 100));
        assert!(is_noise_line("0312345678", 0));
        assert!(is_noise_line("", 500));
        assert!(is_noise_line(" ", 500));
    }

    #[test]
    fn drops_implausible_amounts() {
        assert!(is_noise_line("ティッシュ", 300_001));
        assert!(!is_noise_line("ティッシュ", 300_000));
    }
}
