//! Receipt line items.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub item: String,
    pub amount: i64,
    pub category_id: Option<Uuid>,
    /// The raw extracted text the line came from, kept for review.
    pub raw_text: Option<String>,
    pub position: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "receipt_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub receipt_id: Uuid,
    pub item: String,
    pub amount: i64,
    pub category_id: Option<Uuid>,
    pub raw_text: Option<String>,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::receipts::Entity",
        from = "Column::ReceiptId",
        to = "super::receipts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Receipt,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::receipts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipt.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ReceiptLine> for ActiveModel {
    fn from(line: &ReceiptLine) -> Self {
        Self {
            id: ActiveValue::Set(line.id),
            receipt_id: ActiveValue::Set(line.receipt_id),
            item: ActiveValue::Set(line.item.clone()),
            amount: ActiveValue::Set(line.amount),
            category_id: ActiveValue::Set(line.category_id),
            raw_text: ActiveValue::Set(line.raw_text.clone()),
            position: ActiveValue::Set(line.position),
        }
    }
}

impl From<Model> for ReceiptLine {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            receipt_id: model.receipt_id,
            item: model.item,
            amount: model.amount,
            category_id: model.category_id,
            raw_text: model.raw_text,
            position: model.position,
        }
    }
}
