use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// One requested product entry, owned by exactly one requisition
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "requisition_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub requisition_id: Uuid,

    /// Position within the requisition; generators process lines in this order.
    pub line_number: i32,

    pub item_id: Uuid,

    #[validate(custom = "validate_non_negative_qty")]
    pub requested_qty: Decimal,

    /// Quantity to procure for this line; consumed by purchase order
    /// generation, zero means nothing to buy.
    #[validate(custom = "validate_non_negative_qty")]
    pub ordered_qty: Decimal,

    pub source_location_id: Uuid,

    pub purchase_order_id: Option<Uuid>,

    pub stock_picking_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requisition::Entity",
        from = "Column::RequisitionId",
        to = "super::requisition::Column::Id"
    )]
    Requisition,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
    #[sea_orm(
        belongs_to = "super::stock_location::Entity",
        from = "Column::SourceLocationId",
        to = "super::stock_location::Column::Id"
    )]
    SourceLocation,
}

impl Related<super::requisition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requisition.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Quantities on a line may be zero but never negative
fn validate_non_negative_qty(qty: &Decimal) -> Result<(), ValidationError> {
    if qty.is_sign_negative() && !qty.is_zero() {
        let mut err = ValidationError::new("negative_quantity");
        err.message = Some("Quantity must be non-negative".into());
        return Err(err);
    }
    Ok(())
}
