use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Catalog item master
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Item number must be between 1 and 50 characters"
    ))]
    pub item_number: String,

    pub description: Option<String>,

    #[validate(length(
        min = 1,
        max = 10,
        message = "Unit of measure code must be between 1 and 10 characters"
    ))]
    pub primary_uom_code: String,

    pub list_price: Decimal,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_supplier::Entity")]
    ItemSuppliers,
    #[sea_orm(has_many = "super::stock_level::Entity")]
    StockLevels,
    #[sea_orm(has_many = "super::requisition_line::Entity")]
    RequisitionLines,
}

impl Related<super::item_supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemSuppliers.def()
    }
}

impl Related<super::stock_level::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLevels.def()
    }
}

impl Related<super::requisition_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequisitionLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
