use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "confirmed")]
    Confirmed,

    #[sea_orm(string_value = "received")]
    Received,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseOrderStatus::Draft => write!(f, "draft"),
            PurchaseOrderStatus::Confirmed => write!(f, "confirmed"),
            PurchaseOrderStatus::Received => write!(f, "received"),
            PurchaseOrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Purchase order generated for one supplier of a requisition
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "PO number must be between 1 and 50 characters"
    ))]
    pub po_number: String,

    pub supplier_id: Uuid,

    /// Folio of the requisition this order was generated from
    pub origin: String,

    pub planned_date: Option<NaiveDate>,

    pub status: PurchaseOrderStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_line::Entity")]
    PurchaseOrderLines,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::purchase_order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrderLines.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
