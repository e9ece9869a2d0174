use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Fulfillment document status. Advances independently of the owning
/// requisition; the requisition only closes once every picking is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum PickingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "in_progress")]
    InProgress,

    #[sea_orm(string_value = "done")]
    Done,

    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl PickingStatus {
    pub fn can_transition(self, next: PickingStatus) -> bool {
        use PickingStatus::*;
        matches!(
            (self, next),
            (Draft, InProgress) | (InProgress, Done) | (Draft, Cancelled) | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for PickingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickingStatus::Draft => write!(f, "draft"),
            PickingStatus::InProgress => write!(f, "in_progress"),
            PickingStatus::Done => write!(f, "done"),
            PickingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Stock picking generated for one requisition line
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "stock_pickings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Picking number must be between 1 and 50 characters"
    ))]
    pub picking_number: String,

    /// Folio of the requisition this picking was generated from
    pub origin: String,

    pub supplier_id: Uuid,

    pub source_location_id: Uuid,

    pub destination_location_id: Uuid,

    pub scheduled_date: Option<NaiveDate>,

    pub picking_type: String,

    pub status: PickingStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_move::Entity")]
    StockMoves,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::stock_move::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMoves.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
