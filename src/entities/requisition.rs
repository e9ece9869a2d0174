use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Requisition lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RequisitionStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "required")]
    Required,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "done")]
    Done,
}

impl RequisitionStatus {
    /// Transition table for caller-invoked lifecycle actions. The
    /// administrative reset to draft is handled outside this table.
    pub fn can_transition(self, next: RequisitionStatus) -> bool {
        use RequisitionStatus::*;
        matches!(
            (self, next),
            (Draft, Draft)
                | (Draft, Required)
                | (Draft, Approved)
                | (Required, Approved)
                | (Approved, Done)
        )
    }

    /// Lines may only be added, changed, or removed while the requisition
    /// is in one of these states.
    pub fn is_editable(self) -> bool {
        matches!(self, RequisitionStatus::Draft | RequisitionStatus::Required)
    }
}

impl fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequisitionStatus::Draft => write!(f, "draft"),
            RequisitionStatus::Required => write!(f, "required"),
            RequisitionStatus::Approved => write!(f, "approved"),
            RequisitionStatus::Done => write!(f, "done"),
        }
    }
}

/// Why the material is being requested. Metadata only, no behavioral effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RequisitionReason {
    #[sea_orm(string_value = "production")]
    Production,

    #[sea_orm(string_value = "stock_cs")]
    StockCs,

    #[sea_orm(string_value = "loan")]
    Loan,

    #[sea_orm(string_value = "warranty")]
    Warranty,

    #[sea_orm(string_value = "sale")]
    Sale,

    #[sea_orm(string_value = "reparation")]
    Reparation,

    #[sea_orm(string_value = "replacement")]
    Replacement,

    #[sea_orm(string_value = "internal")]
    Internal,

    #[sea_orm(string_value = "integration")]
    Integration,

    #[sea_orm(string_value = "minimal")]
    Minimal,
}

/// Kind of document the requisition references, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ReferenceType {
    #[sea_orm(string_value = "support")]
    Support,

    #[sea_orm(string_value = "kickoff")]
    Kickoff,

    #[sea_orm(string_value = "project")]
    Project,

    #[sea_orm(string_value = "others")]
    Others,

    #[sea_orm(string_value = "bill")]
    Bill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ShippingType {
    #[sea_orm(string_value = "next")]
    Next,

    #[sea_orm(string_value = "other")]
    Other,
}

/// Requisition entity model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "requisitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 64,
        message = "Folio must be between 1 and 64 characters"
    ))]
    pub folio: String,

    pub warehouse_id: Uuid,

    pub claimant_id: Uuid,

    pub approver_id: Option<Uuid>,

    pub status: RequisitionStatus,

    pub date_requested: NaiveDate,

    pub date_required: Option<NaiveDate>,

    pub reason: RequisitionReason,

    pub reference_type: Option<ReferenceType>,

    pub reference_folio: Option<i32>,

    pub destination_location_id: Uuid,

    pub shipping_type: Option<ShippingType>,

    pub client_id: Option<Uuid>,

    pub deliver_to: Option<String>,

    pub deliver_address: Option<String>,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Picking type must be between 1 and 50 characters"
    ))]
    pub picking_type: String,

    pub ordered: bool,

    pub picked: bool,

    pub version: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::requisition_line::Entity")]
    RequisitionLines,
    #[sea_orm(
        belongs_to = "super::stock_location::Entity",
        from = "Column::DestinationLocationId",
        to = "super::stock_location::Column::Id"
    )]
    DestinationLocation,
}

impl Related<super::requisition_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RequisitionLines.def()
    }
}

impl Related<super::stock_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DestinationLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
