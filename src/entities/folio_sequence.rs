use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named counter backing folio allocation. `next_value` is advanced with an
/// atomic check-and-set so two allocators can never hand out the same folio.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "folio_sequences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    pub prefix: String,

    pub padding: i32,

    pub next_value: i64,

    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Renders a counter value as a folio, e.g. prefix `WR/` and padding 5
    /// turn 42 into `WR/00042`.
    pub fn format_folio(&self, value: i64) -> String {
        format!(
            "{}{:0width$}",
            self.prefix,
            value,
            width = self.padding.max(0) as usize
        )
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
