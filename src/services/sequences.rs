use crate::{
    db::DbPool,
    entities::folio_sequence::{self, Entity as FolioSequence},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::{info, instrument};

/// Sequence key for requisition folios, seeded by the migrations.
pub const REQUISITION_SEQUENCE_KEY: &str = "warehouse.req";

/// How many times an allocation is retried when racing other writers.
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Service handing out formatted document folios from named counters.
pub struct SequenceService {
    db_pool: Arc<DbPool>,
}

impl SequenceService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Allocates the next folio from the named sequence.
    #[instrument(skip(self))]
    pub async fn next_folio(&self, key: &str) -> Result<String, ServiceError> {
        next_folio_in(self.db_pool.as_ref(), key).await
    }
}

/// Allocates the next folio on the given connection, so callers already inside
/// a transaction claim the number atomically with the rest of their writes.
pub async fn next_folio_in<C: ConnectionTrait>(db: &C, key: &str) -> Result<String, ServiceError> {
    for _ in 0..MAX_ALLOCATION_ATTEMPTS {
        let sequence = FolioSequence::find_by_id(key.to_owned())
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Folio sequence {} not found", key)))?;

        let current = sequence.next_value;
        let claimed = FolioSequence::update_many()
            .col_expr(folio_sequence::Column::NextValue, Expr::value(current + 1))
            .col_expr(folio_sequence::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(folio_sequence::Column::Key.eq(key))
            .filter(folio_sequence::Column::NextValue.eq(current))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        if claimed.rows_affected == 1 {
            let folio = sequence.format_folio(current);
            info!(sequence_key = %key, folio = %folio, "Allocated folio");
            return Ok(folio);
        }
    }

    Err(ServiceError::Conflict(format!(
        "Could not allocate a folio from sequence {} after {} attempts",
        key, MAX_ALLOCATION_ATTEMPTS
    )))
}
