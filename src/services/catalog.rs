use crate::{
    db::DbPool,
    entities::{
        item::{self, Entity as Item},
        item_supplier::{self, Entity as ItemSupplier},
        stock_level::{self, Entity as StockLevel},
        supplier,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Read-side catalog lookups shared by the document generators. The free
/// functions run on any connection so generators can call them inside their
/// own transactions.
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Returns an item's registered suppliers, primary first.
    #[instrument(skip(self))]
    pub async fn sellers(&self, item_id: Uuid) -> Result<Vec<supplier::Model>, ServiceError> {
        sellers(self.db_pool.as_ref(), item_id).await
    }

    /// Returns the total on-hand quantity of an item across all locations.
    #[instrument(skip(self))]
    pub async fn on_hand(&self, item_id: Uuid) -> Result<Decimal, ServiceError> {
        on_hand(self.db_pool.as_ref(), item_id).await
    }

    /// Returns an item's catalog list price.
    #[instrument(skip(self))]
    pub async fn list_price(&self, item_id: Uuid) -> Result<Decimal, ServiceError> {
        Ok(find_item(self.db_pool.as_ref(), item_id).await?.list_price)
    }

    /// Returns an item's primary unit of measure code.
    #[instrument(skip(self))]
    pub async fn unit_of_measure(&self, item_id: Uuid) -> Result<String, ServiceError> {
        Ok(find_item(self.db_pool.as_ref(), item_id)
            .await?
            .primary_uom_code)
    }
}

pub async fn find_item<C: ConnectionTrait>(
    db: &C,
    item_id: Uuid,
) -> Result<item::Model, ServiceError> {
    Item::find_by_id(item_id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))
}

/// Seller list for an item, ordered by supplier sequence then registration
/// time. The first entry is the item's primary supplier.
pub async fn sellers<C: ConnectionTrait>(
    db: &C,
    item_id: Uuid,
) -> Result<Vec<supplier::Model>, ServiceError> {
    let rows = ItemSupplier::find()
        .filter(item_supplier::Column::ItemId.eq(item_id))
        .order_by_asc(item_supplier::Column::Sequence)
        .order_by_asc(item_supplier::Column::CreatedAt)
        .find_also_related(supplier::Entity)
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(rows
        .into_iter()
        .filter_map(|(_, supplier)| supplier)
        .collect())
}

pub async fn primary_supplier<C: ConnectionTrait>(
    db: &C,
    item_id: Uuid,
) -> Result<Option<supplier::Model>, ServiceError> {
    Ok(sellers(db, item_id).await?.into_iter().next())
}

pub async fn on_hand<C: ConnectionTrait>(db: &C, item_id: Uuid) -> Result<Decimal, ServiceError> {
    let levels = StockLevel::find()
        .filter(stock_level::Column::ItemId.eq(item_id))
        .all(db)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(levels.into_iter().map(|level| level.on_hand).sum())
}
