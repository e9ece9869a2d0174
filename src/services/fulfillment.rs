use crate::{
    db::DbPool,
    entities::{
        item,
        requisition::{self, Entity as Requisition, RequisitionStatus},
        requisition_line::{self, Entity as RequisitionLine},
        stock_move::{self, Entity as StockMove},
        stock_picking::{self, Entity as StockPicking, PickingStatus},
        supplier,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        catalog,
        requisitions::{find_requisition, map_transaction_error},
    },
};
use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

lazy_static! {
    static ref STOCK_PICK_GENERATIONS: IntCounter = IntCounter::new(
        "stock_pick_generations_total",
        "Total number of stock pick generation runs"
    )
    .expect("metric can be created");
    static ref STOCK_PICK_GENERATION_FAILURES: IntCounter = IntCounter::new(
        "stock_pick_generation_failures_total",
        "Total number of failed stock pick generation runs"
    )
    .expect("metric can be created");
}

/// Service creating internal stock pickings for approved requisitions and
/// tracking their progress towards done.
pub struct FulfillmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl FulfillmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Generates one stock picking with a single move for every line of an
    /// approved requisition, whatever its ordered quantity. Supplier
    /// resolution is checked for all lines before anything is created, and
    /// the requisition's `picked` flag makes the run single-shot.
    #[instrument(skip(self))]
    pub async fn generate_stock_picks(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<stock_picking::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        let generated = db
            .transaction::<_, Vec<stock_picking::Model>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;

                    if requisition.status != RequisitionStatus::Approved {
                        return Err(ServiceError::InvalidStatus(format!(
                            "Stock picks can only be generated for approved requisitions, requisition {} is {}",
                            requisition.folio, requisition.status
                        )));
                    }

                    let claimed = Requisition::update_many()
                        .col_expr(requisition::Column::Picked, Expr::value(true))
                        .col_expr(
                            requisition::Column::Version,
                            Expr::col(requisition::Column::Version).add(1),
                        )
                        .col_expr(requisition::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(requisition::Column::Id.eq(requisition.id))
                        .filter(requisition::Column::Picked.eq(false))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if claimed.rows_affected == 0 {
                        return Err(ServiceError::ValidationError(format!(
                            "Stock picks already generated for requisition {}",
                            requisition.folio
                        )));
                    }

                    let lines = RequisitionLine::find()
                        .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
                        .order_by_asc(requisition_line::Column::LineNumber)
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if lines.is_empty() {
                        return Err(ServiceError::ValidationError(format!(
                            "Requisition {} has no lines to pick",
                            requisition.folio
                        )));
                    }

                    // Every line must resolve a supplier before any picking
                    // is created.
                    let mut resolved: Vec<(
                        requisition_line::Model,
                        item::Model,
                        supplier::Model,
                    )> = Vec::new();
                    for line in lines {
                        let item = catalog::find_item(txn, line.item_id).await?;
                        let supplier = catalog::primary_supplier(txn, line.item_id)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::ValidationError(format!(
                                    "No supplier configured for item {} on requisition {} line {}",
                                    item.item_number, requisition.folio, line.line_number
                                ))
                            })?;
                        resolved.push((line, item, supplier));
                    }

                    let mut created = Vec::with_capacity(resolved.len());
                    for (line, item, supplier) in resolved {
                        let new_picking = stock_picking::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            picking_number: Set(format!("PICK-{}", Uuid::new_v4().simple())),
                            origin: Set(requisition.folio.clone()),
                            supplier_id: Set(supplier.id),
                            source_location_id: Set(line.source_location_id),
                            destination_location_id: Set(requisition.destination_location_id),
                            scheduled_date: Set(requisition.date_required),
                            picking_type: Set(requisition.picking_type.clone()),
                            status: Set(PickingStatus::Draft),
                            created_at: Set(Utc::now()),
                            updated_at: Set(Utc::now()),
                        };
                        let saved_picking = new_picking.insert(txn).await.map_err(|e| {
                            let msg = format!(
                                "Failed to create stock picking for requisition {}: {}",
                                requisition.folio, e
                            );
                            error!("{}", msg);
                            ServiceError::db_error(e)
                        })?;

                        let new_move = stock_move::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            stock_picking_id: Set(saved_picking.id),
                            item_id: Set(line.item_id),
                            quantity: Set(line.requested_qty),
                            uom_code: Set(item.primary_uom_code.clone()),
                            created_at: Set(Utc::now()),
                        };
                        new_move.insert(txn).await.map_err(|e| {
                            let msg = format!(
                                "Failed to create stock move for picking {}: {}",
                                saved_picking.picking_number, e
                            );
                            error!("{}", msg);
                            ServiceError::db_error(e)
                        })?;

                        let mut line_update: requisition_line::ActiveModel = line.into();
                        line_update.stock_picking_id = Set(Some(saved_picking.id));
                        line_update.updated_at = Set(Some(Utc::now()));
                        line_update
                            .update(txn)
                            .await
                            .map_err(ServiceError::db_error)?;

                        created.push(saved_picking);
                    }

                    Ok(created)
                })
            })
            .await
            .map_err(map_transaction_error)
            .map_err(|e| {
                STOCK_PICK_GENERATION_FAILURES.inc();
                e
            })?;

        info!(
            requisition_id = %requisition_id,
            stock_pickings = %generated.len(),
            "Generated stock pickings"
        );

        self.event_sender
            .send(Event::StockPicksGenerated {
                requisition_id,
                picking_ids: generated.iter().map(|picking| picking.id).collect(),
            })
            .await
            .map_err(|e| {
                STOCK_PICK_GENERATION_FAILURES.inc();
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        STOCK_PICK_GENERATIONS.inc();

        Ok(generated)
    }

    /// Moves a stock picking along its own state machine
    /// (draft, in progress, done, cancelled).
    #[instrument(skip(self))]
    pub async fn update_picking_status(
        &self,
        picking_id: Uuid,
        new_status: PickingStatus,
    ) -> Result<stock_picking::Model, ServiceError> {
        let db = self.db_pool.as_ref();

        let updated = db
            .transaction::<_, stock_picking::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let picking = StockPicking::find_by_id(picking_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Stock picking {} not found",
                                picking_id
                            ))
                        })?;

                    if !picking.status.can_transition(new_status) {
                        return Err(ServiceError::InvalidStatus(format!(
                            "Stock picking {} cannot move from {} to {}",
                            picking.picking_number, picking.status, new_status
                        )));
                    }

                    let changed = StockPicking::update_many()
                        .col_expr(stock_picking::Column::Status, Expr::value(new_status))
                        .col_expr(stock_picking::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(stock_picking::Column::Id.eq(picking.id))
                        .filter(stock_picking::Column::Status.eq(picking.status))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if changed.rows_affected == 0 {
                        return Err(ServiceError::ConcurrentModification(picking.id));
                    }

                    StockPicking::find_by_id(picking_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Stock picking {} not found",
                                picking_id
                            ))
                        })
                })
            })
            .await
            .map_err(map_transaction_error)?;

        info!(
            picking_id = %updated.id,
            picking_number = %updated.picking_number,
            status = %updated.status,
            "Stock picking status updated"
        );

        if updated.status == PickingStatus::Done {
            self.event_sender
                .send(Event::StockPickingCompleted(updated.id))
                .await
                .map_err(|e| {
                    let msg = format!("Failed to send event: {}", e);
                    error!("{}", msg);
                    ServiceError::EventError(msg)
                })?;
        }

        Ok(updated)
    }

    /// Gets a stock picking by ID.
    #[instrument(skip(self))]
    pub async fn get_stock_picking(
        &self,
        picking_id: Uuid,
    ) -> Result<Option<stock_picking::Model>, ServiceError> {
        StockPicking::find_by_id(picking_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Current status of a stock picking.
    #[instrument(skip(self))]
    pub async fn picking_status(&self, picking_id: Uuid) -> Result<PickingStatus, ServiceError> {
        let picking = self.get_stock_picking(picking_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Stock picking {} not found", picking_id))
        })?;
        Ok(picking.status)
    }

    /// Stock pickings generated for a requisition, matched through the
    /// picking's origin folio.
    #[instrument(skip(self))]
    pub async fn stock_pickings_for_requisition(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<stock_picking::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let requisition = find_requisition(db, requisition_id).await?;

        StockPicking::find()
            .filter(stock_picking::Column::Origin.eq(&requisition.folio))
            .order_by_asc(stock_picking::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Moves under a stock picking.
    #[instrument(skip(self))]
    pub async fn list_moves(
        &self,
        picking_id: Uuid,
    ) -> Result<Vec<stock_move::Model>, ServiceError> {
        StockMove::find()
            .filter(stock_move::Column::StockPickingId.eq(picking_id))
            .order_by_asc(stock_move::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}
