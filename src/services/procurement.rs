use crate::{
    db::DbPool,
    entities::{
        item,
        purchase_order::{self, Entity as PurchaseOrder, PurchaseOrderStatus},
        purchase_order_line::{self, Entity as PurchaseOrderLine},
        requisition::{self, Entity as Requisition, RequisitionStatus},
        requisition_line::{self, Entity as RequisitionLine},
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
    static ref PURCHASE_ORDER_GENERATIONS: IntCounter = IntCounter::new(
        "purchase_order_generations_total",
        "Total number of purchase order generation runs"
    )
    .expect("metric can be created");
    static ref PURCHASE_ORDER_GENERATION_FAILURES: IntCounter = IntCounter::new(
        "purchase_order_generation_failures_total",
        "Total number of failed purchase order generation runs"
    )
    .expect("metric can be created");
}

/// Service turning approved requisitions into supplier purchase orders.
pub struct ProcurementService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProcurementService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Generates purchase orders for an approved requisition: one order per
    /// distinct primary supplier, one order line per requisition line with a
    /// positive ordered quantity. The whole run either commits or rolls back,
    /// and the requisition's `ordered` flag makes it single-shot.
    #[instrument(skip(self))]
    pub async fn generate_purchase_orders(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let db = self.db_pool.as_ref();

        let generated = db
            .transaction::<_, Vec<purchase_order::Model>, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;

                    if requisition.status != RequisitionStatus::Approved {
                        return Err(ServiceError::InvalidStatus(format!(
                            "Purchase orders can only be generated for approved requisitions, requisition {} is {}",
                            requisition.folio, requisition.status
                        )));
                    }

                    // Claim the idempotency flag first; a validation failure
                    // below rolls the claim back with everything else.
                    let claimed = Requisition::update_many()
                        .col_expr(requisition::Column::Ordered, Expr::value(true))
                        .col_expr(
                            requisition::Column::Version,
                            Expr::col(requisition::Column::Version).add(1),
                        )
                        .col_expr(requisition::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(requisition::Column::Id.eq(requisition.id))
                        .filter(requisition::Column::Ordered.eq(false))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if claimed.rows_affected == 0 {
                        return Err(ServiceError::ValidationError(format!(
                            "Purchase orders already generated for requisition {}",
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
                            "Requisition {} has no lines to order from",
                            requisition.folio
                        )));
                    }

                    let mut purchasable: Vec<(
                        requisition_line::Model,
                        item::Model,
                        supplier::Model,
                    )> = Vec::new();
                    for line in lines {
                        if line.ordered_qty.is_zero() {
                            continue;
                        }

                        let item = catalog::find_item(txn, line.item_id).await?;
                        let supplier = catalog::primary_supplier(txn, line.item_id)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::ValidationError(format!(
                                    "No supplier configured for item {} on requisition {} line {}",
                                    item.item_number, requisition.folio, line.line_number
                                ))
                            })?;

                        if line.ordered_qty.is_sign_negative() {
                            return Err(ServiceError::ValidationError(format!(
                                "Requisition {} line {} has a negative ordered quantity {}",
                                requisition.folio, line.line_number, line.ordered_qty
                            )));
                        }

                        let on_hand = catalog::on_hand(txn, line.item_id).await?;
                        if on_hand + line.ordered_qty < line.requested_qty {
                            return Err(ServiceError::InsufficientStock(format!(
                                "Insufficient stock for item {} on requisition {} line {}: on hand {}, ordering {}, requested {}",
                                item.item_number,
                                requisition.folio,
                                line.line_number,
                                on_hand,
                                line.ordered_qty,
                                line.requested_qty
                            )));
                        }

                        purchasable.push((line, item, supplier));
                    }

                    // Group lines by supplier in first-occurrence order.
                    let mut groups: Vec<(
                        supplier::Model,
                        Vec<(requisition_line::Model, item::Model)>,
                    )> = Vec::new();
                    for (line, item, supplier) in purchasable {
                        match groups
                            .iter_mut()
                            .find(|(existing, _)| existing.id == supplier.id)
                        {
                            Some((_, members)) => members.push((line, item)),
                            None => groups.push((supplier, vec![(line, item)])),
                        }
                    }

                    let mut created = Vec::with_capacity(groups.len());
                    for (supplier, members) in groups {
                        let new_po = purchase_order::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            po_number: Set(format!("PO-{}", Uuid::new_v4().simple())),
                            supplier_id: Set(supplier.id),
                            origin: Set(requisition.folio.clone()),
                            planned_date: Set(requisition.date_required),
                            status: Set(PurchaseOrderStatus::Draft),
                            created_at: Set(Utc::now()),
                            updated_at: Set(Utc::now()),
                        };
                        let saved_po = new_po.insert(txn).await.map_err(|e| {
                            let msg = format!(
                                "Failed to create purchase order for supplier {}: {}",
                                supplier.id, e
                            );
                            error!("{}", msg);
                            ServiceError::db_error(e)
                        })?;

                        for (line, item) in members {
                            let new_po_line = purchase_order_line::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                purchase_order_id: Set(saved_po.id),
                                item_id: Set(line.item_id),
                                requisition_line_id: Set(line.id),
                                quantity: Set(line.ordered_qty),
                                unit_price: Set(item.list_price),
                                uom_code: Set(item.primary_uom_code.clone()),
                                created_at: Set(Utc::now()),
                            };
                            new_po_line.insert(txn).await.map_err(|e| {
                                let msg = format!(
                                    "Failed to create purchase order line for order {}: {}",
                                    saved_po.po_number, e
                                );
                                error!("{}", msg);
                                ServiceError::db_error(e)
                            })?;

                            let mut line_update: requisition_line::ActiveModel = line.into();
                            line_update.purchase_order_id = Set(Some(saved_po.id));
                            line_update.updated_at = Set(Some(Utc::now()));
                            line_update
                                .update(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                        }

                        created.push(saved_po);
                    }

                    Ok(created)
                })
            })
            .await
            .map_err(map_transaction_error)
            .map_err(|e| {
                PURCHASE_ORDER_GENERATION_FAILURES.inc();
                e
            })?;

        info!(
            requisition_id = %requisition_id,
            purchase_orders = %generated.len(),
            "Generated purchase orders"
        );

        self.event_sender
            .send(Event::PurchaseOrdersGenerated {
                requisition_id,
                purchase_order_ids: generated.iter().map(|po| po.id).collect(),
            })
            .await
            .map_err(|e| {
                PURCHASE_ORDER_GENERATION_FAILURES.inc();
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        PURCHASE_ORDER_GENERATIONS.inc();

        Ok(generated)
    }

    /// Gets a purchase order by ID.
    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        po_id: Uuid,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        PurchaseOrder::find_by_id(po_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Current status of a purchase order.
    #[instrument(skip(self))]
    pub async fn purchase_order_status(
        &self,
        po_id: Uuid,
    ) -> Result<PurchaseOrderStatus, ServiceError> {
        let po = self
            .get_purchase_order(po_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", po_id)))?;
        Ok(po.status)
    }

    /// Purchase orders generated for a requisition, matched through the
    /// order's origin folio.
    #[instrument(skip(self))]
    pub async fn purchase_orders_for_requisition(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let requisition = find_requisition(db, requisition_id).await?;

        PurchaseOrder::find()
            .filter(purchase_order::Column::Origin.eq(&requisition.folio))
            .order_by_asc(purchase_order::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lines of a purchase order.
    #[instrument(skip(self))]
    pub async fn list_purchase_order_lines(
        &self,
        po_id: Uuid,
    ) -> Result<Vec<purchase_order_line::Model>, ServiceError> {
        PurchaseOrderLine::find()
            .filter(purchase_order_line::Column::PurchaseOrderId.eq(po_id))
            .order_by_asc(purchase_order_line::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }
}
