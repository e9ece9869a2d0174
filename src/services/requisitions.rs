use crate::{
    db::DbPool,
    entities::{
        requisition::{
            self, Entity as Requisition, ReferenceType, RequisitionReason, RequisitionStatus,
            ShippingType,
        },
        requisition_line::{self, Entity as RequisitionLine},
        stock_picking::{Entity as StockPicking, PickingStatus},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    identity::CallerIdentity,
    services::sequences::{self, REQUISITION_SEQUENCE_KEY},
};
use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use prometheus::IntCounter;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionError,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    static ref REQUISITION_CREATIONS: IntCounter = IntCounter::new(
        "requisition_creations_total",
        "Total number of requisitions created"
    )
    .expect("metric can be created");
    static ref REQUISITION_CREATION_FAILURES: IntCounter = IntCounter::new(
        "requisition_creation_failures_total",
        "Total number of failed requisition creations"
    )
    .expect("metric can be created");
    static ref REQUISITION_APPROVALS: IntCounter = IntCounter::new(
        "requisition_approvals_total",
        "Total number of requisitions approved"
    )
    .expect("metric can be created");
    static ref REQUISITION_APPROVAL_FAILURES: IntCounter = IntCounter::new(
        "requisition_approval_failures_total",
        "Total number of failed requisition approvals"
    )
    .expect("metric can be created");
    static ref REQUISITION_COMPLETIONS: IntCounter = IntCounter::new(
        "requisition_completions_total",
        "Total number of requisitions completed"
    )
    .expect("metric can be created");
    static ref REQUISITION_COMPLETION_FAILURES: IntCounter = IntCounter::new(
        "requisition_completion_failures_total",
        "Total number of failed requisition completions"
    )
    .expect("metric can be created");
}

const DEFAULT_LIST_LIMIT: u64 = 100;

/// Service managing the requisition lifecycle: creation, line editing, the
/// draft/required/approved/done state machine, and the completion gate.
pub struct RequisitionService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    identity: Arc<dyn CallerIdentity>,
}

impl RequisitionService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        identity: Arc<dyn CallerIdentity>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            identity,
        }
    }

    /// Creates a new requisition in draft. The folio is allocated from the
    /// requisition sequence unless the caller supplies one, in which case it
    /// must not already be in use.
    #[instrument(skip(self, input))]
    pub async fn create_requisition(
        &self,
        input: CreateRequisitionInput,
    ) -> Result<requisition::Model, ServiceError> {
        input.validate().map_err(|e| {
            REQUISITION_CREATION_FAILURES.inc();
            let msg = format!("Invalid input: {}", e);
            error!("{}", msg);
            ServiceError::ValidationError(msg)
        })?;
        check_date_window(input.date_requested, input.date_required).map_err(|e| {
            REQUISITION_CREATION_FAILURES.inc();
            e
        })?;

        let claimant_id = self.identity.current_actor();
        let db = self.db_pool.as_ref();

        let created = db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let folio = match input.folio {
                        Some(folio) => {
                            let existing = Requisition::find()
                                .filter(requisition::Column::Folio.eq(&folio))
                                .one(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                            if existing.is_some() {
                                return Err(ServiceError::Conflict(format!(
                                    "Folio {} is already in use",
                                    folio
                                )));
                            }
                            folio
                        }
                        None => sequences::next_folio_in(txn, REQUISITION_SEQUENCE_KEY).await?,
                    };

                    let new_requisition = requisition::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        folio: Set(folio),
                        warehouse_id: Set(input.warehouse_id),
                        claimant_id: Set(claimant_id),
                        approver_id: Set(None),
                        status: Set(RequisitionStatus::Draft),
                        date_requested: Set(input.date_requested),
                        date_required: Set(input.date_required),
                        reason: Set(input.reason),
                        reference_type: Set(input.reference_type),
                        reference_folio: Set(input.reference_folio),
                        destination_location_id: Set(input.destination_location_id),
                        shipping_type: Set(input.shipping_type),
                        client_id: Set(input.client_id),
                        deliver_to: Set(input.deliver_to),
                        deliver_address: Set(input.deliver_address),
                        picking_type: Set(input.picking_type),
                        ordered: Set(false),
                        picked: Set(false),
                        version: Set(1),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };

                    new_requisition.insert(txn).await.map_err(|e| {
                        let msg = format!(
                            "Failed to create requisition for claimant {}: {}",
                            claimant_id, e
                        );
                        error!("{}", msg);
                        ServiceError::db_error(e)
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })
            .map_err(|e| {
                REQUISITION_CREATION_FAILURES.inc();
                e
            })?;

        info!(
            requisition_id = %created.id,
            folio = %created.folio,
            claimant_id = %claimant_id,
            "Requisition created"
        );

        self.event_sender
            .send(Event::RequisitionCreated(created.id))
            .await
            .map_err(|e| {
                REQUISITION_CREATION_FAILURES.inc();
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        REQUISITION_CREATIONS.inc();

        Ok(created)
    }

    /// Appends a line to a requisition. Lines are only editable while the
    /// requisition is in draft or required.
    #[instrument(skip(self, input))]
    pub async fn add_line(
        &self,
        requisition_id: Uuid,
        input: NewRequisitionLine,
    ) -> Result<requisition_line::Model, ServiceError> {
        check_line_quantities(input.requested_qty, input.ordered_qty)?;

        let db = self.db_pool.as_ref();
        let line = db
            .transaction::<_, requisition_line::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;
                    check_editable(&requisition)?;

                    let next_number = RequisitionLine::find()
                        .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
                        .order_by_desc(requisition_line::Column::LineNumber)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .map(|line| line.line_number + 1)
                        .unwrap_or(1);

                    let new_line = requisition_line::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        requisition_id: Set(requisition.id),
                        line_number: Set(next_number),
                        item_id: Set(input.item_id),
                        requested_qty: Set(input.requested_qty),
                        ordered_qty: Set(input.ordered_qty),
                        source_location_id: Set(input.source_location_id),
                        purchase_order_id: Set(None),
                        stock_picking_id: Set(None),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };

                    let saved = new_line.insert(txn).await.map_err(|e| {
                        let msg = format!(
                            "Failed to add line to requisition {}: {}",
                            requisition.folio, e
                        );
                        error!("{}", msg);
                        ServiceError::db_error(e)
                    })?;

                    bump_version(txn, &requisition).await?;

                    Ok(saved)
                })
            })
            .await
            .map_err(map_transaction_error)?;

        info!(
            requisition_id = %requisition_id,
            line_id = %line.id,
            line_number = %line.line_number,
            "Requisition line added"
        );

        Ok(line)
    }

    /// Updates quantities or the source location of an existing line, under
    /// the same editability rule as [`add_line`](Self::add_line).
    #[instrument(skip(self, input))]
    pub async fn update_line(
        &self,
        requisition_id: Uuid,
        line_id: Uuid,
        input: UpdateRequisitionLine,
    ) -> Result<requisition_line::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let line = db
            .transaction::<_, requisition_line::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;
                    check_editable(&requisition)?;

                    let line = RequisitionLine::find()
                        .filter(requisition_line::Column::Id.eq(line_id))
                        .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Requisition line {} not found on requisition {}",
                                line_id, requisition.folio
                            ))
                        })?;

                    let requested_qty = input.requested_qty.unwrap_or(line.requested_qty);
                    let ordered_qty = input.ordered_qty.unwrap_or(line.ordered_qty);
                    check_line_quantities(requested_qty, ordered_qty)?;

                    let mut update: requisition_line::ActiveModel = line.into();
                    update.requested_qty = Set(requested_qty);
                    update.ordered_qty = Set(ordered_qty);
                    if let Some(source_location_id) = input.source_location_id {
                        update.source_location_id = Set(source_location_id);
                    }
                    update.updated_at = Set(Some(Utc::now()));

                    let saved = update.update(txn).await.map_err(ServiceError::db_error)?;

                    bump_version(txn, &requisition).await?;

                    Ok(saved)
                })
            })
            .await
            .map_err(map_transaction_error)?;

        info!(
            requisition_id = %requisition_id,
            line_id = %line.id,
            "Requisition line updated"
        );

        Ok(line)
    }

    /// Removes a line while the requisition is still editable.
    #[instrument(skip(self))]
    pub async fn remove_line(
        &self,
        requisition_id: Uuid,
        line_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = self.db_pool.as_ref();
        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let requisition = find_requisition(txn, requisition_id).await?;
                check_editable(&requisition)?;

                let deleted = RequisitionLine::delete_many()
                    .filter(requisition_line::Column::Id.eq(line_id))
                    .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                if deleted.rows_affected == 0 {
                    return Err(ServiceError::NotFound(format!(
                        "Requisition line {} not found on requisition {}",
                        line_id, requisition.folio
                    )));
                }

                bump_version(txn, &requisition).await?;

                Ok(())
            })
        })
        .await
        .map_err(map_transaction_error)?;

        info!(
            requisition_id = %requisition_id,
            line_id = %line_id,
            "Requisition line removed"
        );

        Ok(())
    }

    /// Moves a draft requisition to required. Requires at least one line and
    /// a consistent date window.
    #[instrument(skip(self))]
    pub async fn mark_required(
        &self,
        requisition_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;
                    check_transition(&requisition, RequisitionStatus::Required)?;
                    check_has_lines(txn, &requisition).await?;
                    check_date_window(requisition.date_requested, requisition.date_required)?;

                    apply_transition(txn, &requisition, RequisitionStatus::Required, None).await?;

                    find_requisition(txn, requisition_id).await
                })
            })
            .await
            .map_err(map_transaction_error)?;

        info!(
            requisition_id = %updated.id,
            folio = %updated.folio,
            "Requisition marked as required"
        );

        self.event_sender
            .send(Event::RequisitionRequired(updated.id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        Ok(updated)
    }

    /// Approves a requisition from draft or required. The claimant cannot
    /// approve their own requisition unless the acting identity is
    /// privileged, and the first approver is recorded permanently.
    #[instrument(skip(self))]
    pub async fn approve(&self, requisition_id: Uuid) -> Result<requisition::Model, ServiceError> {
        let actor = self.identity.current_actor();
        let privileged = self.identity.is_privileged(actor);

        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;
                    check_transition(&requisition, RequisitionStatus::Approved)?;

                    if actor == requisition.claimant_id && !privileged {
                        return Err(ServiceError::Forbidden(format!(
                            "Claimant {} cannot approve their own requisition {}",
                            actor, requisition.folio
                        )));
                    }

                    check_has_lines(txn, &requisition).await?;
                    check_date_window(requisition.date_requested, requisition.date_required)?;

                    // The first approver sticks, even across draft resets.
                    let approver = match requisition.approver_id {
                        Some(_) => None,
                        None => Some(actor),
                    };

                    apply_transition(txn, &requisition, RequisitionStatus::Approved, approver)
                        .await?;

                    find_requisition(txn, requisition_id).await
                })
            })
            .await
            .map_err(map_transaction_error)
            .map_err(|e| {
                REQUISITION_APPROVAL_FAILURES.inc();
                e
            })?;

        let approver_id = updated.approver_id.unwrap_or(actor);
        info!(
            requisition_id = %updated.id,
            folio = %updated.folio,
            approver_id = %approver_id,
            "Requisition approved"
        );

        self.event_sender
            .send(Event::RequisitionApproved {
                requisition_id: updated.id,
                approver_id,
            })
            .await
            .map_err(|e| {
                REQUISITION_APPROVAL_FAILURES.inc();
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        REQUISITION_APPROVALS.inc();

        Ok(updated)
    }

    /// Completes an approved requisition. Every line must reference a stock
    /// picking that the fulfillment side has already marked done; the gate
    /// never forces fulfillment forward.
    #[instrument(skip(self))]
    pub async fn mark_done(
        &self,
        requisition_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;
                    check_transition(&requisition, RequisitionStatus::Done)?;
                    check_date_window(requisition.date_requested, requisition.date_required)?;

                    let lines = RequisitionLine::find()
                        .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
                        .order_by_asc(requisition_line::Column::LineNumber)
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if lines.is_empty() {
                        return Err(ServiceError::ValidationError(format!(
                            "Requisition {} must have at least one line",
                            requisition.folio
                        )));
                    }

                    for line in &lines {
                        let picking_id = line.stock_picking_id.ok_or_else(|| {
                            ServiceError::ValidationError(format!(
                                "Requisition {} line {} has no fulfillment document",
                                requisition.folio, line.line_number
                            ))
                        })?;

                        let picking = StockPicking::find_by_id(picking_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Stock picking {} referenced by requisition {} line {} not found",
                                    picking_id, requisition.folio, line.line_number
                                ))
                            })?;

                        if picking.status != PickingStatus::Done {
                            return Err(ServiceError::ValidationError(format!(
                                "Requisition {} line {}: fulfillment not done, stock picking {} is {}",
                                requisition.folio,
                                line.line_number,
                                picking.picking_number,
                                picking.status
                            )));
                        }
                    }

                    apply_transition(txn, &requisition, RequisitionStatus::Done, None).await?;

                    find_requisition(txn, requisition_id).await
                })
            })
            .await
            .map_err(map_transaction_error)
            .map_err(|e| {
                REQUISITION_COMPLETION_FAILURES.inc();
                e
            })?;

        info!(
            requisition_id = %updated.id,
            folio = %updated.folio,
            "Requisition completed"
        );

        self.event_sender
            .send(Event::RequisitionCompleted(updated.id))
            .await
            .map_err(|e| {
                REQUISITION_COMPLETION_FAILURES.inc();
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        REQUISITION_COMPLETIONS.inc();

        Ok(updated)
    }

    /// Administrative reset: forces the requisition back to draft from any
    /// state, with no guard. Approver, idempotency flags and generated
    /// documents are left untouched.
    #[instrument(skip(self))]
    pub async fn reset_to_draft(
        &self,
        requisition_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;

                    apply_transition(txn, &requisition, RequisitionStatus::Draft, None).await?;

                    find_requisition(txn, requisition_id).await
                })
            })
            .await
            .map_err(map_transaction_error)?;

        info!(
            requisition_id = %updated.id,
            folio = %updated.folio,
            "Requisition reset to draft"
        );

        self.event_sender
            .send(Event::RequisitionReset(updated.id))
            .await
            .map_err(|e| {
                let msg = format!("Failed to send event: {}", e);
                error!("{}", msg);
                ServiceError::EventError(msg)
            })?;

        Ok(updated)
    }

    /// Reschedules a requisition while it is still editable, keeping the
    /// date window consistent.
    #[instrument(skip(self, input))]
    pub async fn update_dates(
        &self,
        requisition_id: Uuid,
        input: UpdateRequisitionDates,
    ) -> Result<requisition::Model, ServiceError> {
        let db = self.db_pool.as_ref();
        let updated = db
            .transaction::<_, requisition::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let requisition = find_requisition(txn, requisition_id).await?;
                    check_editable(&requisition)?;

                    let date_requested =
                        input.date_requested.unwrap_or(requisition.date_requested);
                    let date_required = input.date_required.or(requisition.date_required);
                    check_date_window(date_requested, date_required)?;

                    let changed = Requisition::update_many()
                        .col_expr(
                            requisition::Column::DateRequested,
                            Expr::value(date_requested),
                        )
                        .col_expr(
                            requisition::Column::DateRequired,
                            Expr::value(date_required),
                        )
                        .col_expr(
                            requisition::Column::Version,
                            Expr::value(requisition.version + 1),
                        )
                        .col_expr(requisition::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(requisition::Column::Id.eq(requisition.id))
                        .filter(requisition::Column::Version.eq(requisition.version))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if changed.rows_affected == 0 {
                        return Err(ServiceError::ConcurrentModification(requisition.id));
                    }

                    find_requisition(txn, requisition_id).await
                })
            })
            .await
            .map_err(map_transaction_error)?;

        info!(
            requisition_id = %updated.id,
            date_requested = %updated.date_requested,
            "Requisition dates updated"
        );

        Ok(updated)
    }

    /// Gets a requisition by ID.
    #[instrument(skip(self))]
    pub async fn get_requisition(
        &self,
        requisition_id: Uuid,
    ) -> Result<requisition::Model, ServiceError> {
        find_requisition(self.db_pool.as_ref(), requisition_id).await
    }

    /// Gets a requisition by its folio.
    #[instrument(skip(self))]
    pub async fn get_requisition_by_folio(
        &self,
        folio: &str,
    ) -> Result<requisition::Model, ServiceError> {
        Requisition::find()
            .filter(requisition::Column::Folio.eq(folio))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Requisition with folio {} not found", folio))
            })
    }

    /// Lists requisitions, newest first, optionally filtered by status or
    /// claimant.
    #[instrument(skip(self, filter))]
    pub async fn list_requisitions(
        &self,
        filter: RequisitionListFilter,
    ) -> Result<Vec<requisition::Model>, ServiceError> {
        let mut query = Requisition::find();
        if let Some(status) = filter.status {
            query = query.filter(requisition::Column::Status.eq(status));
        }
        if let Some(claimant_id) = filter.claimant_id {
            query = query.filter(requisition::Column::ClaimantId.eq(claimant_id));
        }

        query
            .order_by_desc(requisition::Column::CreatedAt)
            .limit(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .offset(filter.offset.unwrap_or(0))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Lists a requisition's lines in submission order.
    #[instrument(skip(self))]
    pub async fn list_lines(
        &self,
        requisition_id: Uuid,
    ) -> Result<Vec<requisition_line::Model>, ServiceError> {
        let db = self.db_pool.as_ref();
        let requisition = find_requisition(db, requisition_id).await?;

        RequisitionLine::find()
            .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
            .order_by_asc(requisition_line::Column::LineNumber)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Sums the requested quantity over all lines.
    #[instrument(skip(self))]
    pub async fn total_requested_qty(&self, requisition_id: Uuid) -> Result<Decimal, ServiceError> {
        let lines = self.list_lines(requisition_id).await?;
        Ok(lines.into_iter().map(|line| line.requested_qty).sum())
    }

    /// True when any line carries a positive ordered quantity, i.e. the
    /// requisition needs the procurement generator.
    #[instrument(skip(self))]
    pub async fn purchase_required(&self, requisition_id: Uuid) -> Result<bool, ServiceError> {
        let db = self.db_pool.as_ref();
        let requisition = find_requisition(db, requisition_id).await?;

        let purchasable = RequisitionLine::find()
            .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
            .filter(requisition_line::Column::OrderedQty.gt(Decimal::ZERO))
            .count(db)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(purchasable > 0)
    }
}

pub(crate) async fn find_requisition<C: ConnectionTrait>(
    db: &C,
    requisition_id: Uuid,
) -> Result<requisition::Model, ServiceError> {
    Requisition::find_by_id(requisition_id)
        .one(db)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Requisition {} not found", requisition_id)))
}

pub(crate) fn map_transaction_error(
    e: TransactionError<ServiceError>,
) -> ServiceError {
    match e {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

fn check_editable(requisition: &requisition::Model) -> Result<(), ServiceError> {
    if !requisition.status.is_editable() {
        return Err(ServiceError::InvalidStatus(format!(
            "Requisition {} cannot be modified in status {}",
            requisition.folio, requisition.status
        )));
    }
    Ok(())
}

fn check_transition(
    requisition: &requisition::Model,
    target: RequisitionStatus,
) -> Result<(), ServiceError> {
    if !requisition.status.can_transition(target) {
        return Err(ServiceError::InvalidStatus(format!(
            "Requisition {} cannot move from {} to {}",
            requisition.folio, requisition.status, target
        )));
    }
    Ok(())
}

fn check_date_window(
    date_requested: NaiveDate,
    date_required: Option<NaiveDate>,
) -> Result<(), ServiceError> {
    if let Some(required) = date_required {
        if required < date_requested {
            return Err(ServiceError::ValidationError(format!(
                "Date required {} cannot be earlier than date requested {}",
                required, date_requested
            )));
        }
    }
    Ok(())
}

fn check_line_quantities(requested_qty: Decimal, ordered_qty: Decimal) -> Result<(), ServiceError> {
    if requested_qty.is_sign_negative() && !requested_qty.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "Requested quantity cannot be negative, got {}",
            requested_qty
        )));
    }
    if ordered_qty.is_sign_negative() && !ordered_qty.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "Ordered quantity cannot be negative, got {}",
            ordered_qty
        )));
    }
    Ok(())
}

async fn check_has_lines(
    txn: &DatabaseTransaction,
    requisition: &requisition::Model,
) -> Result<(), ServiceError> {
    let line_count = RequisitionLine::find()
        .filter(requisition_line::Column::RequisitionId.eq(requisition.id))
        .count(txn)
        .await
        .map_err(ServiceError::db_error)?;
    if line_count == 0 {
        return Err(ServiceError::ValidationError(format!(
            "Requisition {} must have at least one line",
            requisition.folio
        )));
    }
    Ok(())
}

/// Writes a status transition with the optimistic version check. The approver
/// is only ever written when the column is still empty.
async fn apply_transition(
    txn: &DatabaseTransaction,
    requisition: &requisition::Model,
    target: RequisitionStatus,
    approver: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut update = Requisition::update_many()
        .col_expr(requisition::Column::Status, Expr::value(target))
        .col_expr(
            requisition::Column::Version,
            Expr::value(requisition.version + 1),
        )
        .col_expr(requisition::Column::UpdatedAt, Expr::value(Utc::now()));

    if requisition.approver_id.is_none() {
        if let Some(approver_id) = approver {
            update = update.col_expr(
                requisition::Column::ApproverId,
                Expr::value(approver_id),
            );
        }
    }

    let applied = update
        .filter(requisition::Column::Id.eq(requisition.id))
        .filter(requisition::Column::Version.eq(requisition.version))
        .exec(txn)
        .await
        .map_err(ServiceError::db_error)?;

    if applied.rows_affected == 0 {
        return Err(ServiceError::ConcurrentModification(requisition.id));
    }
    Ok(())
}

async fn bump_version(
    txn: &DatabaseTransaction,
    requisition: &requisition::Model,
) -> Result<(), ServiceError> {
    let bumped = Requisition::update_many()
        .col_expr(
            requisition::Column::Version,
            Expr::value(requisition.version + 1),
        )
        .col_expr(requisition::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(requisition::Column::Id.eq(requisition.id))
        .filter(requisition::Column::Version.eq(requisition.version))
        .exec(txn)
        .await
        .map_err(ServiceError::db_error)?;

    if bumped.rows_affected == 0 {
        return Err(ServiceError::ConcurrentModification(requisition.id));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRequisitionInput {
    /// Explicit folio; allocated from the requisition sequence when omitted.
    #[validate(length(min = 1, max = 64))]
    pub folio: Option<String>,
    pub warehouse_id: Uuid,
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
    #[validate(length(min = 1, max = 50))]
    pub picking_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequisitionLine {
    pub item_id: Uuid,
    pub requested_qty: Decimal,
    pub ordered_qty: Decimal,
    pub source_location_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequisitionLine {
    pub requested_qty: Option<Decimal>,
    pub ordered_qty: Option<Decimal>,
    pub source_location_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRequisitionDates {
    pub date_requested: Option<NaiveDate>,
    pub date_required: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct RequisitionListFilter {
    pub status: Option<RequisitionStatus>,
    pub claimant_id: Option<Uuid>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
