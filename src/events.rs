use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Requisition lifecycle events
    RequisitionCreated(Uuid),
    RequisitionRequired(Uuid),
    RequisitionApproved {
        requisition_id: Uuid,
        approver_id: Uuid,
    },
    RequisitionCompleted(Uuid),
    RequisitionReset(Uuid),

    // Generated document events
    PurchaseOrdersGenerated {
        requisition_id: Uuid,
        purchase_order_ids: Vec<Uuid>,
    },
    StockPicksGenerated {
        requisition_id: Uuid,
        picking_ids: Vec<Uuid>,
    },

    // Fulfillment events
    StockPickingCompleted(Uuid),
}

// Define a trait for handling events. Handlers implementing this trait will process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

// Function to process incoming events and distribute them to registered event handlers.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        // Process events based on type
        match event {
            Event::RequisitionCreated(requisition_id) => {
                info!("Requisition created: {}", requisition_id);
            }
            Event::RequisitionRequired(requisition_id) => {
                info!("Requisition marked as required: {}", requisition_id);
            }
            Event::RequisitionApproved {
                requisition_id,
                approver_id,
            } => {
                if let Err(e) = handle_requisition_approved(requisition_id, approver_id).await {
                    error!(
                        "Failed to handle requisition approved event: requisition_id={}, error={}",
                        requisition_id, e
                    );
                }
            }
            Event::RequisitionCompleted(requisition_id) => {
                info!("Requisition completed: {}", requisition_id);
            }
            Event::RequisitionReset(requisition_id) => {
                warn!("Requisition reset to draft: {}", requisition_id);
            }
            Event::PurchaseOrdersGenerated {
                requisition_id,
                purchase_order_ids,
            } => {
                if let Err(e) =
                    handle_purchase_orders_generated(requisition_id, &purchase_order_ids).await
                {
                    error!(
                        "Failed to handle purchase orders generated event: requisition_id={}, error={}",
                        requisition_id, e
                    );
                }
            }
            Event::StockPicksGenerated {
                requisition_id,
                picking_ids,
            } => {
                if let Err(e) = handle_stock_picks_generated(requisition_id, &picking_ids).await {
                    error!(
                        "Failed to handle stock picks generated event: requisition_id={}, error={}",
                        requisition_id, e
                    );
                }
            }
            Event::StockPickingCompleted(picking_id) => {
                info!(
                    "Stock picking completed: {} - requisitions referencing it may now be closed",
                    picking_id
                );
            }
        }
    }

    warn!("Event processing loop has ended");
}

// Handler functions for specific events
async fn handle_requisition_approved(
    requisition_id: Uuid,
    approver_id: Uuid,
) -> Result<(), String> {
    info!(
        "Processing approval of requisition {} by {}",
        requisition_id, approver_id
    );

    // Procurement and fulfillment generation stay caller-driven; the event is
    // the notification hook for downstream consumers.
    Ok(())
}

async fn handle_purchase_orders_generated(
    requisition_id: Uuid,
    purchase_order_ids: &[Uuid],
) -> Result<(), String> {
    info!(
        "Requisition {} produced {} purchase order(s)",
        requisition_id,
        purchase_order_ids.len()
    );

    for po_id in purchase_order_ids {
        info!("Purchase order created: {}", po_id);
    }

    Ok(())
}

async fn handle_stock_picks_generated(
    requisition_id: Uuid,
    picking_ids: &[Uuid],
) -> Result<(), String> {
    info!(
        "Requisition {} produced {} stock picking(s)",
        requisition_id,
        picking_ids.len()
    );

    for picking_id in picking_ids {
        info!("Stock picking created: {}", picking_id);
    }

    Ok(())
}
