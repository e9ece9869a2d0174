#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use warehouse_req_api::{
    config::AppConfig,
    db,
    entities::{
        item, item_supplier, requisition, requisition_line, stock_level, stock_location, supplier,
    },
    events::{self, EventSender},
    identity::{CallerIdentity, FixedIdentity},
    services::{
        factory::{ServiceContainer, ServiceFactory},
        requisitions::{CreateRequisitionInput, NewRequisitionLine},
    },
    AppState,
};

/// Helper harness for spinning up an application state backed by a private
/// SQLite database file per test.
pub struct TestApp {
    pub state: AppState,
    pub identity: Arc<FixedIdentity>,
    db_path: PathBuf,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_path = std::env::temp_dir().join(format!(
            "warehouse_req_test_{}.db",
            Uuid::new_v4().simple()
        ));
        let _ = std::fs::remove_file(&db_path);

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let identity = Arc::new(FixedIdentity::new(Uuid::new_v4()));
        let identity_dyn: Arc<dyn CallerIdentity> = identity.clone();

        let factory = ServiceFactory::new(db_arc.clone(), event_sender.clone(), identity_dyn);
        let services = ServiceContainer::new(&factory);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        Self {
            state,
            identity,
            db_path,
            _event_task: event_task,
        }
    }

    /// The identity every service call currently runs as.
    pub fn current_actor(&self) -> Uuid {
        self.identity.current_actor()
    }

    pub async fn seed_location(&self, code: &str) -> stock_location::Model {
        stock_location::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            name: Set(format!("Location {}", code)),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed stock location")
    }

    pub async fn seed_item(&self, item_number: &str, list_price: Decimal) -> item::Model {
        item::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_number: Set(item_number.to_string()),
            description: Set(Some(format!("Test item {}", item_number))),
            primary_uom_code: Set("pcs".to_string()),
            list_price: Set(list_price),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed item")
    }

    pub async fn seed_supplier(&self, name: &str) -> supplier::Model {
        supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            status: Set(supplier::SupplierStatus::Active),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed supplier")
    }

    /// Registers a supplier for an item; lower sequence wins the primary slot.
    pub async fn link_item_supplier(
        &self,
        item_id: Uuid,
        supplier_id: Uuid,
        sequence: i32,
    ) -> item_supplier::Model {
        item_supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item_id),
            supplier_id: Set(supplier_id),
            sequence: Set(sequence),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed item supplier link")
    }

    pub async fn set_on_hand(
        &self,
        item_id: Uuid,
        location_id: Uuid,
        on_hand: Decimal,
    ) -> stock_level::Model {
        stock_level::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_id: Set(item_id),
            location_id: Set(location_id),
            on_hand: Set(on_hand),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed stock level")
    }

    /// A valid creation input targeting the given destination location, with
    /// a week between requested and required dates.
    pub fn requisition_input(&self, destination_location_id: Uuid) -> CreateRequisitionInput {
        let today = Utc::now().date_naive();
        CreateRequisitionInput {
            folio: None,
            warehouse_id: Uuid::new_v4(),
            date_requested: today,
            date_required: Some(today + Duration::days(7)),
            reason: requisition::RequisitionReason::Production,
            reference_type: None,
            reference_folio: None,
            destination_location_id,
            shipping_type: None,
            client_id: None,
            deliver_to: None,
            deliver_address: None,
            picking_type: "internal".to_string(),
        }
    }

    pub async fn create_draft(&self, destination_location_id: Uuid) -> requisition::Model {
        self.state
            .services
            .requisitions
            .create_requisition(self.requisition_input(destination_location_id))
            .await
            .expect("create draft requisition")
    }

    pub async fn add_line(
        &self,
        requisition_id: Uuid,
        item_id: Uuid,
        requested_qty: Decimal,
        ordered_qty: Decimal,
        source_location_id: Uuid,
    ) -> requisition_line::Model {
        self.state
            .services
            .requisitions
            .add_line(
                requisition_id,
                NewRequisitionLine {
                    item_id,
                    requested_qty,
                    ordered_qty,
                    source_location_id,
                },
            )
            .await
            .expect("add requisition line")
    }

    /// Approves as the given actor, then restores the previous acting
    /// identity.
    pub async fn approve_as(&self, requisition_id: Uuid, approver: Uuid) -> requisition::Model {
        let previous = self.identity.current_actor();
        self.identity.set_actor(approver);
        let approved = self
            .state
            .services
            .requisitions
            .approve(requisition_id)
            .await;
        self.identity.set_actor(previous);
        approved.expect("approve requisition")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
        let _ = std::fs::remove_file(&self.db_path);
    }
}
