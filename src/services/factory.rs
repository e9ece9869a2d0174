use std::sync::Arc;

use crate::{
    db::DbPool,
    events::EventSender,
    identity::CallerIdentity,
    services::{
        catalog::CatalogService, fulfillment::FulfillmentService, procurement::ProcurementService,
        requisitions::RequisitionService, sequences::SequenceService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    identity: Arc<dyn CallerIdentity>,
}

impl ServiceFactory {
    /// Creates a new service factory with the given dependencies
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        identity: Arc<dyn CallerIdentity>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            identity,
        }
    }

    /// Creates a requisition service instance
    pub fn requisition_service(&self) -> RequisitionService {
        RequisitionService::new(
            self.db_pool.clone(),
            Arc::new(self.event_sender.clone()),
            self.identity.clone(),
        )
    }

    /// Creates a procurement service instance
    pub fn procurement_service(&self) -> ProcurementService {
        ProcurementService::new(self.db_pool.clone(), Arc::new(self.event_sender.clone()))
    }

    /// Creates a fulfillment service instance
    pub fn fulfillment_service(&self) -> FulfillmentService {
        FulfillmentService::new(self.db_pool.clone(), Arc::new(self.event_sender.clone()))
    }

    /// Creates a catalog service instance
    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.db_pool.clone())
    }

    /// Creates a folio sequence service instance
    pub fn sequence_service(&self) -> SequenceService {
        SequenceService::new(self.db_pool.clone())
    }

    /// Creates all services as a tuple for convenience
    pub fn create_all(
        &self,
    ) -> (
        RequisitionService,
        ProcurementService,
        FulfillmentService,
        CatalogService,
        SequenceService,
    ) {
        (
            self.requisition_service(),
            self.procurement_service(),
            self.fulfillment_service(),
            self.catalog_service(),
            self.sequence_service(),
        )
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }

    /// Gets a reference to the event sender
    pub fn event_sender(&self) -> &EventSender {
        &self.event_sender
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub requisitions: Arc<RequisitionService>,
    pub procurement: Arc<ProcurementService>,
    pub fulfillment: Arc<FulfillmentService>,
    pub catalog: Arc<CatalogService>,
    pub sequences: Arc<SequenceService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        let (requisitions, procurement, fulfillment, catalog, sequences) = factory.create_all();

        Self {
            requisitions: Arc::new(requisitions),
            procurement: Arc::new(procurement),
            fulfillment: Arc::new(fulfillment),
            catalog: Arc::new(catalog),
            sequences: Arc::new(sequences),
        }
    }
}
