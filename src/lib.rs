//! Warehouse Requisition API Library
//!
//! This crate provides the core functionality for the warehouse material
//! requisition service: the requisition lifecycle, purchase order and
//! stock pick generation, and the catalog lookups behind them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod identity;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use crate::services::factory::ServiceContainer;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: ServiceContainer,
}

impl AppState {
    pub fn requisition_service(&self) -> Arc<services::requisitions::RequisitionService> {
        self.services.requisitions.clone()
    }

    pub fn procurement_service(&self) -> Arc<services::procurement::ProcurementService> {
        self.services.procurement.clone()
    }

    pub fn fulfillment_service(&self) -> Arc<services::fulfillment::FulfillmentService> {
        self.services.fulfillment.clone()
    }

    pub fn catalog_service(&self) -> Arc<services::catalog::CatalogService> {
        self.services.catalog.clone()
    }
}

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::identity::*;
    pub use crate::services::factory::*;
}
