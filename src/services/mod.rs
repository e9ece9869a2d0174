// Core requisition lifecycle
pub mod requisitions;

// Generated documents
pub mod fulfillment;
pub mod procurement;

// Supporting services
pub mod catalog;
pub mod sequences;

// Service factory for dependency injection
pub mod factory;
