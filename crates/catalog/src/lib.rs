//! Catalog query client for the food-ordering saga.
//!
//! Order validation reads the catalog through [`CatalogClient`] and
//! classifies each item into a [`ValidationOutcome`] — a tagged variant,
//! not a boolean, so the orchestrator keeps the failure kind it needs for
//! failure reasons and compensation decisions.

mod client;
mod http;
mod memory;

pub use client::{CatalogClient, FoodItemRecord, ValidationOutcome};
pub use http::{HttpCatalogClient, HttpInventoryStore, ServiceCredentials};
pub use memory::InMemoryCatalogClient;
