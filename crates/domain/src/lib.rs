//! Domain layer for the food-ordering platform.
//!
//! This crate provides the core domain model:
//! - `Order` document with snapshot-priced items and the total-amount law
//! - `OrderStatus` state machine with transition guards
//! - `InventoryItem` with availability derived from stock

pub mod inventory;
pub mod order;

pub use inventory::InventoryItem;
pub use order::{Order, OrderError, OrderLine, OrderStatus, TOTAL_TOLERANCE, line_total};
