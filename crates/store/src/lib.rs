//! Storage boundary for the food-ordering platform.
//!
//! Two traits model the external document stores:
//! - [`OrderStore`] persists order documents with conditional
//!   (version-checked) updates, serializing concurrent writers on the
//!   same order.
//! - [`InventoryStore`] exposes stock mutation as single atomic
//!   conditional updates (`reserve`/`restore`), never a read followed
//!   by a write.
//!
//! The in-memory implementations stand in for the real stores and double
//! as test fixtures.

mod error;
mod inventory;
mod memory;
mod order;

pub use error::{Result, StoreError};
pub use inventory::{InventoryOp, InventoryStore};
pub use memory::{InMemoryInventoryStore, InMemoryOrderStore};
pub use order::OrderStore;
