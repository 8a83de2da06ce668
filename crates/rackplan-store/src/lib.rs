//! rackplan-store: Rack and device inventory storage
//!
//! This crate provides the inventory repository:
//! - Rack and device records with existence, uniqueness and capacity checks
//! - Candidate loading for placement suggestions
//! - JSON snapshot persistence

pub mod inventory;
pub mod snapshot;

pub use inventory::Inventory;
pub use snapshot::{InventorySnapshot, SnapshotFile};
