//! rackplan-suggest: Capacity-aware rack suggestions for rackplan
//!
//! Given candidate racks and devices, this crate computes a single-pass
//! greedy packing that respects both slot units and power draw:
//! - Ordering of candidates by power, largest first
//! - Aggregate feasibility gate
//! - Greedy assignment to the least power-loaded rack that fits
//! - Projection into per-rack summaries

pub mod assignment;
pub mod engine;
pub mod feasibility;
pub mod ordering;
pub mod placement;
pub mod projection;

pub use assignment::{assign, AssignedRack, Assignment};
pub use engine::SuggestionEngine;
pub use feasibility::{check_feasibility, Totals};
pub use ordering::{order_devices, order_racks};
pub use placement::{BalancedPowerStrategy, PlacementStrategy, RackLoad};
pub use projection::project;
