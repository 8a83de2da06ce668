//! rackplan-core: Core types and traits for rackplan
//!
//! This crate provides the fundamental types used throughout the rackplan system:
//! - Rack and device records with field validation
//! - Candidate snapshots and result records for placement suggestions
//! - Configuration types
//! - Error handling

pub mod config;
pub mod error;
pub mod model;
pub mod suggestion;

pub use config::*;
pub use error::*;
pub use model::*;
pub use suggestion::*;
