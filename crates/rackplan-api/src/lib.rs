//! rackplan-api: REST API server for rackplan
//!
//! This crate provides the REST API for interacting with rackplan:
//! - Rack and device management
//! - Mounting devices in racks
//! - Placement suggestions
//! - System status

pub mod rest;

pub use rest::{create_app, create_router};
