//! Candidate ordering
//!
//! Both sorts are stable and use a single key, so candidates with equal
//! power keep the order in which the inventory returned them.

use rackplan_core::{DeviceCandidate, RackCandidate};

/// Order racks by maximum power draw, largest first
pub fn order_racks(mut racks: Vec<RackCandidate>) -> Vec<RackCandidate> {
    racks.sort_by(|a, b| b.max_power_consumption.cmp(&a.max_power_consumption));
    racks
}

/// Order devices by power draw, largest first
pub fn order_devices(mut devices: Vec<DeviceCandidate>) -> Vec<DeviceCandidate> {
    devices.sort_by(|a, b| b.power_consumption.cmp(&a.power_consumption));
    devices
}
