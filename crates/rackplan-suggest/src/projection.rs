//! Turn an assignment into per-rack summaries

use rackplan_core::RackSuggestion;

use crate::assignment::{AssignedRack, Assignment};

/// Summarize every rack that received devices, in first-touch order
pub fn project(assignment: &Assignment<'_>) -> Vec<RackSuggestion> {
    assignment.entries().iter().map(summarize).collect()
}

fn summarize(entry: &AssignedRack<'_>) -> RackSuggestion {
    let rack = entry.rack;
    let power_consumption: u64 = entry.devices.iter().map(|d| d.power_consumption).sum();
    let unit_size_taken: u64 = entry.devices.iter().map(|d| d.unit_size).sum();

    RackSuggestion {
        rack_id: rack.id,
        rack_name: rack.name.clone(),
        max_power_consumption: rack.max_power_consumption,
        power_consumption,
        power_percentage: percentage(power_consumption, rack.max_power_consumption),
        unit_capacity: rack.unit_capacity,
        unit_size_taken,
        size_percentage: percentage(unit_size_taken, rack.unit_capacity),
        device_ids: entry.devices.iter().map(|d| d.id).collect(),
    }
}

fn percentage(used: u64, capacity: u64) -> f64 {
    used as f64 / capacity as f64 * 100.0
}
