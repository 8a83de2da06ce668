//! Rack selection for a single device

use rackplan_core::{DeviceCandidate, RackCandidate};

/// Running totals for one rack during a suggestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RackLoad {
    pub units_used: u64,
    pub power_used: u64,
}

impl RackLoad {
    /// Whether the device fits within both limits; limits are inclusive
    pub fn fits(&self, rack: &RackCandidate, device: &DeviceCandidate) -> bool {
        self.units_used + device.unit_size <= rack.unit_capacity
            && self.power_used + device.power_consumption <= rack.max_power_consumption
    }

    /// Account for a device committed to this rack
    pub fn add(&mut self, device: &DeviceCandidate) {
        self.units_used += device.unit_size;
        self.power_used += device.power_consumption;
    }
}

/// Strategy for choosing the rack a device goes into
pub trait PlacementStrategy: Send + Sync {
    /// Pick a rack index for the device, or `None` when no rack can take it.
    ///
    /// `loads` is index-aligned with `racks`.
    fn select(
        &self,
        device: &DeviceCandidate,
        racks: &[RackCandidate],
        loads: &[RackLoad],
    ) -> Option<usize>;
}

/// Routes each device to the rack with the lowest resulting power utilization.
///
/// Slot units are only a feasibility filter and never influence the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedPowerStrategy;

impl BalancedPowerStrategy {
    /// Power utilization percentage the rack would reach with the device
    /// added, or infinity when the device does not fit.
    pub fn score(device: &DeviceCandidate, rack: &RackCandidate, load: &RackLoad) -> f64 {
        if !load.fits(rack, device) {
            return f64::INFINITY;
        }
        (load.power_used + device.power_consumption) as f64
            / rack.max_power_consumption as f64
            * 100.0
    }
}

impl PlacementStrategy for BalancedPowerStrategy {
    fn select(
        &self,
        device: &DeviceCandidate,
        racks: &[RackCandidate],
        loads: &[RackLoad],
    ) -> Option<usize> {
        // Strict `<` keeps the earliest rack on equal scores.
        let mut best: Option<(usize, f64)> = None;
        for (index, (rack, load)) in racks.iter().zip(loads).enumerate() {
            let score = Self::score(device, rack, load);
            if score == f64::INFINITY {
                continue;
            }
            match best {
                Some((_, best_score)) if score >= best_score => {}
                _ => best = Some((index, score)),
            }
        }
        best.map(|(index, _)| index)
    }
}
