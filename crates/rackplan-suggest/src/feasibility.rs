//! Aggregate capacity check run before any per-device work

use rackplan_core::{DeviceCandidate, RackCandidate, RackplanError, RackplanResult};
use tracing::warn;

/// Summed capacity of the candidate racks and summed demand of the devices.
///
/// Sums are `u128` so any number of `u64` values adds up without wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub rack_units: u128,
    pub rack_power: u128,
    pub device_units: u128,
    pub device_power: u128,
}

impl Totals {
    pub fn new(racks: &[RackCandidate], devices: &[DeviceCandidate]) -> Self {
        Self {
            rack_units: racks.iter().map(|r| u128::from(r.unit_capacity)).sum(),
            rack_power: racks.iter().map(|r| u128::from(r.max_power_consumption)).sum(),
            device_units: devices.iter().map(|d| u128::from(d.unit_size)).sum(),
            device_power: devices.iter().map(|d| u128::from(d.power_consumption)).sum(),
        }
    }
}

/// Reject requests whose total demand exceeds total capacity.
///
/// Space is checked before power. Passing does not guarantee that every
/// device fits a single rack.
pub fn check_feasibility(
    racks: &[RackCandidate],
    devices: &[DeviceCandidate],
) -> RackplanResult<Totals> {
    let totals = Totals::new(racks, devices);

    if totals.device_units > totals.rack_units {
        warn!(
            device_units = totals.device_units,
            rack_units = totals.rack_units,
            "Suggestion rejected: not enough space"
        );
        return Err(RackplanError::InsufficientSpace);
    }

    if totals.device_power > totals.rack_power {
        warn!(
            device_power = totals.device_power,
            rack_power = totals.rack_power,
            "Suggestion rejected: not enough power"
        );
        return Err(RackplanError::InsufficientPower);
    }

    Ok(totals)
}
