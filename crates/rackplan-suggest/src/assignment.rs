//! Greedy device-to-rack assignment

use rackplan_core::{DeviceCandidate, RackCandidate, RackplanError, RackplanResult};
use tracing::{debug, warn};

use crate::placement::{PlacementStrategy, RackLoad};

/// Devices placed into one rack, in placement order
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedRack<'a> {
    /// Position of the rack in the ordered candidate list
    pub rack_index: usize,
    pub rack: &'a RackCandidate,
    pub devices: Vec<DeviceCandidate>,
}

/// Racks that received at least one device, in first-touch order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment<'a> {
    entries: Vec<AssignedRack<'a>>,
}

impl<'a> Assignment<'a> {
    pub fn entries(&self) -> &[AssignedRack<'a>] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, rack_index: usize, rack: &'a RackCandidate, device: DeviceCandidate) {
        match self.entries.iter_mut().find(|e| e.rack_index == rack_index) {
            Some(entry) => entry.devices.push(device),
            None => self.entries.push(AssignedRack {
                rack_index,
                rack,
                devices: vec![device],
            }),
        }
    }
}

/// Place every device, in order, into the rack chosen by `strategy`.
///
/// All racks start empty. The first device that fits no rack aborts the run
/// and discards every placement made so far.
pub fn assign<'a>(
    racks: &'a [RackCandidate],
    devices: &[DeviceCandidate],
    strategy: &dyn PlacementStrategy,
) -> RackplanResult<Assignment<'a>> {
    let mut loads = vec![RackLoad::default(); racks.len()];
    let mut assignment = Assignment::default();

    for device in devices {
        let Some(index) = strategy.select(device, racks, &loads) else {
            warn!(
                device_id = device.id,
                unit_size = device.unit_size,
                power_consumption = device.power_consumption,
                "No rack can take device"
            );
            return Err(RackplanError::PlacementFailed);
        };

        let rack = &racks[index];
        loads[index].add(device);
        assignment.push(index, rack, *device);

        debug!(
            device_id = device.id,
            rack_id = rack.id,
            units_used = loads[index].units_used,
            power_used = loads[index].power_used,
            "Device placed"
        );
    }

    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::BalancedPowerStrategy;

    fn device_ids(assignment: &Assignment<'_>) -> Vec<(i64, Vec<i64>)> {
        assignment
            .entries()
            .iter()
            .map(|e| (e.rack.id, e.devices.iter().map(|d| d.id).collect()))
            .collect()
    }

    #[test]
    fn test_first_touch_order() {
        // The 2000 W rack comes first in rack order but has a single slot,
        // so the heaviest device lands in the 1000 W rack.
        let racks = vec![
            RackCandidate::new(1, "big", 1, 2000),
            RackCandidate::new(2, "small", 8, 1000),
        ];
        let devices = vec![
            DeviceCandidate::new(10, 2, 500),
            DeviceCandidate::new(11, 1, 400),
        ];

        let assignment = assign(&racks, &devices, &BalancedPowerStrategy).unwrap();
        // 10: infeasible vs 50% -> small. 11: 20% vs 90% -> big.
        assert_eq!(device_ids(&assignment), vec![(2, vec![10]), (1, vec![11])]);

        let racks = vec![
            RackCandidate::new(1, "big", 8, 2000),
            RackCandidate::new(2, "small", 8, 1000),
        ];
        let devices = vec![
            DeviceCandidate::new(10, 1, 900),
            DeviceCandidate::new(11, 1, 900),
        ];
        let assignment = assign(&racks, &devices, &BalancedPowerStrategy).unwrap();
        // 10: 45% vs 90% -> big. 11: 90% vs 90% -> big (first wins).
        assert_eq!(device_ids(&assignment), vec![(1, vec![10, 11])]);
    }

    #[test]
    fn test_racks_start_empty() {
        let racks = vec![RackCandidate::new(1, "R1", 2, 500)];
        let devices = vec![DeviceCandidate::new(1, 2, 500)];

        let assignment = assign(&racks, &devices, &BalancedPowerStrategy).unwrap();
        assert_eq!(assignment.entries()[0].devices.len(), 1);
    }

    #[test]
    fn test_fragmentation_fails() {
        let racks = vec![
            RackCandidate::new(1, "A", 4, 1000),
            RackCandidate::new(2, "B", 4, 1000),
        ];
        let devices = vec![
            DeviceCandidate::new(1, 3, 100),
            DeviceCandidate::new(2, 3, 100),
            DeviceCandidate::new(3, 2, 100),
        ];

        let result = assign(&racks, &devices, &BalancedPowerStrategy);
        assert!(matches!(result, Err(RackplanError::PlacementFailed)));
    }

    #[test]
    fn test_no_devices() {
        let racks = vec![RackCandidate::new(1, "R1", 2, 500)];
        let assignment = assign(&racks, &[], &BalancedPowerStrategy).unwrap();
        assert!(assignment.is_empty());
    }
}
