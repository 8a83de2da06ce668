//! Candidate snapshots and result records for placement suggestions

use serde::{Deserialize, Serialize};

use crate::{Device, Rack};

/// Immutable view of a rack for one suggestion run.
///
/// The rack is always treated as empty: devices already mounted in it are
/// not counted against its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackCandidate {
    pub id: i64,
    pub name: String,
    /// Total slot units
    pub unit_capacity: u64,
    /// Maximum power draw in watts
    pub max_power_consumption: u64,
}

impl RackCandidate {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        unit_capacity: u64,
        max_power_consumption: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit_capacity,
            max_power_consumption,
        }
    }
}

impl From<&Rack> for RackCandidate {
    fn from(rack: &Rack) -> Self {
        Self::new(
            rack.id,
            rack.name.clone(),
            non_negative(rack.unit_capacity),
            non_negative(rack.max_power_consumption),
        )
    }
}

/// Immutable view of a device for one suggestion run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCandidate {
    pub id: i64,
    /// Slot units occupied
    pub unit_size: u64,
    /// Power draw in watts
    pub power_consumption: u64,
}

impl DeviceCandidate {
    pub fn new(id: i64, unit_size: u64, power_consumption: u64) -> Self {
        Self {
            id,
            unit_size,
            power_consumption,
        }
    }
}

impl From<&Device> for DeviceCandidate {
    fn from(device: &Device) -> Self {
        Self::new(
            device.id,
            non_negative(device.unit_size),
            non_negative(device.power_consumption),
        )
    }
}

// Stored records are validated positive; clamp anything else to zero.
fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Suggested contents of one rack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackSuggestion {
    pub rack_id: i64,
    pub rack_name: String,
    pub max_power_consumption: u64,
    /// Summed power draw of the suggested devices
    pub power_consumption: u64,
    pub power_percentage: f64,
    pub unit_capacity: u64,
    /// Summed slot units of the suggested devices
    pub unit_size_taken: u64,
    pub size_percentage: f64,
    /// Device ids in placement order
    pub device_ids: Vec<i64>,
}
