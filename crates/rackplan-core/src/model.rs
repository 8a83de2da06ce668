//! Rack and Device record definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RackplanError, RackplanResult};

/// Longest serial number accepted for racks and devices
pub const MAX_SERIAL_NUMBER_LEN: usize = 30;

/// An enclosure bounded by slot units and power draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rack {
    /// Unique identifier
    pub id: i64,
    /// Human-readable name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Serial number, unique across racks and devices
    pub serial_number: String,
    /// Total slot units
    pub unit_capacity: i64,
    /// Maximum power draw in watts
    pub max_power_consumption: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Rack {
    /// Build a rack from a validated input
    pub fn new(id: i64, input: RackInput) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: input.name,
            description: input.description,
            serial_number: input.serial_number,
            unit_capacity: input.unit_capacity,
            max_power_consumption: input.max_power_consumption,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields from a validated input
    pub fn apply(&mut self, input: RackInput) {
        self.name = input.name;
        self.description = input.description;
        self.serial_number = input.serial_number;
        self.unit_capacity = input.unit_capacity;
        self.max_power_consumption = input.max_power_consumption;
        self.updated_at = Utc::now();
    }
}

/// A piece of equipment that occupies slot units and draws power
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Unique identifier
    pub id: i64,
    /// Human-readable name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Serial number, unique across racks and devices
    pub serial_number: String,
    /// Slot units occupied
    pub unit_size: i64,
    /// Power draw in watts
    pub power_consumption: i64,
    /// Rack the device is mounted in
    pub rack_id: Option<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Build a device from a validated input
    pub fn new(id: i64, input: DeviceInput) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: input.name,
            description: input.description,
            serial_number: input.serial_number,
            unit_size: input.unit_size,
            power_consumption: input.power_consumption,
            rack_id: input.rack_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields from a validated input
    pub fn apply(&mut self, input: DeviceInput) {
        self.name = input.name;
        self.description = input.description;
        self.serial_number = input.serial_number;
        self.unit_size = input.unit_size;
        self.power_consumption = input.power_consumption;
        self.rack_id = input.rack_id;
        self.updated_at = Utc::now();
    }
}

/// Payload for creating or updating a rack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackInput {
    /// Explicit identifier; assigned automatically on create when absent
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub unit_capacity: i64,
    pub max_power_consumption: i64,
}

impl RackInput {
    /// Trim the free-text fields
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.serial_number = self.serial_number.trim().to_string();
        self
    }

    /// Check field-level rules; the first violation wins
    pub fn validate(&self) -> RackplanResult<()> {
        if matches!(self.id, Some(id) if id < 1) {
            return Err(invalid("Rack id must be positive number."));
        }
        if self.unit_capacity < 1 {
            return Err(invalid("Unit capacity must be positive number."));
        }
        if self.max_power_consumption < 1 {
            return Err(invalid("Max power consuption must be positive number."));
        }
        validate_serial_number(&self.serial_number)
    }
}

/// Payload for creating or updating a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInput {
    /// Explicit identifier; assigned automatically on create when absent
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub serial_number: String,
    pub unit_size: i64,
    pub power_consumption: i64,
    #[serde(default)]
    pub rack_id: Option<i64>,
}

impl DeviceInput {
    /// Trim the free-text fields
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.serial_number = self.serial_number.trim().to_string();
        self
    }

    /// Check field-level rules; the first violation wins
    pub fn validate(&self) -> RackplanResult<()> {
        if matches!(self.id, Some(id) if id < 1) {
            return Err(invalid("Device id must be positive number."));
        }
        if self.unit_size < 1 {
            return Err(invalid("Unit size must be positive number."));
        }
        if self.power_consumption < 1 {
            return Err(invalid("Power consuption must be positive number."));
        }
        validate_serial_number(&self.serial_number)
    }
}

fn validate_serial_number(serial_number: &str) -> RackplanResult<()> {
    if serial_number.chars().count() > MAX_SERIAL_NUMBER_LEN {
        return Err(invalid("Serial number must be maximum 30 characters"));
    }
    Ok(())
}

fn invalid(message: &str) -> RackplanError {
    RackplanError::Validation(message.to_string())
}

/// Rack together with the load of the devices currently mounted in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackView {
    #[serde(flatten)]
    pub rack: Rack,
    /// Summed power draw of mounted devices
    pub power_consumption: i64,
    /// Summed slot units of mounted devices
    pub unit_size_taken: i64,
}

impl RackView {
    /// Summarize a rack from the devices that reference it; sums saturate
    pub fn new<'a>(rack: Rack, mounted: impl IntoIterator<Item = &'a Device>) -> Self {
        let (power_consumption, unit_size_taken) =
            mounted.into_iter().fold((0i64, 0i64), |(power, units), d| {
                (
                    power.saturating_add(d.power_consumption),
                    units.saturating_add(d.unit_size),
                )
            });
        Self {
            rack,
            power_consumption,
            unit_size_taken,
        }
    }
}

/// Device together with the name of its rack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceView {
    #[serde(flatten)]
    pub device: Device,
    /// Rack name, or "None" when unassigned
    pub rack_name: String,
}

impl DeviceView {
    pub fn new(device: Device, rack: Option<&Rack>) -> Self {
        let rack_name = rack.map_or_else(|| "None".to_string(), |r| r.name.clone());
        Self { device, rack_name }
    }
}
