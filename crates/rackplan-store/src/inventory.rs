//! Rack and device inventory

use rackplan_core::{
    Device, DeviceCandidate, DeviceInput, DeviceView, Rack, RackCandidate, RackInput, RackView,
    RackplanError, RackplanResult,
};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::snapshot::{InventorySnapshot, SnapshotFile};

/// Records keyed by id; iteration order is identifier order
#[derive(Debug, Clone, Default)]
struct Records {
    racks: BTreeMap<i64, Rack>,
    devices: BTreeMap<i64, Device>,
}

impl Records {
    fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        Self {
            racks: snapshot.racks.into_iter().map(|r| (r.id, r)).collect(),
            devices: snapshot.devices.into_iter().map(|d| (d.id, d)).collect(),
        }
    }

    fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            racks: self.racks.values().cloned().collect(),
            devices: self.devices.values().cloned().collect(),
        }
    }

    fn rack(&self, id: i64) -> RackplanResult<&Rack> {
        self.racks.get(&id).ok_or(RackplanError::RackNotFound(id))
    }

    fn device(&self, id: i64) -> RackplanResult<&Device> {
        self.devices.get(&id).ok_or(RackplanError::DeviceNotFound(id))
    }

    fn mounted_in(&self, rack_id: i64) -> impl Iterator<Item = &Device> {
        self.devices
            .values()
            .filter(move |d| d.rack_id == Some(rack_id))
    }

    fn rack_view(&self, rack: &Rack) -> RackView {
        RackView::new(rack.clone(), self.mounted_in(rack.id))
    }

    fn device_view(&self, device: &Device) -> DeviceView {
        let rack = device.rack_id.and_then(|id| self.racks.get(&id));
        DeviceView::new(device.clone(), rack)
    }

    /// Serial numbers are unique across racks and devices; the record being
    /// updated is excluded from the search.
    fn ensure_serial_free(
        &self,
        serial_number: &str,
        skip_rack: Option<i64>,
        skip_device: Option<i64>,
    ) -> RackplanResult<()> {
        let rack_taken = self
            .racks
            .values()
            .any(|r| r.serial_number == serial_number && Some(r.id) != skip_rack);
        let device_taken = self
            .devices
            .values()
            .any(|d| d.serial_number == serial_number && Some(d.id) != skip_device);

        if rack_taken || device_taken {
            return Err(RackplanError::AlreadyExists(format!(
                "Serial number '{}' already exists.",
                serial_number
            )));
        }
        Ok(())
    }

    /// Check that a device fits the rack's current occupancy. Power is
    /// checked before space; `skip_device` drops an existing contribution.
    ///
    /// Sums are taken in `i128` so large stored values cannot wrap.
    fn ensure_fits(
        &self,
        rack: &Rack,
        unit_size: i64,
        power_consumption: i64,
        skip_device: Option<i64>,
    ) -> RackplanResult<()> {
        let (power_used, units_used) = self
            .mounted_in(rack.id)
            .filter(|d| Some(d.id) != skip_device)
            .fold((0i128, 0i128), |(power, units), d| {
                (
                    power + i128::from(d.power_consumption),
                    units + i128::from(d.unit_size),
                )
            });

        if power_used + i128::from(power_consumption) > i128::from(rack.max_power_consumption) {
            return Err(RackplanError::Validation(
                "Power consumption exceeds maximum allowed value in the current rack.".to_string(),
            ));
        }
        if units_used + i128::from(unit_size) > i128::from(rack.unit_capacity) {
            return Err(RackplanError::Validation(
                "There is not enough space in rack to store this device.".to_string(),
            ));
        }
        Ok(())
    }

    fn check_device(&self, input: &DeviceInput, skip_device: Option<i64>) -> RackplanResult<()> {
        if let Some(rack_id) = input.rack_id {
            let rack = self.rack(rack_id)?;
            self.ensure_fits(rack, input.unit_size, input.power_consumption, skip_device)?;
        }
        self.ensure_serial_free(&input.serial_number, None, skip_device)
    }

    fn rack_candidates(&self, ids: &[i64]) -> Vec<RackCandidate> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let candidates: Vec<RackCandidate> = self
            .racks
            .values()
            .filter(|r| wanted.contains(&r.id))
            .map(RackCandidate::from)
            .collect();

        debug!(requested = ids.len(), resolved = candidates.len(), "Resolved rack candidates");
        candidates
    }

    fn device_candidates(&self, ids: &[i64]) -> Vec<DeviceCandidate> {
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let candidates: Vec<DeviceCandidate> = self
            .devices
            .values()
            .filter(|d| wanted.contains(&d.id))
            .map(DeviceCandidate::from)
            .collect();

        debug!(requested = ids.len(), resolved = candidates.len(), "Resolved device candidates");
        candidates
    }

    fn next_rack_id(&self) -> i64 {
        self.racks.keys().next_back().map_or(1, |id| id + 1)
    }

    fn next_device_id(&self) -> i64 {
        self.devices.keys().next_back().map_or(1, |id| id + 1)
    }
}

/// Inventory of racks and devices.
///
/// All records live in memory. When opened with a snapshot file every
/// successful mutation is written back to it.
pub struct Inventory {
    records: RwLock<Records>,
    snapshot: Option<SnapshotFile>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    /// Create an empty, memory-only inventory
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            snapshot: None,
        }
    }

    /// Open an inventory backed by a snapshot file, loading it if present
    pub async fn open(path: PathBuf) -> RackplanResult<Self> {
        let file = SnapshotFile::new(path);
        let records = match file.load().await? {
            Some(snapshot) => Records::from_snapshot(snapshot),
            None => {
                info!(path = %file.path().display(), "Starting with empty inventory");
                Records::default()
            }
        };

        Ok(Self {
            records: RwLock::new(records),
            snapshot: Some(file),
        })
    }

    /// Write `staged` to the snapshot file, then make it current.
    ///
    /// A failed write leaves `current` untouched.
    async fn commit(&self, current: &mut Records, staged: Records) -> RackplanResult<()> {
        if let Some(file) = &self.snapshot {
            file.save(&staged.snapshot()).await?;
        }
        *current = staged;
        Ok(())
    }

    /// Number of racks and devices
    pub async fn counts(&self) -> (usize, usize) {
        let records = self.records.read().await;
        (records.racks.len(), records.devices.len())
    }

    /// List all racks with their current load
    pub async fn list_racks(&self) -> Vec<RackView> {
        let records = self.records.read().await;
        records.racks.values().map(|r| records.rack_view(r)).collect()
    }

    /// Get a rack with its current load
    pub async fn get_rack(&self, id: i64) -> RackplanResult<RackView> {
        let records = self.records.read().await;
        let rack = records.rack(id)?;
        Ok(records.rack_view(rack))
    }

    /// Create a rack
    pub async fn create_rack(&self, input: RackInput) -> RackplanResult<Rack> {
        let input = input.normalized();
        input.validate()?;

        let mut records = self.records.write().await;
        if let Some(id) = input.id {
            if records.racks.contains_key(&id) {
                return Err(RackplanError::AlreadyExists(format!(
                    "Rack with id '{}' already exists.",
                    id
                )));
            }
        }
        records.ensure_serial_free(&input.serial_number, None, None)?;

        let id = input.id.unwrap_or_else(|| records.next_rack_id());
        let rack = Rack::new(id, input);
        let mut staged = records.clone();
        staged.racks.insert(id, rack.clone());
        self.commit(&mut records, staged).await?;

        info!(rack_id = id, name = %rack.name, "Rack created");
        Ok(rack)
    }

    /// Update a rack's fields; mounted devices are not re-checked
    pub async fn update_rack(&self, id: i64, input: RackInput) -> RackplanResult<Rack> {
        let mut input = input.normalized();
        input.id = Some(id);

        let mut records = self.records.write().await;
        records.rack(id)?;
        input.validate()?;
        records.ensure_serial_free(&input.serial_number, Some(id), None)?;

        let mut staged = records.clone();
        let rack = staged
            .racks
            .get_mut(&id)
            .ok_or(RackplanError::RackNotFound(id))?;
        rack.apply(input);
        let rack = rack.clone();
        self.commit(&mut records, staged).await?;

        info!(rack_id = id, "Rack updated");
        Ok(rack)
    }

    /// Delete a rack that no device references
    pub async fn delete_rack(&self, id: i64) -> RackplanResult<Rack> {
        let mut records = self.records.write().await;
        let rack = records.rack(id)?;

        let mounted = records.mounted_in(id).count();
        if mounted > 0 {
            return Err(RackplanError::RackNotEmpty {
                name: rack.name.clone(),
                devices: mounted,
            });
        }

        let mut staged = records.clone();
        let rack = staged
            .racks
            .remove(&id)
            .ok_or(RackplanError::RackNotFound(id))?;
        self.commit(&mut records, staged).await?;

        info!(rack_id = id, name = %rack.name, "Rack deleted");
        Ok(rack)
    }

    /// List all devices with their rack names
    pub async fn list_devices(&self) -> Vec<DeviceView> {
        let records = self.records.read().await;
        records
            .devices
            .values()
            .map(|d| records.device_view(d))
            .collect()
    }

    /// Get a device with its rack name
    pub async fn get_device(&self, id: i64) -> RackplanResult<DeviceView> {
        let records = self.records.read().await;
        let device = records.device(id)?;
        Ok(records.device_view(device))
    }

    /// Create a device, optionally mounted in a rack with room for it
    pub async fn create_device(&self, input: DeviceInput) -> RackplanResult<Device> {
        let input = input.normalized();
        input.validate()?;

        let mut records = self.records.write().await;
        if let Some(id) = input.id {
            if records.devices.contains_key(&id) {
                return Err(RackplanError::AlreadyExists(format!(
                    "Device with id '{}' already exists.",
                    id
                )));
            }
        }
        records.check_device(&input, None)?;

        let id = input.id.unwrap_or_else(|| records.next_device_id());
        let device = Device::new(id, input);
        let mut staged = records.clone();
        staged.devices.insert(id, device.clone());
        self.commit(&mut records, staged).await?;

        info!(device_id = id, name = %device.name, rack_id = ?device.rack_id, "Device created");
        Ok(device)
    }

    /// Update a device; its previous load is excluded from the rack check
    pub async fn update_device(&self, id: i64, input: DeviceInput) -> RackplanResult<Device> {
        let mut input = input.normalized();
        input.id = Some(id);

        let mut records = self.records.write().await;
        records.device(id)?;
        input.validate()?;
        records.check_device(&input, Some(id))?;

        let mut staged = records.clone();
        let device = staged
            .devices
            .get_mut(&id)
            .ok_or(RackplanError::DeviceNotFound(id))?;
        device.apply(input);
        let device = device.clone();
        self.commit(&mut records, staged).await?;

        info!(device_id = id, rack_id = ?device.rack_id, "Device updated");
        Ok(device)
    }

    /// Delete a device
    pub async fn delete_device(&self, id: i64) -> RackplanResult<Device> {
        let mut records = self.records.write().await;
        let mut staged = records.clone();
        let device = staged
            .devices
            .remove(&id)
            .ok_or(RackplanError::DeviceNotFound(id))?;
        self.commit(&mut records, staged).await?;

        info!(device_id = id, name = %device.name, "Device deleted");
        Ok(device)
    }

    /// Mount a device in a rack that has room for it
    pub async fn add_device_to_rack(&self, device_id: i64, rack_id: i64) -> RackplanResult<String> {
        let mut records = self.records.write().await;
        let rack = records.rack(rack_id)?.clone();
        let device = records.device(device_id)?.clone();

        if device.rack_id == Some(rack_id) {
            return Ok("Device is already added to this rack".to_string());
        }
        records.ensure_fits(&rack, device.unit_size, device.power_consumption, None)?;

        let mut staged = records.clone();
        if let Some(d) = staged.devices.get_mut(&device_id) {
            d.rack_id = Some(rack_id);
            d.updated_at = chrono::Utc::now();
        }
        self.commit(&mut records, staged).await?;

        info!(device_id, rack_id, "Device added to rack");
        Ok(format!(
            "Device '{}' is added to rack '{}'",
            device.name, rack.name
        ))
    }

    /// Unmount a device from a rack
    pub async fn remove_device_from_rack(
        &self,
        device_id: i64,
        rack_id: i64,
    ) -> RackplanResult<String> {
        let mut records = self.records.write().await;
        let rack = records.rack(rack_id)?.clone();
        let device = records.device(device_id)?.clone();

        if device.rack_id != Some(rack_id) {
            return Ok("Device is already removed from this rack".to_string());
        }

        let mut staged = records.clone();
        if let Some(d) = staged.devices.get_mut(&device_id) {
            d.rack_id = None;
            d.updated_at = chrono::Utc::now();
        }
        self.commit(&mut records, staged).await?;

        info!(device_id, rack_id, "Device removed from rack");
        Ok(format!(
            "Device '{}' is removed from rack '{}'",
            device.name, rack.name
        ))
    }

    /// Resolve rack ids to suggestion candidates in identifier order.
    ///
    /// Unknown ids are dropped and duplicates collapse.
    pub async fn rack_candidates(&self, ids: &[i64]) -> Vec<RackCandidate> {
        self.records.read().await.rack_candidates(ids)
    }

    /// Resolve device ids to suggestion candidates in identifier order.
    ///
    /// Unknown ids are dropped and duplicates collapse. Current rack
    /// membership is ignored.
    pub async fn device_candidates(&self, ids: &[i64]) -> Vec<DeviceCandidate> {
        self.records.read().await.device_candidates(ids)
    }

    /// Resolve both id lists against one consistent view of the inventory
    pub async fn candidates(
        &self,
        rack_ids: &[i64],
        device_ids: &[i64],
    ) -> (Vec<RackCandidate>, Vec<DeviceCandidate>) {
        let records = self.records.read().await;
        (
            records.rack_candidates(rack_ids),
            records.device_candidates(device_ids),
        )
    }

    /// Populate an empty inventory with two racks and three devices
    pub async fn seed_demo_data(&self) -> RackplanResult<bool> {
        if self.counts().await != (0, 0) {
            debug!("Inventory not empty, skipping demo data");
            return Ok(false);
        }

        let racks = [("R1", "SN-001", 10, 2000), ("R2", "SN-002", 12, 1500)];
        for (name, serial_number, unit_capacity, max_power_consumption) in racks {
            self.create_rack(RackInput {
                id: None,
                name: name.to_string(),
                description: format!("{} desc", name),
                serial_number: serial_number.to_string(),
                unit_capacity,
                max_power_consumption,
            })
            .await?;
        }

        let devices = [
            ("D1", "SN-003", 2, 500, 1),
            ("D2", "SN-004", 4, 600, 2),
            ("D3", "SN-005", 4, 550, 2),
        ];
        for (name, serial_number, unit_size, power_consumption, rack_id) in devices {
            self.create_device(DeviceInput {
                id: None,
                name: name.to_string(),
                description: format!("{} desc", name),
                serial_number: serial_number.to_string(),
                unit_size,
                power_consumption,
                rack_id: Some(rack_id),
            })
            .await?;
        }

        info!("Seeded demo inventory");
        Ok(true)
    }
}
