//! JSON snapshot persistence for the inventory

use rackplan_core::{Device, Rack, RackplanError, RackplanResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Serialized form of the whole inventory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub racks: Vec<Rack>,
    pub devices: Vec<Device>,
}

/// Snapshot file on disk
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `None` when the file does not exist yet
    pub async fn load(&self) -> RackplanResult<Option<InventorySnapshot>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let content = tokio::fs::read(&self.path).await?;
        let snapshot: InventorySnapshot = serde_json::from_slice(&content).map_err(|e| {
            RackplanError::Storage(format!(
                "Failed to parse snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(
            path = %self.path.display(),
            racks = snapshot.racks.len(),
            devices = snapshot.devices.len(),
            "Loaded inventory snapshot"
        );
        Ok(Some(snapshot))
    }

    /// Replace the snapshot atomically (write a sibling file, then rename)
    pub async fn save(&self, snapshot: &InventorySnapshot) -> RackplanResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !tokio::fs::try_exists(parent).await? {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "Saved inventory snapshot");
        Ok(())
    }
}
