//! Suggestion pipeline: ordering, feasibility gate, assignment, projection

use rackplan_core::{DeviceCandidate, RackCandidate, RackSuggestion, RackplanResult};
use std::sync::Arc;
use tracing::info;

use crate::assignment::assign;
use crate::feasibility::check_feasibility;
use crate::ordering::{order_devices, order_racks};
use crate::placement::{BalancedPowerStrategy, PlacementStrategy};
use crate::projection::project;

/// Computes device-to-rack suggestions.
///
/// Holds no per-request state; one engine can serve concurrent callers.
#[derive(Clone)]
pub struct SuggestionEngine {
    strategy: Arc<dyn PlacementStrategy>,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(Arc::new(BalancedPowerStrategy))
    }
}

impl SuggestionEngine {
    /// Create an engine with a custom placement strategy
    pub fn new(strategy: Arc<dyn PlacementStrategy>) -> Self {
        Self { strategy }
    }

    /// Suggest how to pack `devices` into `racks`, treating every rack as empty.
    ///
    /// Inputs are expected in inventory fetch order; it decides ties during
    /// ordering. Fails as a whole when any device cannot be placed.
    pub fn suggest(
        &self,
        racks: Vec<RackCandidate>,
        devices: Vec<DeviceCandidate>,
    ) -> RackplanResult<Vec<RackSuggestion>> {
        let racks = order_racks(racks);
        let devices = order_devices(devices);

        let totals = check_feasibility(&racks, &devices)?;
        let assignment = assign(&racks, &devices, self.strategy.as_ref())?;
        let suggestions = project(&assignment);

        info!(
            racks = racks.len(),
            devices = devices.len(),
            device_units = totals.device_units,
            device_power = totals.device_power,
            racks_used = suggestions.len(),
            "Suggestion computed"
        );

        Ok(suggestions)
    }
}
