//! Error types for rackplan

use thiserror::Error;

/// Main error type for rackplan
#[derive(Error, Debug)]
pub enum RackplanError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field or business rule was violated by a request
    #[error("{0}")]
    Validation(String),

    /// Rack not found
    #[error("Rack with id {0} does not exist")]
    RackNotFound(i64),

    /// Device not found
    #[error("Device with id {0} does not exist")]
    DeviceNotFound(i64),

    /// Duplicate identifier or serial number
    #[error("{0}")]
    AlreadyExists(String),

    /// Rack still referenced by devices
    #[error("Rack '{name}' still holds {devices} device(s)")]
    RackNotEmpty { name: String, devices: usize },

    /// Requested devices need more slot units than the candidate racks offer
    #[error("Not enough space to store all devices")]
    InsufficientSpace,

    /// Requested devices draw more power than the candidate racks allow
    #[error("Not enough power to store all devices")]
    InsufficientPower,

    /// A device fits no candidate rack during greedy assignment
    #[error("Not enough space or power to store all devices")]
    PlacementFailed,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RackplanError {
    /// Whether the error is caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RackplanError::Validation(_)
                | RackplanError::RackNotFound(_)
                | RackplanError::DeviceNotFound(_)
                | RackplanError::AlreadyExists(_)
                | RackplanError::RackNotEmpty { .. }
                | RackplanError::InsufficientSpace
                | RackplanError::InsufficientPower
                | RackplanError::PlacementFailed
        )
    }
}

/// Result type for rackplan operations
pub type RackplanResult<T> = Result<T, RackplanError>;

impl From<serde_json::Error> for RackplanError {
    fn from(err: serde_json::Error) -> Self {
        RackplanError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for RackplanError {
    fn from(err: toml::de::Error) -> Self {
        RackplanError::Config(err.to_string())
    }
}
