pub mod allocator;
pub mod builder;
pub mod cidr;
pub mod materializer;

pub use allocator::AllocatorConfig;
pub use builder::FabricBuilder;

use thiserror::Error;

/// One variant per error kind a `processFabric` caller can observe.
#[derive(Debug, Error)]
pub enum FabricError {
    #[error("pod not found: {0}")]
    PodNotFound(String),
    #[error("ambiguous pod name: {0}")]
    AmbiguousPod(String),
    #[error("invalid topology: {0}")]
    TopologyInvalid(String),
    #[error("address space exhausted: {0}")]
    AddressSpaceExhausted(String),
    #[error("unknown device family: {0}")]
    UnknownDeviceFamily(String),
    #[error("pod '{0}' has structural changes but recreate was not requested")]
    RecreateRequired(String),
    #[error("invalid pod description: {0}")]
    InvalidDescription(String),
    #[error(transparent)]
    StoreFailure(#[from] sqlx::Error),
}

impl From<cidr::FitError> for FabricError {
    fn from(err: cidr::FitError) -> Self {
        FabricError::AddressSpaceExhausted(err.to_string())
    }
}
