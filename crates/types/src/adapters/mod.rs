//! Chain adapter contract

pub mod errors;
pub mod traits;

pub use errors::{AdapterError, UnresolvedAssetReason};
pub use traits::{ChainAdapter, RegistryTaskRequest, TaskRegister};

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
