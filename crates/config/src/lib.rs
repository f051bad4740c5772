//! OAK Configuration
//!
//! Configuration management and startup utilities for the OAK SDK.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::{load_config, load_config_from, ENV_PREFIX};
pub use settings::{
	CallIndexSettings, ChainSettings, ConfigValidationError, LogFormat, LoggingSettings,
	SdkSettings, Settings,
};
pub use startup_logger::{
	log_chain_info, log_service_info, log_service_shutdown, log_startup_complete,
};
