//! Configuration loading utilities

use crate::Settings;
use config::{Config, ConfigError, Environment, File};

/// Prefix of environment overrides, e.g. `OAK__SDK__ORIGIN=turing-local`
pub const ENV_PREFIX: &str = "OAK";

/// Load configuration from `config/config.{toml,json,..}` plus `OAK__` environment overrides
pub fn load_config() -> Result<Settings, ConfigError> {
	load_config_from("config/config")
}

/// Load configuration from the file at `path` (extension optional) plus environment overrides
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
	let s = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__"),
		)
		.build()?;

	s.try_deserialize()
}
