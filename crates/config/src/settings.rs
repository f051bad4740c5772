//! Configuration settings structures

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};
use oak_types::{
	AccountKind, CallIndices, Chain, ChainAsset, ChainFamily, ChainValidationError,
	DerivationConfig, Weight,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
	/// Chains keyed by chain key
	#[serde(default)]
	pub chains: HashMap<String, ChainSettings>,
	#[serde(default)]
	pub logging: LoggingSettings,
	#[serde(default)]
	pub sdk: SdkSettings,
}

/// Configuration of one chain
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChainSettings {
	pub family: ChainFamily,
	pub network: String,
	#[serde(default)]
	pub relay_chain: String,
	/// `ws(s)://` or `http(s)://` endpoint, plain or `env:NAME`
	pub endpoint: ConfigurableValue,
	#[serde(default)]
	pub para_id: Option<u32>,
	#[serde(default)]
	pub account_kind: AccountKind,
	pub default_asset: ChainAsset,
	#[serde(default)]
	pub assets: Vec<ChainAsset>,
	pub instruction_weight: Weight,
	#[serde(default)]
	pub derivation: Option<DerivationConfig>,
	#[serde(default)]
	pub call_indices: Vec<CallIndexSettings>,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
}

/// `{ call = "AutomationTime.schedule_xcmp_task", index = [60, 1] }`
///
/// Kept as a list since configuration keys are not case preserving.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CallIndexSettings {
	pub call: String,
	pub index: [u8; 2],
}

/// Settings of the scheduling SDK itself
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SdkSettings {
	/// Key of the OAK chain tasks are scheduled on
	#[serde(default)]
	pub origin: Option<String>,
	/// Per-request timeout of the JSON-RPC client
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	#[serde(default)]
	pub structured: bool,
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

fn default_enabled() -> bool {
	true
}

fn default_request_timeout_ms() -> u64 {
	30_000
}

impl Default for SdkSettings {
	fn default() -> Self {
		Self {
			origin: None,
			request_timeout_ms: default_request_timeout_ms(),
		}
	}
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Validation errors for settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
	#[error("Chain {chain}: cannot resolve endpoint: {source}")]
	UnresolvedEndpoint {
		chain: String,
		#[source]
		source: ConfigurableValueError,
	},

	#[error("Chain {chain}: invalid endpoint '{endpoint}': {reason}")]
	InvalidEndpoint {
		chain: String,
		endpoint: String,
		reason: String,
	},

	#[error("Chain {chain}: invalid call index entry '{call}', expected Pallet.function")]
	InvalidCallIndex { chain: String, call: String },

	#[error(transparent)]
	Chain(#[from] ChainValidationError),

	#[error("Origin chain '{key}' is not configured or not enabled")]
	UnknownOrigin { key: String },

	#[error("Origin chain '{key}' is a {family} chain; tasks can only be scheduled on oak chains")]
	OriginNotOak { key: String, family: ChainFamily },

	#[error("No origin chain configured and no enabled oak chain found")]
	MissingOrigin,
}

impl ChainSettings {
	/// Resolve the endpoint and build the validated chain configuration
	pub fn to_chain(&self, key: &str) -> Result<Chain, ConfigValidationError> {
		let endpoint =
			self.endpoint
				.resolve()
				.map_err(|source| ConfigValidationError::UnresolvedEndpoint {
					chain: key.to_string(),
					source,
				})?;
		validate_endpoint(key, &endpoint)?;

		let mut call_indices = CallIndices::new();
		for entry in &self.call_indices {
			let (pallet, function) = entry
				.call
				.split_once('.')
				.filter(|(pallet, function)| !pallet.is_empty() && !function.is_empty())
				.ok_or_else(|| ConfigValidationError::InvalidCallIndex {
					chain: key.to_string(),
					call: entry.call.clone(),
				})?;
			call_indices.insert(pallet, function, entry.index);
		}

		let mut default_asset = self.default_asset.clone();
		default_asset.is_native = true;

		let chain = Chain {
			key: key.to_string(),
			family: self.family,
			network: self.network.clone(),
			relay_chain: self.relay_chain.clone(),
			endpoint,
			para_id: self.para_id,
			account_kind: self.account_kind,
			default_asset,
			assets: self.assets.clone(),
			instruction_weight: self.instruction_weight,
			derivation: self.derivation.clone(),
			call_indices,
		};
		chain.validate()?;
		Ok(chain)
	}
}

fn validate_endpoint(chain: &str, endpoint: &str) -> Result<(), ConfigValidationError> {
	let invalid = |reason: String| ConfigValidationError::InvalidEndpoint {
		chain: chain.to_string(),
		endpoint: endpoint.to_string(),
		reason,
	};

	let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
	match url.scheme() {
		"ws" | "wss" | "http" | "https" => Ok(()),
		other => Err(invalid(format!("unsupported scheme '{}'", other))),
	}
}

impl Settings {
	/// Enabled chains, resolved and validated, sorted by key
	pub fn enabled_chains(&self) -> Result<Vec<Chain>, ConfigValidationError> {
		let mut keys: Vec<&String> = self
			.chains
			.iter()
			.filter(|(_, chain)| chain.enabled)
			.map(|(key, _)| key)
			.collect();
		keys.sort();

		keys.into_iter()
			.map(|key| self.chains[key].to_chain(key))
			.collect()
	}

	/// Key of the origin chain: the configured one, or the first enabled oak chain by key
	pub fn origin_key(&self) -> Result<String, ConfigValidationError> {
		if let Some(key) = &self.sdk.origin {
			let chain = self
				.chains
				.get(key)
				.filter(|chain| chain.enabled)
				.ok_or_else(|| ConfigValidationError::UnknownOrigin { key: key.clone() })?;
			if chain.family != ChainFamily::Oak {
				return Err(ConfigValidationError::OriginNotOak {
					key: key.clone(),
					family: chain.family,
				});
			}
			return Ok(key.clone());
		}

		let mut oak_chains: Vec<&String> = self
			.chains
			.iter()
			.filter(|(_, chain)| chain.enabled && chain.family == ChainFamily::Oak)
			.map(|(key, _)| key)
			.collect();
		oak_chains.sort();
		oak_chains
			.first()
			.map(|key| key.to_string())
			.ok_or(ConfigValidationError::MissingOrigin)
	}

	/// Validate every enabled chain and the origin selection
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		self.enabled_chains()?;
		self.origin_key()?;
		Ok(())
	}
}
