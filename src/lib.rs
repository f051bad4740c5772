//! OAK SDK
//!
//! Schedule XCM tasks on an OAK parachain (Turing, OAK) that execute on Moonbeam, Astar or
//! Mangata, paid either by the origin's sovereign account or by a derivative account of
//! the user.

use oak_adapters::{AdapterRegistry, RpcConnector};

// Core domain types
pub use oak_types::{
	// External dependencies for convenience
	codec,
	serde_json,
	AccountId,
	AccountKind,
	// Error types
	AdapterError,
	AdapterResult,
	AssetPayment,
	Call,
	CallIndex,
	CallIndices,
	// Primary domain entities
	Chain,
	ChainAdapter,
	ChainConnector,
	ChainAsset,
	ChainError,
	ChainEvent,
	ChainFamily,
	DerivationConfig,
	ExtrinsicSigner,
	InstructionSequence,
	Junction,
	Location,
	Schedule,
	SubmissionReceipt,
	SubmissionStatus,
	TaskRegister,
	TransactInfo,
	UnresolvedAssetReason,
	Weight,
	XcmWeight,
};

// Service layer
pub use oak_service::{
	ScheduledTask, SchedulingError, SchedulingResult, SchedulingStage, Sdk, TaskRequest,
};

// Adapters
pub use oak_adapters::{
	AdapterFactory, AstarAdapter, MangataAdapter, MoonbeamAdapter, OakAdapter, RpcChainApi,
};

// Config
pub use oak_config::{
	load_config, log_chain_info, log_service_info, log_service_shutdown, log_startup_complete,
	ConfigValidationError, LogFormat, LoggingSettings, Settings,
};

pub mod types {
	pub use oak_types::*;
}

pub mod adapters {
	pub use oak_adapters::*;
}

pub mod service {
	pub use oak_service::*;
}

pub mod config {
	pub use oak_config::*;
}

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while assembling an [`OakSdk`]
#[derive(Debug, Error)]
pub enum BuildError {
	#[error("Invalid configuration: {0}")]
	Config(#[from] ConfigValidationError),

	#[error("Adapter setup failed: {0}")]
	Adapter(#[from] AdapterError),

	#[error("No oak chain is configured to schedule tasks on")]
	MissingOrigin,
}

/// Builder pattern for configuring the SDK
#[derive(Debug, Default)]
pub struct SdkBuilder {
	settings: Option<Settings>,
	connector: Option<Arc<dyn ChainConnector>>,
	chains: Vec<Chain>,
	origin: Option<String>,
}

impl SdkBuilder {
	/// Create a new builder with no chains configured
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a builder from configuration
	pub fn from_config(settings: Settings) -> Self {
		Self::new().with_settings(settings)
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Open chain connections through `connector` instead of JSON-RPC
	pub fn with_connector(mut self, connector: Arc<dyn ChainConnector>) -> Self {
		self.connector = Some(connector);
		self
	}

	/// Add a chain on top of the configured ones
	pub fn with_chain(mut self, chain: Chain) -> Self {
		self.chains.push(chain);
		self
	}

	/// Schedule on the oak chain registered under `key`
	pub fn with_origin(mut self, key: impl Into<String>) -> Self {
		self.origin = Some(key.into());
		self
	}

	/// Create every adapter and select the origin. No connection is opened.
	pub fn build(self) -> Result<OakSdk, BuildError> {
		let settings = self.settings.unwrap_or_default();

		let mut chains = settings.enabled_chains()?;
		chains.extend(self.chains);

		let connector = self.connector.unwrap_or_else(|| {
			Arc::new(RpcConnector::new().with_request_timeout_ms(settings.sdk.request_timeout_ms))
				as Arc<dyn ChainConnector>
		});
		let registry = AdapterRegistry::from_chains(chains, connector)?;

		let origin_key = match self.origin {
			Some(key) => key,
			None => match settings.origin_key() {
				Ok(key) => key,
				// only chains added through the builder, if any, can be the origin
				Err(ConfigValidationError::MissingOrigin) => registry
					.keys()
					.into_iter()
					.find(|key| registry.origin(key).is_ok())
					.ok_or(BuildError::MissingOrigin)?,
				Err(e) => return Err(e.into()),
			},
		};
		let origin = registry.origin(&origin_key)?;
		info!(
			"Configured {} chain(s), scheduling on {}",
			registry.len(),
			origin_key
		);

		Ok(OakSdk {
			sdk: Sdk::new(origin),
			registry: Arc::new(registry),
			origin_key,
		})
	}

	/// Build, then connect every chain
	pub async fn start(self) -> Result<OakSdk, BuildError> {
		let oak = self.build()?;
		if let Err(e) = oak.registry.initialize_all().await {
			oak.shutdown().await;
			return Err(e.into());
		}
		log_startup_complete(&oak.origin_key, oak.registry.len());
		Ok(oak)
	}
}

/// The scheduling orchestrator together with the adapters of every configured chain
#[derive(Debug, Clone)]
pub struct OakSdk {
	sdk: Sdk,
	registry: Arc<AdapterRegistry>,
	origin_key: String,
}

impl OakSdk {
	pub fn sdk(&self) -> &Sdk {
		&self.sdk
	}

	pub fn registry(&self) -> &AdapterRegistry {
		&self.registry
	}

	pub fn origin_key(&self) -> &str {
		&self.origin_key
	}

	/// Adapter of the chain registered under `key`
	pub fn chain(&self, key: &str) -> AdapterResult<Arc<dyn ChainAdapter>> {
		self.registry.get(key)
	}

	/// Schedule `request` on the chain `destination` with the flow it supports
	pub async fn schedule(
		&self,
		destination: &str,
		request: &TaskRequest,
		signer: &dyn ExtrinsicSigner,
	) -> SchedulingResult<ScheduledTask> {
		let adapter = self
			.registry
			.get(destination)
			.map_err(SchedulingError::at(SchedulingStage::BuildingPayload))?;
		let flow = self.sdk.recommended_flow(adapter.as_ref());
		self.sdk.schedule(flow, adapter.as_ref(), request, signer).await
	}

	/// Disconnect every chain
	pub async fn shutdown(&self) {
		self.registry.destroy_all().await;
	}
}

/// Initialize tracing with configuration-based settings
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing_from_settings(
	logging: &LoggingSettings,
) -> Result<(), Box<dyn std::error::Error>> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

	match logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			} else {
				subscriber.try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			} else {
				subscriber.try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);

			if logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			} else {
				subscriber.try_init().map_err(|e| -> Box<dyn std::error::Error> { e })?;
			}
		},
	}

	info!(
		"Logging configuration applied: level={}, format={:?}, structured={}",
		logging.level, logging.format, logging.structured
	);

	Ok(())
}

/// Connect every configured chain and log its instruction fee in the native asset
///
/// Loads `.env` and `config/config.*`, then disconnects again.
pub async fn run_probe() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();

	let settings = load_config()?;
	init_tracing_from_settings(&settings.logging)?;
	log_service_info();
	settings.validate()?;

	let oak = SdkBuilder::from_config(settings).start().await?;
	for key in oak.registry().keys() {
		let adapter = oak.chain(&key)?;
		let chain = adapter.chain_data();
		log_chain_info(chain);
		match adapter
			.weight_to_fee(&chain.instruction_weight, &chain.default_asset.location)
			.await
		{
			Ok(fee) => info!(
				"  {}: one instruction costs {} {} (base units)",
				key, fee, chain.default_asset.symbol
			),
			Err(e) => warn!("  {}: cannot price an instruction: {}", key, e),
		}
	}

	oak.shutdown().await;
	log_service_shutdown();
	Ok(())
}
