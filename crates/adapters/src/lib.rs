//! OAK Adapters
//!
//! Chain-family adapters (OAK, Moonbeam, Astar, Mangata) and the JSON-RPC chain client.

pub mod astar_adapter;
pub mod base;
pub mod client_cache;
pub mod mangata_adapter;
pub mod moonbeam_adapter;
pub mod oak_adapter;
pub mod rpc_client;
pub mod transfers;

pub use astar_adapter::AstarAdapter;
pub use mangata_adapter::MangataAdapter;
pub use moonbeam_adapter::MoonbeamAdapter;
pub use oak_adapter::{AutomationAction, OakAdapter, XcmpTaskParams};
pub use oak_types::{AdapterError, AdapterResult, ChainAdapter, TaskRegister};
pub use rpc_client::{RpcChainApi, RpcConnector};

use oak_types::{Chain, ChainConnector, ChainFamily};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Factory for creating chain adapters
pub struct AdapterFactory;

impl AdapterFactory {
	/// Create the adapter matching the chain's family
	pub fn create(
		chain: Chain,
		connector: Arc<dyn ChainConnector>,
	) -> AdapterResult<Arc<dyn ChainAdapter>> {
		let adapter: Arc<dyn ChainAdapter> = match chain.family {
			ChainFamily::Oak => Arc::new(OakAdapter::new(chain, connector)?),
			ChainFamily::Moonbeam => Arc::new(MoonbeamAdapter::new(chain, connector)?),
			ChainFamily::Astar => Arc::new(AstarAdapter::new(chain, connector)?),
			ChainFamily::Mangata => Arc::new(MangataAdapter::new(chain, connector)?),
		};
		Ok(adapter)
	}

	pub fn create_oak(
		chain: Chain,
		connector: Arc<dyn ChainConnector>,
	) -> AdapterResult<Arc<OakAdapter>> {
		Ok(Arc::new(OakAdapter::new(chain, connector)?))
	}
}

/// Adapters of every configured chain, keyed by chain key
///
/// OAK chains are also kept with their concrete type since only they can act as the
/// origin of a scheduled task.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
	adapters: HashMap<String, Arc<dyn ChainAdapter>>,
	origins: HashMap<String, Arc<OakAdapter>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build one adapter per chain, all sharing `connector`
	pub fn from_chains(
		chains: impl IntoIterator<Item = Chain>,
		connector: Arc<dyn ChainConnector>,
	) -> AdapterResult<Self> {
		let mut registry = Self::new();
		for chain in chains {
			registry.register(chain, connector.clone())?;
		}
		Ok(registry)
	}

	/// Create and register the adapter for `chain`
	pub fn register(
		&mut self,
		chain: Chain,
		connector: Arc<dyn ChainConnector>,
	) -> AdapterResult<()> {
		if self.adapters.contains_key(&chain.key) {
			return Err(AdapterError::configuration(format!(
				"chain {} is configured twice",
				chain.key
			)));
		}

		let key = chain.key.clone();
		if chain.family == ChainFamily::Oak {
			let origin = AdapterFactory::create_oak(chain, connector)?;
			self.origins.insert(key.clone(), origin.clone());
			self.adapters.insert(key, origin);
		} else {
			self.adapters
				.insert(key, AdapterFactory::create(chain, connector)?);
		}
		Ok(())
	}

	pub fn get(&self, key: &str) -> AdapterResult<Arc<dyn ChainAdapter>> {
		self.adapters.get(key).cloned().ok_or_else(|| {
			AdapterError::configuration(format!("no chain configured with key {}", key))
		})
	}

	/// The OAK adapter registered under `key`
	pub fn origin(&self, key: &str) -> AdapterResult<Arc<OakAdapter>> {
		self.origins.get(key).cloned().ok_or_else(|| {
			AdapterError::configuration(format!("no oak chain configured with key {}", key))
		})
	}

	pub fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.adapters.keys().cloned().collect();
		keys.sort();
		keys
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}

	/// Initialize every adapter, stopping at the first failure
	pub async fn initialize_all(&self) -> AdapterResult<()> {
		for key in self.keys() {
			self.get(&key)?.initialize().await?;
		}
		info!("Initialized {} chain adapters", self.adapters.len());
		Ok(())
	}

	/// Destroy every ready adapter. Failures are logged, not returned.
	pub async fn destroy_all(&self) {
		for (key, adapter) in &self.adapters {
			if !adapter.is_ready().await {
				continue;
			}
			if let Err(e) = adapter.destroy().await {
				warn!("Failed to disconnect {}: {}", key, e);
			}
		}
	}
}

#[cfg(test)]
pub(crate) use oak_types::test_utils::chains as test_chains;

#[cfg(test)]
mod tests {
	use super::*;
	use oak_types::test_utils::{MockChainApi, MockConnector, MockSigner};
	use oak_types::{ExtrinsicSigner, Location};

	fn connector() -> Arc<MockConnector> {
		Arc::new(MockConnector::new(Arc::new(MockChainApi::new())))
	}

	#[test]
	fn test_factory_dispatches_on_family() {
		let connector = connector();
		for chain in [
			test_chains::turing(),
			test_chains::moonbase(),
			test_chains::shibuya(),
			test_chains::mangata(),
		] {
			let family = chain.family;
			let adapter = AdapterFactory::create(chain, connector.clone()).unwrap();
			assert_eq!(adapter.family(), family);
			assert_eq!(
				adapter.as_task_register().is_some(),
				matches!(family, ChainFamily::Moonbeam | ChainFamily::Astar)
			);
		}
	}

	#[tokio::test]
	async fn test_registry_lookup_and_lifecycle() {
		let connector = connector();
		let registry = AdapterRegistry::from_chains(
			vec![test_chains::turing(), test_chains::moonbase()],
			connector.clone(),
		)
		.unwrap();

		assert_eq!(registry.keys(), vec!["moonbase-local", "turing-local"]);
		assert!(registry.origin("turing-local").is_ok());
		assert!(matches!(
			registry.origin("moonbase-local"),
			Err(AdapterError::Configuration { .. })
		));
		assert!(registry.get("unknown").is_err());

		registry.initialize_all().await.unwrap();
		assert_eq!(connector.connect_count(), 2);
		assert!(registry.get("moonbase-local").unwrap().is_ready().await);
		// origin and generic handle share one adapter
		assert!(registry.origin("turing-local").unwrap().is_ready().await);

		registry.destroy_all().await;
		assert!(!registry.get("turing-local").unwrap().is_ready().await);
	}

	#[tokio::test]
	async fn test_transfer_requires_ready_adapter() {
		let adapter = AdapterFactory::create(test_chains::mangata(), connector()).unwrap();
		let signer = MockSigner::id32(1);
		let beneficiary = signer.account();
		let turing = Location::sibling_parachain(2114);
		let mgx = adapter.chain_data().default_asset.location.clone();

		let before = adapter
			.cross_chain_transfer(&turing, &beneficiary, &mgx, 1, &signer)
			.await;
		assert!(matches!(before, Err(AdapterError::NotInitialized { .. })));

		adapter.initialize().await.unwrap();
		adapter
			.cross_chain_transfer(&turing, &beneficiary, &mgx, 1, &signer)
			.await
			.unwrap();
		adapter.destroy().await.unwrap();

		let after = adapter
			.cross_chain_transfer(&turing, &beneficiary, &mgx, 1, &signer)
			.await;
		assert!(matches!(after, Err(AdapterError::NotInitialized { .. })));
	}

	#[test]
	fn test_duplicate_chain_key() {
		let mut registry = AdapterRegistry::new();
		registry.register(test_chains::turing(), connector()).unwrap();
		assert!(registry.register(test_chains::turing(), connector()).is_err());
	}
}
