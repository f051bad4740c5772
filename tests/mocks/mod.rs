//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use oak_sdk::types::test_utils::{chains, MockChainApi};
use oak_sdk::types::{ChainApi, ChainResult};
use oak_sdk::{Chain, ChainConnector, ChainError, ChainEvent, Location, Schedule, TaskRequest};
use oak_sdk::serde_json::json;

/// Connector giving every chain its own [`MockChainApi`], looked up by chain key
#[derive(Debug, Default)]
pub struct RoutingConnector {
	apis: HashMap<String, Arc<MockChainApi>>,
	connects: AtomicUsize,
}

impl RoutingConnector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_chain(mut self, key: &str, api: MockChainApi) -> Self {
		self.apis.insert(key.to_string(), Arc::new(api));
		self
	}

	pub fn api(&self, key: &str) -> Arc<MockChainApi> {
		self.apis[key].clone()
	}

	pub fn connect_count(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ChainConnector for RoutingConnector {
	async fn connect(&self, chain: &Chain) -> ChainResult<Arc<dyn ChainApi>> {
		self.connects.fetch_add(1, Ordering::SeqCst);
		match self.apis.get(&chain.key) {
			Some(api) => Ok(api.clone() as Arc<dyn ChainApi>),
			None => Err(ChainError::Connection {
				endpoint: chain.endpoint.clone(),
				reason: "no node for this chain".to_string(),
			}),
		}
	}
}

/// Turing plus the three destination families, each with its own node
pub fn local_network(turing: MockChainApi) -> Arc<RoutingConnector> {
	Arc::new(
		RoutingConnector::new()
			.with_chain("turing-local", turing)
			.with_chain("moonbase-local", MockChainApi::new())
			.with_chain("shibuya", MockChainApi::new())
			.with_chain("mangata-local", MockChainApi::new()),
	)
}

pub fn local_chains() -> Vec<Chain> {
	vec![
		chains::turing(),
		chains::moonbase(),
		chains::shibuya(),
		chains::mangata(),
	]
}

/// `System.remark_with_event` at one fixed time, fees in TUR and the destination's
/// own currency
pub fn remark_request(destination: &Chain) -> TaskRequest {
	TaskRequest {
		schedule: Schedule::fixed(vec![1_700_000_000]),
		payload: oak_sdk::Call::new("System", "remark_with_event").arg(&b"ping".to_vec()),
		schedule_fee_location: Location::sibling_parachain(2114),
		execution_fee_location: destination.default_asset.location.clone(),
	}
}

pub fn task_scheduled(task_id: &str) -> ChainEvent {
	ChainEvent::new(
		"automationTime",
		"TaskScheduled",
		json!({"who": "0x01", "taskId": task_id}),
	)
}
