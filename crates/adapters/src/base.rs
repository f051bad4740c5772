//! Shared state and behaviour of all chain adapters
//!
//! Every adapter wraps a [`ChainAdapterCore`] holding the chain configuration, the
//! connector, the live connection and the per-signer submission locks.

use codec::Decode;
use dashmap::DashMap;
use oak_types::{
	AccountId, AdapterError, AdapterResult, Call, Chain, ChainApi, ChainConnector,
	ExtrinsicSigner, Location, StorageKey, SubmissionReceipt, UnresolvedAssetReason, Weight,
	XcmWeight, WEIGHT_REF_TIME_PER_SECOND,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct ChainAdapterCore {
	chain: Chain,
	connector: Arc<dyn ChainConnector>,
	api: RwLock<Option<Arc<dyn ChainApi>>>,
	submission_locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl ChainAdapterCore {
	pub fn new(chain: Chain, connector: Arc<dyn ChainConnector>) -> Self {
		Self {
			chain,
			connector,
			api: RwLock::new(None),
			submission_locks: DashMap::new(),
		}
	}

	pub fn chain(&self) -> &Chain {
		&self.chain
	}

	pub fn key(&self) -> &str {
		&self.chain.key
	}

	pub fn para_id(&self) -> AdapterResult<u32> {
		self.chain.para_id.ok_or_else(|| {
			AdapterError::configuration(format!("chain {} has no para id", self.chain.key))
		})
	}

	pub async fn initialize(&self) -> AdapterResult<()> {
		let mut api = self.api.write().await;
		if api.is_some() {
			return Err(AdapterError::AlreadyInitialized {
				chain: self.chain.key.clone(),
			});
		}

		debug!("Connecting {} to {}", self.chain.key, self.chain.endpoint);
		let connection = self.connector.connect(&self.chain).await?;
		*api = Some(connection);
		info!("Adapter {} ({}) ready", self.chain.key, self.chain.family);
		Ok(())
	}

	pub async fn destroy(&self) -> AdapterResult<()> {
		let connection = self.api.write().await.take().ok_or_else(|| {
			AdapterError::NotInitialized {
				chain: self.chain.key.clone(),
			}
		})?;
		connection.disconnect().await?;
		info!("Adapter {} disconnected", self.chain.key);
		Ok(())
	}

	pub async fn is_ready(&self) -> bool {
		self.api.read().await.is_some()
	}

	/// The live connection, or `NotInitialized`
	pub async fn api(&self) -> AdapterResult<Arc<dyn ChainApi>> {
		self.api
			.read()
			.await
			.clone()
			.ok_or_else(|| AdapterError::NotInitialized {
				chain: self.chain.key.clone(),
			})
	}

	pub async fn encode_call(&self, call: &Call) -> AdapterResult<Vec<u8>> {
		Ok(self.api().await?.encode_call(call)?)
	}

	/// `encoded_call_weight` from the dry run plus `instruction_count` instruction weights
	pub async fn get_xcm_weight(
		&self,
		payload: &Call,
		sender: &AccountId,
		instruction_count: u64,
	) -> AdapterResult<XcmWeight> {
		let api = self.api().await?;
		let encoded_call = api.encode_call(payload)?;
		let info = api.payment_info(&encoded_call, sender).await?;

		let overall_weight = self
			.chain
			.instruction_weight
			.checked_mul(instruction_count)
			.and_then(|overhead| info.weight.checked_add(&overhead))
			.ok_or_else(|| AdapterError::WeightOverflow {
				chain: self.chain.key.clone(),
			})?;

		debug!(
			"{} on {}: call weight {}, overall weight {} ({} instructions)",
			payload, self.chain.key, info.weight, overall_weight, instruction_count
		);
		Ok(XcmWeight {
			encoded_call,
			encoded_call_weight: info.weight,
			overall_weight,
		})
	}

	/// Fee in the native currency, from the transaction-payment runtime API only
	pub async fn native_fee(&self, weight: &Weight) -> AdapterResult<u128> {
		let fee = self.api().await?.query_weight_to_fee(weight).await?;
		debug!("Native fee for {} on {}: {}", weight, self.chain.key, fee);
		Ok(fee)
	}

	/// `ref_time * fee_per_second / WEIGHT_REF_TIME_PER_SECOND`, rounded down
	pub fn fee_from_rate(&self, weight: &Weight, fee_per_second: u128) -> AdapterResult<u128> {
		u128::from(weight.ref_time)
			.checked_mul(fee_per_second)
			.map(|scaled| scaled / u128::from(WEIGHT_REF_TIME_PER_SECOND))
			.ok_or_else(|| AdapterError::FeeOverflow {
				chain: self.chain.key.clone(),
			})
	}

	/// Read and decode a storage entry
	pub async fn read_storage<T: Decode>(
		&self,
		key: &StorageKey,
		what: &str,
	) -> AdapterResult<Option<T>> {
		let raw = self.api().await?.storage(key).await?;
		raw.map(|bytes| {
			T::decode(&mut &bytes[..])
				.map_err(|e| AdapterError::Decode(format!("{} on {}: {}", what, self.chain.key, e)))
		})
		.transpose()
	}

	pub fn unresolved(&self, location: &Location, reason: UnresolvedAssetReason) -> AdapterError {
		warn!(
			"Cannot price asset {} on {}: {}",
			location, self.chain.key, reason
		);
		AdapterError::UnresolvedAsset {
			chain: self.chain.key.clone(),
			location: location.to_string(),
			reason,
		}
	}

	/// Sign and submit `call`, one submission at a time per signer
	pub async fn sign_and_submit(
		&self,
		call: &Call,
		signer: &dyn ExtrinsicSigner,
	) -> AdapterResult<SubmissionReceipt> {
		let api = self.api().await?;
		let encoded = api.encode_call(call)?;
		let account = signer.account();

		let lock = self
			.submission_locks
			.entry(account)
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone();
		let submitted = {
			let _guard = lock.lock().await;
			info!("Submitting {} on {} as {}", call, self.chain.key, account);
			api.sign_and_submit(&encoded, signer).await
		};
		drop(lock);
		// the map holds the last reference once no other submission waits on this signer
		self.submission_locks
			.remove_if(&account, |_, lock| Arc::strong_count(lock) == 1);
		let receipt = submitted?;

		if let Some((section, name)) = receipt.dispatch_error() {
			warn!(
				"{} rejected on {}: {}.{}",
				call, self.chain.key, section, name
			);
			return Err(AdapterError::ChainRejected {
				chain: self.chain.key.clone(),
				section,
				name,
			});
		}

		info!(
			"{} submitted on {}: {}",
			call, self.chain.key, receipt.extrinsic_hash
		);
		Ok(receipt)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_chains;
	use oak_types::test_utils::{MockChainApi, MockConnector, MockSigner, RecordedCall};
	use oak_types::ChainError;

	fn core_with(api: MockChainApi) -> (ChainAdapterCore, Arc<MockChainApi>) {
		let connector = MockConnector::new(Arc::new(api));
		let api = connector.api();
		(
			ChainAdapterCore::new(test_chains::moonbase(), Arc::new(connector)),
			api,
		)
	}

	#[tokio::test]
	async fn test_lifecycle() {
		let (core, api) = core_with(MockChainApi::new());

		assert!(matches!(
			core.api().await,
			Err(AdapterError::NotInitialized { .. })
		));
		core.initialize().await.unwrap();
		assert!(core.is_ready().await);
		assert!(matches!(
			core.initialize().await,
			Err(AdapterError::AlreadyInitialized { .. })
		));

		core.destroy().await.unwrap();
		assert!(api.is_closed());
		assert!(matches!(
			core.native_fee(&Weight::from_parts(1, 1)).await,
			Err(AdapterError::NotInitialized { .. })
		));
		assert!(matches!(
			core.destroy().await,
			Err(AdapterError::NotInitialized { .. })
		));
	}

	#[tokio::test]
	async fn test_unreachable_endpoint() {
		let core = ChainAdapterCore::new(
			test_chains::moonbase(),
			Arc::new(MockConnector::unreachable()),
		);
		assert!(matches!(
			core.initialize().await,
			Err(AdapterError::Connection(_))
		));
		assert!(!core.is_ready().await);
	}

	#[tokio::test]
	async fn test_xcm_weight_composition() {
		let (core, api) =
			core_with(MockChainApi::new().with_call_weight(Weight::from_parts(1_000_000_000, 10_000)));
		core.initialize().await.unwrap();

		let sender = AccountId::Key20([1u8; 20]);
		let weight = core
			.get_xcm_weight(&Call::new("System", "remark_with_event"), &sender, 6)
			.await
			.unwrap();

		// moonbase instruction weight is 200_000_000 / 2_000
		assert_eq!(weight.encoded_call_weight, Weight::from_parts(1_000_000_000, 10_000));
		assert_eq!(weight.overall_weight, Weight::from_parts(2_200_000_000, 22_000));
		assert!(matches!(
			api.calls()[0],
			RecordedCall::PaymentInfo { sender: s, .. } if s == sender
		));
	}

	#[tokio::test]
	async fn test_weight_overflow() {
		let (core, _) =
			core_with(MockChainApi::new().with_call_weight(Weight::from_parts(u64::MAX, 0)));
		core.initialize().await.unwrap();

		let result = core
			.get_xcm_weight(&Call::new("System", "remark"), &AccountId::Key20([1u8; 20]), 1)
			.await;
		assert!(matches!(result, Err(AdapterError::WeightOverflow { .. })));
	}

	#[test]
	fn test_fee_from_rate() {
		let (core, _) = core_with(MockChainApi::new());

		// 1 second of execution at 416_000_000_000 per second
		let fee = core
			.fee_from_rate(&Weight::from_parts(1_000_000_000_000, 0), 416_000_000_000)
			.unwrap();
		assert_eq!(fee, 416_000_000_000);

		// rounds down
		assert_eq!(
			core.fee_from_rate(&Weight::from_parts(1, 0), 999_999_999_999).unwrap(),
			0
		);
		assert!(matches!(
			core.fee_from_rate(&Weight::from_parts(u64::MAX, 0), u128::MAX),
			Err(AdapterError::FeeOverflow { .. })
		));
	}

	#[tokio::test]
	async fn test_rejected_submission() {
		let (core, _) =
			core_with(MockChainApi::new().with_dispatch_error("xTokens", "NotCrossReserveAsset"));
		core.initialize().await.unwrap();

		let result = core
			.sign_and_submit(&Call::new("System", "remark"), &MockSigner::key20(1))
			.await;
		match result {
			Err(AdapterError::ChainRejected { section, name, .. }) => {
				assert_eq!(section, "xTokens");
				assert_eq!(name, "NotCrossReserveAsset");
			},
			other => panic!("unexpected result {:?}", other),
		}
		assert!(core.submission_locks.is_empty());
	}

	#[tokio::test]
	async fn test_submissions_are_serialized_per_signer() {
		let (core, api) = core_with(MockChainApi::new());
		core.initialize().await.unwrap();
		let core = Arc::new(core);

		let mut handles = vec![];
		for i in 0..4u8 {
			let core = core.clone();
			handles.push(tokio::spawn(async move {
				let signer = MockSigner::key20(i % 2);
				core.sign_and_submit(&Call::new("System", "remark"), &signer)
					.await
					.map(|receipt| receipt.extrinsic_hash)
			}));
		}

		let mut hashes = vec![];
		for handle in handles {
			hashes.push(handle.await.unwrap().unwrap());
		}
		hashes.sort();
		hashes.dedup();
		assert_eq!(hashes.len(), 4);
		assert_eq!(api.submissions().len(), 4);
		// every signer's lock is released once its last submission is done
		assert!(core.submission_locks.is_empty());
	}

	#[tokio::test]
	async fn test_failed_submissions_release_signer_lock() {
		let (core, api) = core_with(
			MockChainApi::new().with_transport_error(ChainError::Transport("reset".to_string())),
		);
		core.initialize().await.unwrap();

		for byte in 0..3u8 {
			let result = core
				.sign_and_submit(&Call::new("System", "remark"), &MockSigner::key20(byte))
				.await;
			assert!(matches!(result, Err(AdapterError::Rpc(ChainError::Transport(_)))));
		}
		assert_eq!(api.call_count(), 3);
		assert!(core.submission_locks.is_empty());
	}
}
