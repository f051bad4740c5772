//! OAK (Turing) adapter
//!
//! The origin side of every scheduled task: hosts the automation-time pallet, derives the
//! accounts remote users act through, and prices foreign assets from the ORML asset
//! registry.

use crate::{base::ChainAdapterCore, transfers};
use async_trait::async_trait;
use codec::{Decode, Encode};
use oak_types::{
	AccountId, AdapterError, AdapterResult, AssetPayment, Call, Chain, ChainAdapter,
	ChainConnector, ChainFamily, DerivationConfig, ExtrinsicSigner, InstructionSequence,
	Location, Schedule, StorageHasher, StorageKey, SubmissionReceipt, UnresolvedAssetReason,
	VersionedLocation, Weight, XcmWeight,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// `additional` field of an OAK asset registry entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct OakCustomMetadata {
	pub fee_per_second: Option<u128>,
	pub conversion_rate: Option<u128>,
}

/// `AssetRegistry.Metadata` entry
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct OakAssetMetadata {
	pub decimals: u32,
	pub name: Vec<u8>,
	pub symbol: Vec<u8>,
	pub existential_deposit: u128,
	pub location: Option<VersionedLocation>,
	pub additional: OakCustomMetadata,
}

/// Task kinds priced by `automationTime_getTimeAutomationFees`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutomationAction {
	Notify,
	NativeTransfer,
	#[serde(rename = "XCMP")]
	Xcmp,
	AutoCompoundDelegatedStake,
	DynamicDispatch,
}

/// Arguments shared by both scheduling calls of the automation-time pallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcmpTaskParams {
	pub schedule: Schedule,
	/// Chain the task executes on
	pub destination: Location,
	/// Asset paying the origin's scheduling fee
	pub schedule_fee_location: Location,
	/// Asset and amount paying the destination's execution fee
	pub execution_fee_location: Location,
	pub execution_fee_amount: u128,
	/// Destination call with its weights
	pub transact: XcmWeight,
}

impl XcmpTaskParams {
	fn execution_fee(&self) -> AssetPayment {
		AssetPayment {
			asset_location: self.execution_fee_location.versioned(),
			amount: self.execution_fee_amount,
		}
	}
}

#[derive(Debug)]
pub struct OakAdapter {
	core: ChainAdapterCore,
	derivation: DerivationConfig,
}

impl OakAdapter {
	pub fn new(chain: Chain, connector: Arc<dyn ChainConnector>) -> AdapterResult<Self> {
		if chain.family != ChainFamily::Oak {
			return Err(AdapterError::configuration(format!(
				"chain {} is a {} chain, not oak",
				chain.key, chain.family
			)));
		}
		chain.validate()?;

		let derivation = chain.derivation.clone().unwrap_or_default();
		Ok(Self {
			core: ChainAdapterCore::new(chain, connector),
			derivation,
		})
	}

	/// Account on this chain controlled by `account` of parachain `para_id`
	pub fn get_derivative_account(&self, account: &AccountId, para_id: u32) -> AccountId {
		let derived = self
			.derivation
			.derive(account, para_id, self.core.chain().account_kind);
		debug!(
			"Derivative of {} from parachain {} on {}: {}",
			account,
			para_id,
			self.core.key(),
			derived
		);
		derived
	}

	/// `AutomationTime.schedule_xcmp_task`
	pub fn schedule_xcmp_task_call(
		&self,
		params: &XcmpTaskParams,
		instruction_sequence: InstructionSequence,
	) -> Call {
		Call::new("AutomationTime", "schedule_xcmp_task")
			.arg(&params.schedule)
			.arg(&params.destination.versioned())
			.arg(&params.schedule_fee_location.versioned())
			.arg(&params.execution_fee())
			.arg(&params.transact.encoded_call)
			.arg(&params.transact.encoded_call_weight)
			.arg(&params.transact.overall_weight)
			.arg(&instruction_sequence)
	}

	/// `AutomationTime.schedule_xcmp_task_through_proxy`, run as `schedule_as`
	pub fn schedule_xcmp_task_through_proxy_call(
		&self,
		params: &XcmpTaskParams,
		schedule_as: &AccountId,
	) -> Call {
		Call::new("AutomationTime", "schedule_xcmp_task_through_proxy")
			.arg(&params.schedule)
			.arg(&params.destination.versioned())
			.arg(&params.schedule_fee_location.versioned())
			.arg(&params.execution_fee())
			.arg(&params.transact.encoded_call)
			.arg(&params.transact.encoded_call_weight)
			.arg(&params.transact.overall_weight)
			.arg(schedule_as)
	}

	/// `AutomationTime.cancel_task`
	pub async fn cancel_task(
		&self,
		task_id: &str,
		signer: &dyn ExtrinsicSigner,
	) -> AdapterResult<SubmissionReceipt> {
		let call = Call::new("AutomationTime", "cancel_task").arg(&task_id.as_bytes().to_vec());
		let receipt = self.core.sign_and_submit(&call, signer).await?;
		info!("Cancelled task {} on {}", task_id, self.core.key());
		Ok(receipt)
	}

	/// Scheduling fee of `executions` runs of an `action` task, in the native currency
	pub async fn time_automation_fees(
		&self,
		action: AutomationAction,
		executions: u32,
	) -> AdapterResult<u128> {
		let api = self.core.api().await?;
		let result = api
			.rpc(
				"automationTime_getTimeAutomationFees",
				json!([action, executions]),
			)
			.await?;

		let fee = match &result {
			Value::Number(number) => number.as_u64().map(u128::from),
			Value::String(text) if text.starts_with("0x") => {
				u128::from_str_radix(text.trim_start_matches("0x"), 16).ok()
			},
			Value::String(text) => text.parse().ok(),
			_ => None,
		}
		.ok_or_else(|| {
			AdapterError::Decode(format!("automation fee is not an amount: {}", result))
		})?;

		debug!(
			"Automation fee for {} {:?} executions on {}: {}",
			executions,
			action,
			self.core.key(),
			fee
		);
		Ok(fee)
	}
}

#[async_trait]
impl ChainAdapter for OakAdapter {
	fn chain_data(&self) -> &Chain {
		self.core.chain()
	}

	async fn initialize(&self) -> AdapterResult<()> {
		self.core.initialize().await
	}

	async fn destroy(&self) -> AdapterResult<()> {
		self.core.destroy().await
	}

	async fn is_ready(&self) -> bool {
		self.core.is_ready().await
	}

	async fn encode_call(&self, call: &Call) -> AdapterResult<Vec<u8>> {
		self.core.encode_call(call).await
	}

	async fn get_xcm_weight(
		&self,
		payload: &Call,
		sender: &AccountId,
		instruction_count: u64,
	) -> AdapterResult<XcmWeight> {
		self.core
			.get_xcm_weight(payload, sender, instruction_count)
			.await
	}

	async fn weight_to_fee(
		&self,
		weight: &Weight,
		asset_location: &Location,
	) -> AdapterResult<u128> {
		if self.core.chain().is_native_location(asset_location) {
			return self.core.native_fee(weight).await;
		}

		let location = asset_location.relative_to(self.core.para_id()?);
		let asset_id: u32 = self
			.core
			.read_storage(
				&StorageKey::map(
					"AssetRegistry",
					"LocationToAssetId",
					StorageHasher::Twox64Concat,
					&location,
				),
				"LocationToAssetId",
			)
			.await?
			.ok_or_else(|| {
				self.core
					.unresolved(asset_location, UnresolvedAssetReason::AssetNotRegistered)
			})?;

		let metadata: Option<OakAssetMetadata> = self
			.core
			.read_storage(
				&StorageKey::map(
					"AssetRegistry",
					"Metadata",
					StorageHasher::Twox64Concat,
					&asset_id,
				),
				"AssetMetadata",
			)
			.await?;
		let fee_per_second = metadata
			.and_then(|metadata| metadata.additional.fee_per_second)
			.ok_or_else(|| {
				self.core
					.unresolved(asset_location, UnresolvedAssetReason::MetadataNotInitialized)
			})?;

		self.core.fee_from_rate(weight, fee_per_second)
	}

	async fn cross_chain_transfer(
		&self,
		destination: &Location,
		beneficiary: &AccountId,
		asset_location: &Location,
		amount: u128,
		signer: &dyn ExtrinsicSigner,
	) -> AdapterResult<SubmissionReceipt> {
		let asset = asset_location.relative_to(self.core.para_id()?);
		let call = transfers::xtokens_transfer_multiasset(destination, beneficiary, &asset, amount)?;
		self.core.sign_and_submit(&call, signer).await
	}

	async fn sign_and_submit(
		&self,
		call: &Call,
		signer: &dyn ExtrinsicSigner,
	) -> AdapterResult<SubmissionReceipt> {
		self.core.sign_and_submit(call, signer).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_chains;
	use oak_types::test_utils::{MockChainApi, MockConnector, MockSigner, RecordedCall};
	use oak_types::{Junction, WEIGHT_REF_TIME_PER_SECOND};

	fn moonbase_dev() -> Location {
		Location::new(1, vec![Junction::Parachain(1000), Junction::PalletInstance(3)]).unwrap()
	}

	async fn adapter_with(api: MockChainApi) -> (OakAdapter, Arc<MockChainApi>) {
		let connector = MockConnector::new(Arc::new(api));
		let api = connector.api();
		let adapter = OakAdapter::new(test_chains::turing(), Arc::new(connector)).unwrap();
		adapter.initialize().await.unwrap();
		(adapter, api)
	}

	fn registry_key(location: &Location) -> StorageKey {
		StorageKey::map(
			"AssetRegistry",
			"LocationToAssetId",
			StorageHasher::Twox64Concat,
			location,
		)
	}

	fn metadata_key(asset_id: u32) -> StorageKey {
		StorageKey::map("AssetRegistry", "Metadata", StorageHasher::Twox64Concat, &asset_id)
	}

	fn metadata(fee_per_second: Option<u128>) -> OakAssetMetadata {
		OakAssetMetadata {
			decimals: 18,
			name: b"Moonbase Dev".to_vec(),
			symbol: b"DEV".to_vec(),
			existential_deposit: 1,
			location: None,
			additional: OakCustomMetadata {
				fee_per_second,
				conversion_rate: None,
			},
		}
	}

	#[test]
	fn test_rejects_non_oak_chain() {
		let result = OakAdapter::new(
			test_chains::moonbase(),
			Arc::new(MockConnector::unreachable()),
		);
		assert!(matches!(result, Err(AdapterError::Configuration { .. })));
	}

	#[tokio::test]
	async fn test_native_fee_uses_runtime_api_only() {
		let (adapter, api) = adapter_with(MockChainApi::new().with_fee_per_ref_time(2)).await;
		let weight = Weight::from_parts(1_000, 10);

		let fee = adapter
			.weight_to_fee(&weight, &Location::sibling_parachain(2114))
			.await
			.unwrap();
		let fee_here = adapter.weight_to_fee(&weight, &Location::here()).await.unwrap();

		assert_eq!(fee, 2_000);
		assert_eq!(fee_here, 2_000);
		assert_eq!(api.storage_reads(), 0);
		assert_eq!(
			api.calls(),
			vec![
				RecordedCall::QueryWeightToFee(weight),
				RecordedCall::QueryWeightToFee(weight)
			]
		);
	}

	#[tokio::test]
	async fn test_unregistered_asset_stops_after_one_lookup() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;
		let foreign = Location::sibling_parachain(1000);

		let error = adapter
			.weight_to_fee(&Weight::from_parts(1, 1), &foreign)
			.await
			.unwrap_err();

		assert_eq!(
			error.unresolved_reason(),
			Some(UnresolvedAssetReason::AssetNotRegistered)
		);
		assert_eq!(api.calls(), vec![RecordedCall::Storage(registry_key(&foreign))]);
	}

	#[tokio::test]
	async fn test_missing_fee_per_second() {
		let foreign = Location::sibling_parachain(1000);
		let api = MockChainApi::new()
			.with_storage(registry_key(&foreign), 4u32)
			.with_storage(metadata_key(4), metadata(None));
		let (adapter, _) = adapter_with(api).await;

		let error = adapter
			.weight_to_fee(&Weight::from_parts(1, 1), &foreign)
			.await
			.unwrap_err();
		assert_eq!(
			error.unresolved_reason(),
			Some(UnresolvedAssetReason::MetadataNotInitialized)
		);
	}

	#[tokio::test]
	async fn test_foreign_fee_from_fee_per_second() {
		let foreign = Location::sibling_parachain(1000);
		let api = MockChainApi::new()
			.with_storage(registry_key(&foreign), 4u32)
			.with_storage(metadata_key(4), metadata(Some(10_000_000_000_000_000)));
		let (adapter, api) = adapter_with(api).await;

		let half_second = Weight::from_parts(WEIGHT_REF_TIME_PER_SECOND / 2, 0);
		let fee = adapter.weight_to_fee(&half_second, &foreign).await.unwrap();
		let larger = adapter
			.weight_to_fee(&Weight::from_parts(WEIGHT_REF_TIME_PER_SECOND, 0), &foreign)
			.await
			.unwrap();

		assert_eq!(fee, 5_000_000_000_000_000);
		assert!(fee <= larger);
		assert_eq!(api.storage_reads(), 4);
		assert!(!api
			.calls()
			.iter()
			.any(|call| matches!(call, RecordedCall::QueryWeightToFee(_))));
	}

	#[tokio::test]
	async fn test_derivative_account_uses_configured_scheme() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;
		let alith = AccountId::Key20([0xf2; 20]);

		let derived = adapter.get_derivative_account(&alith, 1000);
		assert_eq!(derived, adapter.get_derivative_account(&alith, 1000));
		assert_ne!(derived, adapter.get_derivative_account(&alith, 1001));
		assert_eq!(
			derived,
			DerivationConfig::default().derive(&alith, 1000, oak_types::AccountKind::Id32)
		);
		assert_eq!(api.call_count(), 0);
	}

	#[tokio::test]
	async fn test_schedule_call_argument_layout() {
		let (adapter, _) = adapter_with(MockChainApi::new()).await;
		let params = XcmpTaskParams {
			schedule: Schedule::fixed(vec![3600]),
			destination: Location::sibling_parachain(1000),
			schedule_fee_location: Location::sibling_parachain(2114),
			execution_fee_location: moonbase_dev(),
			execution_fee_amount: 42,
			transact: XcmWeight {
				encoded_call: vec![1, 2, 3],
				encoded_call_weight: Weight::from_parts(10, 1),
				overall_weight: Weight::from_parts(20, 2),
			},
		};

		let call =
			adapter.schedule_xcmp_task_call(&params, InstructionSequence::PayThroughSovereignAccount);
		assert!(call.is("AutomationTime", "schedule_xcmp_task"));
		assert_eq!(*call.args.last().unwrap(), 0);

		let schedule_as = AccountId::Id32([5u8; 32]);
		let proxy = adapter.schedule_xcmp_task_through_proxy_call(&params, &schedule_as);
		assert!(proxy.is("AutomationTime", "schedule_xcmp_task_through_proxy"));
		assert!(proxy.args.ends_with(&[5u8; 32]));
		assert_eq!(proxy.args.len(), call.args.len() - 1 + 32);
	}

	#[tokio::test]
	async fn test_time_automation_fees() {
		let api = MockChainApi::new().with_rpc_response(
			"automationTime_getTimeAutomationFees",
			json!(1_325_000_000u64),
		);
		let (adapter, api) = adapter_with(api).await;

		let fee = adapter
			.time_automation_fees(AutomationAction::Xcmp, 2)
			.await
			.unwrap();

		assert_eq!(fee, 1_325_000_000);
		assert_eq!(
			api.calls(),
			vec![RecordedCall::Rpc {
				method: "automationTime_getTimeAutomationFees".to_string(),
				params: json!(["XCMP", 2]),
			}]
		);
	}

	#[tokio::test]
	async fn test_cancel_task_submits_task_id() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;
		let signer = MockSigner::id32(1);

		adapter.cancel_task("1000-0-1", &signer).await.unwrap();

		let (call, submitter) = &api.submissions()[0];
		assert_eq!(submitter, &signer.account());
		assert_eq!(
			MockChainApi::call_name(call).as_deref(),
			Some("AutomationTime.cancel_task")
		);
		assert_eq!(
			MockChainApi::call_args(call).unwrap(),
			b"1000-0-1".to_vec().encode()
		);
	}

	#[tokio::test]
	async fn test_cross_chain_transfer_reanchors_native_asset() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;
		let signer = MockSigner::id32(1);
		let beneficiary = AccountId::Key20([7u8; 20]);

		adapter
			.cross_chain_transfer(
				&Location::sibling_parachain(1000),
				&beneficiary,
				&Location::sibling_parachain(2114),
				1_000,
				&signer,
			)
			.await
			.unwrap();

		let expected = transfers::xtokens_transfer_multiasset(
			&Location::sibling_parachain(1000),
			&beneficiary,
			&Location::here(),
			1_000,
		)
		.unwrap();
		let (call, _) = &api.submissions()[0];
		assert_eq!(MockChainApi::call_args(call).unwrap(), expected.args);
	}
}
