//! Moonbeam / Moonbase adapter
//!
//! Foreign assets are priced from `AssetManager`, and tasks are registered on the origin
//! with `XcmTransactor.transact_through_signed`, which dispatches from the signer's
//! derivative account there.

use crate::{base::ChainAdapterCore, transfers};
use async_trait::async_trait;
use codec::{Decode, Encode};
use oak_types::{
	xcm::WeightLimit, AccountId, AdapterError, AdapterResult, Call, Chain, ChainAdapter,
	ChainConnector, ChainFamily, ExtrinsicSigner, Location, RegistryTaskRequest, StorageHasher,
	StorageKey, SubmissionReceipt, TaskRegister, UnresolvedAssetReason, VersionedLocation,
	Weight, XcmWeight,
};
use std::sync::Arc;
use tracing::debug;

/// `AssetManager` key type of a foreign asset
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum AssetType {
	#[codec(index = 0)]
	Xcm(Location),
}

/// How `XcmTransactor` pays for remote execution
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Currency {
	#[codec(index = 1)]
	AsMultiLocation(VersionedLocation),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CurrencyPayment {
	pub currency: Currency,
	pub fee_amount: Option<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct TransactWeights {
	pub transact_required_weight_at_most: Weight,
	pub overall_weight: Option<WeightLimit>,
}

#[derive(Debug)]
pub struct MoonbeamAdapter {
	core: ChainAdapterCore,
}

impl MoonbeamAdapter {
	pub fn new(chain: Chain, connector: Arc<dyn ChainConnector>) -> AdapterResult<Self> {
		if chain.family != ChainFamily::Moonbeam {
			return Err(AdapterError::configuration(format!(
				"chain {} is a {} chain, not moonbeam",
				chain.key, chain.family
			)));
		}
		chain.validate()?;

		Ok(Self {
			core: ChainAdapterCore::new(chain, connector),
		})
	}

	fn asset_type_key(item: &str, asset_type: &AssetType) -> StorageKey {
		StorageKey::map("AssetManager", item, StorageHasher::Blake2_128Concat, asset_type)
	}
}

#[async_trait]
impl ChainAdapter for MoonbeamAdapter {
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

		let asset_type = AssetType::Xcm(asset_location.relative_to(self.core.para_id()?));
		let asset_id: Option<u128> = self
			.core
			.read_storage(
				&Self::asset_type_key("AssetTypeId", &asset_type),
				"AssetTypeId",
			)
			.await?;
		let asset_id = asset_id.ok_or_else(|| {
			self.core
				.unresolved(asset_location, UnresolvedAssetReason::AssetNotRegistered)
		})?;
		debug!("{} is asset {} on {}", asset_location, asset_id, self.core.key());

		let units_per_second: u128 = self
			.core
			.read_storage(
				&Self::asset_type_key("AssetTypeUnitsPerSecond", &asset_type),
				"AssetTypeUnitsPerSecond",
			)
			.await?
			.ok_or_else(|| {
				self.core
					.unresolved(asset_location, UnresolvedAssetReason::MetadataNotInitialized)
			})?;

		self.core.fee_from_rate(weight, units_per_second)
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

	fn as_task_register(&self) -> Option<&dyn TaskRegister> {
		Some(self)
	}
}

impl TaskRegister for MoonbeamAdapter {
	fn create_registry_task_extrinsic(&self, request: &RegistryTaskRequest) -> AdapterResult<Call> {
		let info = &request.transact_info;
		debug!(
			"Building transact_through_signed to {} on {} (fee {}, overall weight {})",
			request.target,
			self.core.key(),
			info.fee,
			info.overall_weight
		);

		Ok(Call::new("XcmTransactor", "transact_through_signed")
			.arg(&request.target.versioned())
			.arg(&CurrencyPayment {
				currency: Currency::AsMultiLocation(request.fee_location.versioned()),
				fee_amount: Some(info.fee),
			})
			.arg(&info.encoded_call)
			.arg(&TransactWeights {
				transact_required_weight_at_most: info.encoded_call_weight,
				overall_weight: Some(WeightLimit::Limited(info.overall_weight)),
			})
			.arg(&true))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_chains;
	use oak_types::test_utils::{MockChainApi, MockConnector, RecordedCall};
	use oak_types::{TransactInfo, WEIGHT_REF_TIME_PER_SECOND};

	async fn adapter_with(api: MockChainApi) -> (MoonbeamAdapter, Arc<MockChainApi>) {
		let connector = MockConnector::new(Arc::new(api));
		let api = connector.api();
		let adapter = MoonbeamAdapter::new(test_chains::moonbase(), Arc::new(connector)).unwrap();
		adapter.initialize().await.unwrap();
		(adapter, api)
	}

	fn tur_type() -> AssetType {
		AssetType::Xcm(Location::sibling_parachain(2114))
	}

	#[tokio::test]
	async fn test_native_fee_skips_asset_manager() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;
		let native = adapter.chain_data().default_asset.location.clone();

		adapter
			.weight_to_fee(&Weight::from_parts(500, 0), &native)
			.await
			.unwrap();
		assert_eq!(api.storage_reads(), 0);
	}

	#[tokio::test]
	async fn test_foreign_fee_from_units_per_second() {
		let api = MockChainApi::new()
			.with_storage(
				MoonbeamAdapter::asset_type_key("AssetTypeId", &tur_type()),
				7u128,
			)
			.with_storage(
				MoonbeamAdapter::asset_type_key("AssetTypeUnitsPerSecond", &tur_type()),
				2_000_000_000_000u128,
			);
		let (adapter, _) = adapter_with(api).await;

		let fee = adapter
			.weight_to_fee(
				&Weight::from_parts(WEIGHT_REF_TIME_PER_SECOND * 3, 0),
				&Location::sibling_parachain(2114),
			)
			.await
			.unwrap();
		assert_eq!(fee, 6_000_000_000_000);
	}

	#[tokio::test]
	async fn test_unregistered_asset() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;

		let error = adapter
			.weight_to_fee(&Weight::from_parts(1, 0), &Location::sibling_parachain(2114))
			.await
			.unwrap_err();

		assert_eq!(
			error.unresolved_reason(),
			Some(UnresolvedAssetReason::AssetNotRegistered)
		);
		assert_eq!(
			api.calls(),
			vec![RecordedCall::Storage(MoonbeamAdapter::asset_type_key(
				"AssetTypeId",
				&tur_type()
			))]
		);
	}

	#[tokio::test]
	async fn test_registered_without_units_per_second() {
		let api = MockChainApi::new().with_storage(
			MoonbeamAdapter::asset_type_key("AssetTypeId", &tur_type()),
			7u128,
		);
		let (adapter, _) = adapter_with(api).await;

		let error = adapter
			.weight_to_fee(&Weight::from_parts(1, 0), &Location::sibling_parachain(2114))
			.await
			.unwrap_err();
		assert_eq!(
			error.unresolved_reason(),
			Some(UnresolvedAssetReason::MetadataNotInitialized)
		);
	}

	#[tokio::test]
	async fn test_transact_through_signed_call() {
		let (adapter, api) = adapter_with(MockChainApi::new()).await;
		let register = adapter.as_task_register().unwrap();

		let request = RegistryTaskRequest {
			target: Location::sibling_parachain(2114),
			fee_location: Location::sibling_parachain(2114),
			transact_info: TransactInfo {
				encoded_call: vec![0xaa],
				encoded_call_weight: Weight::from_parts(100, 10),
				overall_weight: Weight::from_parts(200, 20),
				fee: 9,
			},
			derivative_account: AccountId::Id32([3u8; 32]),
		};
		let call = register.create_registry_task_extrinsic(&request).unwrap();

		let expected = [
			Location::sibling_parachain(2114).versioned().encode(),
			vec![0x01],
			Location::sibling_parachain(2114).versioned().encode(),
			Some(9u128).encode(),
			vec![0xaau8].encode(),
			Weight::from_parts(100, 10).encode(),
			Some(WeightLimit::Limited(Weight::from_parts(200, 20))).encode(),
			vec![0x01],
		]
		.concat();

		assert!(call.is("XcmTransactor", "transact_through_signed"));
		assert_eq!(call.args, expected);
		assert_eq!(api.call_count(), 0);
	}
}
