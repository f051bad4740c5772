//! Mangata adapter
//!
//! Destination-only chain. Foreign assets are priced from the ORML asset registry with
//! Mangata's custom metadata. There is no way to transact back to the origin, so tasks
//! targeting Mangata are always paid through the origin's sovereign account.

use crate::{base::ChainAdapterCore, transfers};
use async_trait::async_trait;
use codec::{Decode, Encode};
use oak_types::{
	AccountId, AdapterError, AdapterResult, Call, Chain, ChainAdapter, ChainConnector,
	ChainFamily, ExtrinsicSigner, Location, StorageHasher, StorageKey, SubmissionReceipt,
	UnresolvedAssetReason, VersionedLocation, Weight, XcmWeight,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct XcmMetadata {
	/// Fee charged for every second of XCM execution
	pub fee_per_second: u128,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct XykMetadata {
	pub operations_disabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode)]
pub struct MangataCustomMetadata {
	pub xcm: Option<XcmMetadata>,
	pub xyk: Option<XykMetadata>,
}

/// `AssetRegistry.Metadata` entry
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct MangataAssetMetadata {
	pub decimals: u32,
	pub name: Vec<u8>,
	pub symbol: Vec<u8>,
	pub existential_deposit: u128,
	pub location: Option<VersionedLocation>,
	pub additional: MangataCustomMetadata,
}

#[derive(Debug)]
pub struct MangataAdapter {
	core: ChainAdapterCore,
}

impl MangataAdapter {
	pub fn new(chain: Chain, connector: Arc<dyn ChainConnector>) -> AdapterResult<Self> {
		if chain.family != ChainFamily::Mangata {
			return Err(AdapterError::configuration(format!(
				"chain {} is a {} chain, not mangata",
				chain.key, chain.family
			)));
		}
		chain.validate()?;

		Ok(Self {
			core: ChainAdapterCore::new(chain, connector),
		})
	}

	fn location_key(location: &Location) -> StorageKey {
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
}

#[async_trait]
impl ChainAdapter for MangataAdapter {
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
			.read_storage(&Self::location_key(&location), "LocationToAssetId")
			.await?
			.ok_or_else(|| {
				self.core
					.unresolved(asset_location, UnresolvedAssetReason::AssetNotRegistered)
			})?;

		let metadata: Option<MangataAssetMetadata> = self
			.core
			.read_storage(&Self::metadata_key(asset_id), "AssetMetadata")
			.await?;
		let fee_per_second = metadata
			.and_then(|metadata| metadata.additional.xcm)
			.map(|xcm| xcm.fee_per_second)
			.ok_or_else(|| {
				self.core
					.unresolved(asset_location, UnresolvedAssetReason::MetadataNotInitialized)
			})?;
		debug!(
			"{} is asset {} on {}, {} per second",
			asset_location,
			asset_id,
			self.core.key(),
			fee_per_second
		);

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
