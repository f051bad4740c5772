//! Astar / Shibuya adapter
//!
//! Foreign assets are priced from `XcAssetConfig`. Task registration sends a raw XCM
//! program to the origin through `PolkadotXcm.send`, paid from the derivative account.

use crate::{base::ChainAdapterCore, transfers};
use async_trait::async_trait;
use oak_types::{
	xcm::{
		Instruction, MultiAsset, MultiAssetFilter, OriginKind, VersionedXcm, WeightLimit,
		WildMultiAsset,
	},
	AccountId, AdapterError, AdapterResult, Call, Chain, ChainAdapter, ChainConnector,
	ChainFamily, ExtrinsicSigner, Location, RegistryTaskRequest, StorageHasher, StorageKey,
	SubmissionReceipt, TaskRegister, UnresolvedAssetReason, Weight, XcmWeight,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct AstarAdapter {
	core: ChainAdapterCore,
}

impl AstarAdapter {
	pub fn new(chain: Chain, connector: Arc<dyn ChainConnector>) -> AdapterResult<Self> {
		if chain.family != ChainFamily::Astar {
			return Err(AdapterError::configuration(format!(
				"chain {} is a {} chain, not astar",
				chain.key, chain.family
			)));
		}
		chain.validate()?;

		Ok(Self {
			core: ChainAdapterCore::new(chain, connector),
		})
	}

	fn asset_config_key(item: &str, location: &Location) -> StorageKey {
		StorageKey::map(
			"XcAssetConfig",
			item,
			StorageHasher::Twox64Concat,
			&location.versioned(),
		)
	}

	/// XCM program run on the target: withdraw fees from the derivative account, transact
	/// the registration call, and return what is left to the derivative account
	fn registration_program(
		request: &RegistryTaskRequest,
		target_para_id: u32,
	) -> AdapterResult<VersionedXcm> {
		let info = &request.transact_info;
		let fees = MultiAsset::fungible(request.fee_location.relative_to(target_para_id), info.fee);
		let beneficiary = Location::here()
			.pushed_with(request.derivative_account.to_junction())
			.map_err(|e| AdapterError::configuration(format!("invalid beneficiary: {}", e)))?;

		Ok(VersionedXcm::V3(vec![
			Instruction::WithdrawAsset(vec![fees.clone()]),
			Instruction::BuyExecution {
				fees,
				weight_limit: WeightLimit::Limited(info.overall_weight),
			},
			Instruction::Transact {
				origin_kind: OriginKind::SovereignAccount,
				require_weight_at_most: info.encoded_call_weight,
				call: info.encoded_call.clone(),
			},
			Instruction::RefundSurplus,
			Instruction::DepositAsset {
				assets: MultiAssetFilter::Wild(WildMultiAsset::AllCounted(1)),
				beneficiary,
			},
		]))
	}
}

#[async_trait]
impl ChainAdapter for AstarAdapter {
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
		let asset_id: u128 = self
			.core
			.read_storage(
				&Self::asset_config_key("AssetLocationToId", &location),
				"AssetLocationToId",
			)
			.await?
			.ok_or_else(|| {
				self.core
					.unresolved(asset_location, UnresolvedAssetReason::AssetNotRegistered)
			})?;
		debug!("{} is asset {} on {}", asset_location, asset_id, self.core.key());

		// units per second are keyed by location, not by asset id
		let units_per_second: u128 = self
			.core
			.read_storage(
				&Self::asset_config_key("AssetLocationUnitsPerSecond", &location),
				"AssetLocationUnitsPerSecond",
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
		let call =
			transfers::limited_reserve_transfer_assets(destination, beneficiary, &asset, amount)?;
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

impl TaskRegister for AstarAdapter {
	fn create_registry_task_extrinsic(&self, request: &RegistryTaskRequest) -> AdapterResult<Call> {
		let target_para_id = request.target.para_id().ok_or_else(|| {
			AdapterError::configuration(format!(
				"registration target {} is not a sibling parachain",
				request.target
			))
		})?;
		let message = Self::registration_program(request, target_para_id)?;
		debug!(
			"Building PolkadotXcm.send of {} instructions to {} on {}",
			message.instructions().len(),
			request.target,
			self.core.key()
		);

		Ok(Call::new("PolkadotXcm", "send")
			.arg(&request.target.versioned())
			.arg(&message))
	}
}
