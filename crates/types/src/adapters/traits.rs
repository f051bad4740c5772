//! Core adapter traits

use super::AdapterResult;
use crate::{
	account::AccountId, call::Call, chain::Chain, chain::ChainFamily,
	client::ExtrinsicSigner, events::SubmissionReceipt, location::Location,
	schedule::InstructionSequence, transact::TransactInfo, transact::XcmWeight, weight::Weight,
};
use async_trait::async_trait;
use std::fmt::Debug;

/// Core trait for chain adapter implementations
///
/// One adapter owns one chain configuration and, once initialized, one connection.
#[async_trait]
pub trait ChainAdapter: Send + Sync + Debug {
	/// Static chain configuration
	fn chain_data(&self) -> &Chain;

	fn key(&self) -> &str {
		&self.chain_data().key
	}

	fn family(&self) -> ChainFamily {
		self.chain_data().family
	}

	/// Open the connection. Fails with `AlreadyInitialized` if already open.
	async fn initialize(&self) -> AdapterResult<()>;

	/// Close the connection; later calls fail with `NotInitialized`.
	async fn destroy(&self) -> AdapterResult<()>;

	async fn is_ready(&self) -> bool;

	/// Location of this chain as seen from a sibling
	fn get_location(&self) -> AdapterResult<Location> {
		self.chain_data().location().ok_or_else(|| {
			super::AdapterError::configuration(format!(
				"chain {} has no para id",
				self.key()
			))
		})
	}

	/// SCALE-encode a call for this chain
	async fn encode_call(&self, call: &Call) -> AdapterResult<Vec<u8>>;

	/// Weight of `payload` plus `instruction_count` XCM instructions
	async fn get_xcm_weight(
		&self,
		payload: &Call,
		sender: &AccountId,
		instruction_count: u64,
	) -> AdapterResult<XcmWeight>;

	/// Fee for `weight`, denominated in the asset at `asset_location`
	async fn weight_to_fee(&self, weight: &Weight, asset_location: &Location)
		-> AdapterResult<u128>;

	/// Transfer `amount` of an asset to `beneficiary` on the chain at `destination`
	async fn cross_chain_transfer(
		&self,
		destination: &Location,
		beneficiary: &AccountId,
		asset_location: &Location,
		amount: u128,
		signer: &dyn ExtrinsicSigner,
	) -> AdapterResult<SubmissionReceipt>;

	/// Sign and submit one call on this chain
	async fn sign_and_submit(
		&self,
		call: &Call,
		signer: &dyn ExtrinsicSigner,
	) -> AdapterResult<SubmissionReceipt>;

	/// Number of XCM instructions a scheduled task sends to this chain under `flow`
	fn xcm_instruction_count(&self, flow: InstructionSequence) -> u64 {
		flow.xcm_instruction_count()
	}

	/// Task registration capability, if this chain has one
	fn as_task_register(&self) -> Option<&dyn TaskRegister> {
		None
	}
}

/// Input of [`TaskRegister::create_registry_task_extrinsic`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryTaskRequest {
	/// Location of the chain the task is registered on
	pub target: Location,
	/// Asset paying for execution on the target, as seen from this chain
	pub fee_location: Location,
	/// Registration call on the target with its weights and fee
	pub transact_info: TransactInfo,
	/// Account that executes the call on the target
	pub derivative_account: AccountId,
}

/// Capability of a destination chain to register a task on the origin chain by
/// transacting a call there through XCM
pub trait TaskRegister: Send + Sync {
	/// Build, without submitting, the call that sends the registration to the target
	fn create_registry_task_extrinsic(&self, request: &RegistryTaskRequest)
		-> AdapterResult<Call>;
}
