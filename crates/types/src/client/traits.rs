//! Chain client traits

use super::{ChainResult, PaymentInfo, SigningPayload};
use crate::{
	account::AccountId, call::Call, chain::Chain, events::SubmissionReceipt,
	storage_key::StorageKey, weight::Weight,
};
use async_trait::async_trait;
use serde_json::Value;
use std::{fmt::Debug, sync::Arc};

/// Live connection to one chain node
#[async_trait]
pub trait ChainApi: Send + Sync + Debug {
	/// SCALE-encode a call with this chain's call indices
	fn encode_call(&self, call: &Call) -> ChainResult<Vec<u8>>;

	/// Dry-run an encoded call to learn its weight and fee
	async fn payment_info(&self, call: &[u8], sender: &AccountId) -> ChainResult<PaymentInfo>;

	/// Convert a weight to a fee in the native currency
	async fn query_weight_to_fee(&self, weight: &Weight) -> ChainResult<u128>;

	/// Raw value of a storage entry, `None` if it does not exist
	async fn storage(&self, key: &StorageKey) -> ChainResult<Option<Vec<u8>>>;

	/// Arbitrary JSON-RPC method
	async fn rpc(&self, method: &str, params: Value) -> ChainResult<Value>;

	/// Sign an encoded call with `signer` and submit it
	async fn sign_and_submit(
		&self,
		call: &[u8],
		signer: &dyn ExtrinsicSigner,
	) -> ChainResult<SubmissionReceipt>;

	/// Close the connection. Requests still in flight resolve with `ConnectionClosed`.
	async fn disconnect(&self) -> ChainResult<()>;
}

/// Opens connections for adapters
#[async_trait]
pub trait ChainConnector: Send + Sync + Debug {
	async fn connect(&self, chain: &Chain) -> ChainResult<Arc<dyn ChainApi>>;
}

/// Holder of an account's signing key
///
/// Key management and the chain's signed-extension format stay with the implementor;
/// it receives the call and chain state and returns the complete signed extrinsic.
#[async_trait]
pub trait ExtrinsicSigner: Send + Sync + Debug {
	fn account(&self) -> AccountId;

	async fn sign_extrinsic(&self, payload: &SigningPayload) -> ChainResult<Vec<u8>>;
}
