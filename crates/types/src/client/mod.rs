//! Boundary to a live chain node
//!
//! Adapters never talk to a node directly; they go through a [`ChainApi`] obtained from a
//! [`ChainConnector`], and sign through an [`ExtrinsicSigner`].

pub mod errors;
pub mod traits;

pub use errors::ChainError;
pub use traits::{ChainApi, ChainConnector, ExtrinsicSigner};

use crate::{account::AccountId, weight::Weight};
use serde::{Deserialize, Serialize};

/// Result type for chain client operations
pub type ChainResult<T> = Result<T, ChainError>;

/// Dry-run result of a call, as returned by `TransactionPaymentCallApi_query_call_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
	pub weight: Weight,
	/// Dispatch class (0 normal, 1 operational, 2 mandatory)
	pub class: u8,
	pub partial_fee: u128,
}

impl PaymentInfo {
	pub fn new(weight: Weight, partial_fee: u128) -> Self {
		Self {
			weight,
			class: 0,
			partial_fee,
		}
	}
}

/// Everything a signer needs to produce a signed extrinsic for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPayload {
	pub signer: AccountId,
	pub call: Vec<u8>,
	pub nonce: u32,
	pub spec_version: u32,
	pub transaction_version: u32,
	pub genesis_hash: [u8; 32],
}
