//! Weight and fee figures of a call executed through XCM

use crate::weight::Weight;
use serde::{Deserialize, Serialize};

/// Weights of a call to be transacted remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XcmWeight {
	#[serde(with = "crate::serde_hex::vec")]
	pub encoded_call: Vec<u8>,
	/// Weight of the call alone, from the chain's dry run
	pub encoded_call_weight: Weight,
	/// Call weight plus the weight of every XCM instruction around it
	pub overall_weight: Weight,
}

/// Everything needed to transact a call on another chain and pay for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactInfo {
	#[serde(with = "crate::serde_hex::vec")]
	pub encoded_call: Vec<u8>,
	pub encoded_call_weight: Weight,
	pub overall_weight: Weight,
	pub fee: u128,
}

impl TransactInfo {
	pub fn new(weight: XcmWeight, fee: u128) -> Self {
		Self {
			encoded_call: weight.encoded_call,
			encoded_call_weight: weight.encoded_call_weight,
			overall_weight: weight.overall_weight,
			fee,
		}
	}
}
