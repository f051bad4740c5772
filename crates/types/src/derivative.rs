//! Derivative (proxy) accounts
//!
//! An account on a remote chain is represented on the local chain by an account derived
//! from its location, following the `HashedDescription<_, DescribeFamily<_>>` scheme:
//!
//! `hash((prefix, Compact(para_id), (b"AccountId32" | b"AccountKey20", raw).encode()).encode())`

use crate::account::{AccountId, AccountKind};
use codec::{Compact, Encode};
use serde::{Deserialize, Serialize};
use sp_crypto_hashing::{blake2_256, keccak_256};

pub const DEFAULT_DERIVATION_PREFIX: &str = "SiblingChain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationHasher {
	#[default]
	Blake2_256,
	Keccak256,
}

impl DerivationHasher {
	pub fn hash(&self, data: &[u8]) -> [u8; 32] {
		match self {
			DerivationHasher::Blake2_256 => blake2_256(data),
			DerivationHasher::Keccak256 => keccak_256(data),
		}
	}
}

/// How a chain derives local accounts for accounts of sibling chains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationConfig {
	#[serde(default = "default_prefix")]
	pub prefix: String,
	#[serde(default)]
	pub hasher: DerivationHasher,
}

fn default_prefix() -> String {
	DEFAULT_DERIVATION_PREFIX.to_string()
}

impl Default for DerivationConfig {
	fn default() -> Self {
		Self {
			prefix: default_prefix(),
			hasher: DerivationHasher::default(),
		}
	}
}

impl DerivationConfig {
	/// Local account controlled by `account` of sibling parachain `para_id`.
	///
	/// `output` is the account width of the chain the derivative lives on.
	pub fn derive(&self, account: &AccountId, para_id: u32, output: AccountKind) -> AccountId {
		let tail = match account {
			AccountId::Id32(id) => (b"AccountId32", id).encode(),
			AccountId::Key20(key) => (b"AccountKey20", key).encode(),
		};

		let mut description = self.prefix.as_bytes().to_vec();
		Compact(para_id).encode_to(&mut description);
		tail.encode_to(&mut description);

		let hash = self.hasher.hash(&description);
		match output {
			AccountKind::Id32 => AccountId::Id32(hash),
			AccountKind::Key20 => {
				let mut key = [0u8; 20];
				key.copy_from_slice(&hash[..20]);
				AccountId::Key20(key)
			},
		}
	}
}
