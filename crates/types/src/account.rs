//! Account identifiers
//!
//! Substrate chains address accounts by 32-byte public keys while EVM-compatible chains
//! (Moonbeam) use 20-byte keys. Both are written as `0x`-prefixed hex.

use crate::{location::Junction, serde_hex};
use codec::{Encode, Output};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Width of the accounts of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
	#[default]
	Id32,
	Key20,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountId {
	Id32([u8; 32]),
	Key20([u8; 20]),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountParseError {
	#[error("Invalid hex in account: {0}")]
	InvalidHex(String),
	#[error("Invalid account length: {length} bytes (expected 20 or 32)")]
	InvalidLength { length: usize },
}

impl AccountId {
	pub fn as_bytes(&self) -> &[u8] {
		match self {
			AccountId::Id32(id) => id,
			AccountId::Key20(key) => key,
		}
	}

	pub fn kind(&self) -> AccountKind {
		match self {
			AccountId::Id32(_) => AccountKind::Id32,
			AccountId::Key20(_) => AccountKind::Key20,
		}
	}

	/// Interior junction addressing this account, without a network qualifier.
	pub fn to_junction(&self) -> Junction {
		match self {
			AccountId::Id32(id) => Junction::AccountId32 {
				network: None,
				id: *id,
			},
			AccountId::Key20(key) => Junction::AccountKey20 {
				network: None,
				key: *key,
			},
		}
	}

	/// Account of sibling parachain `para_id` on another parachain.
	///
	/// `b"sibl" ++ para_id (LE)` zero-padded, truncated to 20 bytes for `Key20` chains.
	pub fn sibling_sovereign(para_id: u32, kind: AccountKind) -> Self {
		let mut raw = [0u8; 32];
		raw[..4].copy_from_slice(b"sibl");
		raw[4..8].copy_from_slice(&para_id.to_le_bytes());
		match kind {
			AccountKind::Id32 => AccountId::Id32(raw),
			AccountKind::Key20 => {
				let mut key = [0u8; 20];
				key.copy_from_slice(&raw[..20]);
				AccountId::Key20(key)
			},
		}
	}
}

/// Raw bytes, as `AccountId32`/`AccountId20` are encoded in calls.
impl Encode for AccountId {
	fn size_hint(&self) -> usize {
		self.as_bytes().len()
	}

	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		dest.write(self.as_bytes());
	}
}

impl TryFrom<&[u8]> for AccountId {
	type Error = AccountParseError;

	fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
		match bytes.len() {
			32 => {
				let mut id = [0u8; 32];
				id.copy_from_slice(bytes);
				Ok(AccountId::Id32(id))
			},
			20 => {
				let mut key = [0u8; 20];
				key.copy_from_slice(bytes);
				Ok(AccountId::Key20(key))
			},
			length => Err(AccountParseError::InvalidLength { length }),
		}
	}
}

impl FromStr for AccountId {
	type Err = AccountParseError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let bytes = serde_hex::decode_hex(value.trim())
			.map_err(|e| AccountParseError::InvalidHex(e.to_string()))?;
		AccountId::try_from(bytes.as_slice())
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&serde_hex::encode_hex(self.as_bytes()))
	}
}

impl fmt::Debug for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "AccountId({})", self)
	}
}

impl Serialize for AccountId {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for AccountId {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let value = String::deserialize(deserializer)?;
		value.parse().map_err(serde::de::Error::custom)
	}
}
