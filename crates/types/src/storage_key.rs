//! Storage keys of runtime storage items

use codec::Encode;
use serde::{Deserialize, Serialize};
use sp_crypto_hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};
use std::fmt;

/// Hasher applied to a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageHasher {
	Blake2_128,
	Blake2_256,
	Blake2_128Concat,
	Twox128,
	Twox256,
	Twox64Concat,
	Identity,
}

impl StorageHasher {
	pub fn hash(&self, data: &[u8]) -> Vec<u8> {
		match self {
			StorageHasher::Blake2_128 => blake2_128(data).to_vec(),
			StorageHasher::Blake2_256 => blake2_256(data).to_vec(),
			StorageHasher::Blake2_128Concat => [&blake2_128(data)[..], data].concat(),
			StorageHasher::Twox128 => twox_128(data).to_vec(),
			StorageHasher::Twox256 => twox_256(data).to_vec(),
			StorageHasher::Twox64Concat => [&twox_64(data)[..], data].concat(),
			StorageHasher::Identity => data.to_vec(),
		}
	}
}

/// Fully hashed key of a storage entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(Vec<u8>);

impl StorageKey {
	/// Key of a plain storage value: `twox128(pallet) ++ twox128(item)`.
	pub fn plain(pallet: &str, item: &str) -> Self {
		let mut key = twox_128(pallet.as_bytes()).to_vec();
		key.extend_from_slice(&twox_128(item.as_bytes()));
		Self(key)
	}

	/// Key of a storage map entry, `key` being SCALE encoded before hashing.
	pub fn map<K: Encode + ?Sized>(pallet: &str, item: &str, hasher: StorageHasher, key: &K) -> Self {
		let mut storage_key = Self::plain(pallet, item);
		storage_key.0.extend(hasher.hash(&key.encode()));
		storage_key
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

impl fmt::Debug for StorageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "StorageKey({})", self.to_hex())
	}
}

impl fmt::Display for StorageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_plain_key_matches_well_known_prefix() {
		// System.Number
		assert_eq!(
			StorageKey::plain("System", "Number").to_hex(),
			"0x26aa394eea5630e07c48ae0c9558cef702a5c1b19ab7a04f536c519aca4983ac"
		);
	}

	#[test]
	fn test_concat_hashers_keep_the_key() {
		let key = 7u32;
		let twox = StorageKey::map("AssetRegistry", "Metadata", StorageHasher::Twox64Concat, &key);
		let blake = StorageKey::map(
			"AssetManager",
			"AssetTypeId",
			StorageHasher::Blake2_128Concat,
			&key,
		);

		assert_eq!(twox.as_bytes().len(), 32 + 8 + 4);
		assert!(twox.as_bytes().ends_with(&key.encode()));
		assert_eq!(blake.as_bytes().len(), 32 + 16 + 4);
		assert!(blake.as_bytes().ends_with(&key.encode()));
	}

	#[test]
	fn test_opaque_hashers() {
		assert_eq!(StorageHasher::Identity.hash(b"ab"), b"ab".to_vec());
		assert_eq!(StorageHasher::Blake2_128.hash(b"ab").len(), 16);
		assert_eq!(StorageHasher::Twox256.hash(b"ab").len(), 32);
	}
}
