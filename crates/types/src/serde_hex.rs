//! Serde helpers for `0x`-prefixed hex byte strings

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

/// Decode a hex string with or without the `0x` prefix.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
	hex::decode(value.strip_prefix("0x").unwrap_or(value))
}

/// Encode bytes as a `0x`-prefixed hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

/// Fixed-size byte arrays (`[u8; N]`) as hex strings.
pub mod array {
	use super::*;

	pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&encode_hex(bytes))
	}

	pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		let bytes = decode_hex(&value).map_err(D::Error::custom)?;
		bytes.try_into().map_err(|bytes: Vec<u8>| {
			D::Error::custom(format!("expected {} bytes, got {}", N, bytes.len()))
		})
	}
}

/// Variable-length byte vectors as hex strings.
pub mod vec {
	use super::*;

	pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&encode_hex(bytes))
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		decode_hex(&value).map_err(D::Error::custom)
	}
}
