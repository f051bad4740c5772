//! Cross-chain locations (XCM v3 `MultiLocation` subset)
//!
//! A location is a relative path: `parents` steps up the consensus hierarchy followed by
//! up to eight interior junctions. Equality is structural, so two locations are the same
//! iff their SCALE encodings match.

use crate::serde_hex;
use codec::{Decode, Encode, Error as CodecError, Input, Output};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of interior junctions of a location.
pub const MAX_JUNCTIONS: usize = 8;

/// Global consensus systems a junction may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkId {
	#[codec(index = 0)]
	ByGenesis(#[serde(with = "serde_hex::array")] [u8; 32]),
	#[codec(index = 1)]
	ByFork {
		block_number: u64,
		#[serde(with = "serde_hex::array")]
		block_hash: [u8; 32],
	},
	#[codec(index = 2)]
	Polkadot,
	#[codec(index = 3)]
	Kusama,
	#[codec(index = 4)]
	Westend,
	#[codec(index = 5)]
	Rococo,
	#[codec(index = 6)]
	Wococo,
	#[codec(index = 7)]
	Ethereum {
		#[codec(compact)]
		chain_id: u64,
	},
	#[codec(index = 8)]
	BitcoinCore,
	#[codec(index = 9)]
	BitcoinCash,
}

/// Opaque key of up to 32 bytes, as used by `Junction::GeneralKey`.
///
/// Serialized as the hex string of its significant bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct GeneralKey {
	length: u8,
	data: [u8; 32],
}

impl GeneralKey {
	pub fn new(bytes: &[u8]) -> Option<Self> {
		if bytes.len() > 32 {
			return None;
		}
		let mut data = [0u8; 32];
		data[..bytes.len()].copy_from_slice(bytes);
		Some(Self {
			length: bytes.len() as u8,
			data,
		})
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.data[..usize::from(self.length).min(32)]
	}
}

impl fmt::Debug for GeneralKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "GeneralKey({})", serde_hex::encode_hex(self.as_bytes()))
	}
}

impl Serialize for GeneralKey {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serde_hex::vec::serialize(self.as_bytes(), serializer)
	}
}

impl<'de> Deserialize<'de> for GeneralKey {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let bytes = serde_hex::vec::deserialize(deserializer)?;
		GeneralKey::new(&bytes).ok_or_else(|| {
			serde::de::Error::custom(format!("general key too long: {} bytes", bytes.len()))
		})
	}
}

/// One step of a location's interior path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Junction {
	#[codec(index = 0)]
	Parachain(#[codec(compact)] u32),
	#[codec(index = 1)]
	AccountId32 {
		#[serde(default)]
		network: Option<NetworkId>,
		#[serde(with = "serde_hex::array")]
		id: [u8; 32],
	},
	#[codec(index = 2)]
	AccountIndex64 {
		#[serde(default)]
		network: Option<NetworkId>,
		#[codec(compact)]
		index: u64,
	},
	#[codec(index = 3)]
	AccountKey20 {
		#[serde(default)]
		network: Option<NetworkId>,
		#[serde(with = "serde_hex::array")]
		key: [u8; 20],
	},
	#[codec(index = 4)]
	PalletInstance(u8),
	#[codec(index = 5)]
	GeneralIndex(#[codec(compact)] u128),
	#[codec(index = 6)]
	GeneralKey(GeneralKey),
	#[codec(index = 7)]
	OnlyChild,
	#[codec(index = 9)]
	GlobalConsensus(NetworkId),
}

/// Error building a location with too many junctions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Too many junctions: {count} (maximum {MAX_JUNCTIONS})")]
pub struct TooManyJunctions {
	pub count: usize,
}

/// Interior path of a location, at most [`MAX_JUNCTIONS`] long.
///
/// Encoded as the XCM v3 `Junctions` enum, whose variant index is the number of junctions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Junction>", into = "Vec<Junction>")]
pub struct Junctions(Vec<Junction>);

impl Junctions {
	pub fn here() -> Self {
		Self(Vec::new())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn first(&self) -> Option<&Junction> {
		self.0.first()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Junction> {
		self.0.iter()
	}

	pub fn as_slice(&self) -> &[Junction] {
		&self.0
	}

	/// Append a junction, failing if the path is already full.
	pub fn push(&mut self, junction: Junction) -> Result<(), TooManyJunctions> {
		if self.0.len() >= MAX_JUNCTIONS {
			return Err(TooManyJunctions {
				count: self.0.len() + 1,
			});
		}
		self.0.push(junction);
		Ok(())
	}
}

impl TryFrom<Vec<Junction>> for Junctions {
	type Error = TooManyJunctions;

	fn try_from(junctions: Vec<Junction>) -> Result<Self, Self::Error> {
		if junctions.len() > MAX_JUNCTIONS {
			return Err(TooManyJunctions {
				count: junctions.len(),
			});
		}
		Ok(Self(junctions))
	}
}

impl From<Junctions> for Vec<Junction> {
	fn from(junctions: Junctions) -> Self {
		junctions.0
	}
}

impl Encode for Junctions {
	fn size_hint(&self) -> usize {
		1 + self.0.iter().map(Encode::size_hint).sum::<usize>()
	}

	fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
		dest.push_byte(self.0.len() as u8);
		for junction in &self.0 {
			junction.encode_to(dest);
		}
	}
}

impl Decode for Junctions {
	fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
		let count = usize::from(input.read_byte()?);
		if count > MAX_JUNCTIONS {
			return Err("Junctions variant out of range".into());
		}
		let mut junctions = Vec::with_capacity(count);
		for _ in 0..count {
			junctions.push(Junction::decode(input)?);
		}
		Ok(Self(junctions))
	}
}

/// Relative location of a chain, account or asset (`parents` + interior path).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
pub struct Location {
	pub parents: u8,
	#[serde(default)]
	pub interior: Junctions,
}

impl Location {
	pub fn new(parents: u8, interior: Vec<Junction>) -> Result<Self, TooManyJunctions> {
		Ok(Self {
			parents,
			interior: Junctions::try_from(interior)?,
		})
	}

	/// The location of the current chain itself.
	pub fn here() -> Self {
		Self::default()
	}

	/// `(1, [Parachain(para_id)])`, a sibling parachain as seen from another parachain.
	pub fn sibling_parachain(para_id: u32) -> Self {
		Self {
			parents: 1,
			interior: Junctions(vec![Junction::Parachain(para_id)]),
		}
	}

	pub fn is_here(&self) -> bool {
		self.parents == 0 && self.interior.is_empty()
	}

	/// Parachain id of a sibling location (`parents == 1`, first junction a parachain).
	pub fn para_id(&self) -> Option<u32> {
		match (self.parents, self.interior.first()) {
			(1, Some(Junction::Parachain(id))) => Some(*id),
			_ => None,
		}
	}

	/// Same location seen from parachain `para_id`.
	///
	/// Paths that go through the sibling `para_id` lose that prefix, so the native currency
	/// of a chain becomes `Here` (or a pallet-local path) from its own perspective. Any other
	/// location is returned unchanged.
	pub fn relative_to(&self, para_id: u32) -> Self {
		if self.para_id() == Some(para_id) {
			return Self {
				parents: 0,
				interior: Junctions(self.interior.0[1..].to_vec()),
			};
		}
		self.clone()
	}

	/// Append a junction to the interior path.
	pub fn pushed_with(mut self, junction: Junction) -> Result<Self, TooManyJunctions> {
		self.interior.push(junction)?;
		Ok(self)
	}

	pub fn versioned(&self) -> VersionedLocation {
		VersionedLocation::V3(self.clone())
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {:?})", self.parents, self.interior.as_slice())
	}
}

/// Location tagged with its XCM version, as expected by call arguments and storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionedLocation {
	#[codec(index = 3)]
	V3(Location),
}

impl VersionedLocation {
	pub fn location(&self) -> &Location {
		match self {
			VersionedLocation::V3(location) => location,
		}
	}
}

impl From<Location> for VersionedLocation {
	fn from(location: Location) -> Self {
		VersionedLocation::V3(location)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn moonbeam_native() -> Location {
		Location::new(1, vec![Junction::Parachain(2004), Junction::PalletInstance(10)]).unwrap()
	}

	#[test]
	fn test_sibling_parachain_encoding() {
		let location = Location::sibling_parachain(2114);
		// parents 1, X1, Parachain, compact(2114)
		assert_eq!(location.encode(), vec![0x01, 0x01, 0x00, 0x09, 0x21]);
		assert_eq!(Location::decode(&mut &location.encode()[..]).unwrap(), location);
	}

	#[test]
	fn test_versioned_location_prefix() {
		let encoded = Location::here().versioned().encode();
		assert_eq!(encoded, vec![0x03, 0x00, 0x00]);
	}

	#[test]
	fn test_too_many_junctions() {
		let junctions = vec![Junction::OnlyChild; MAX_JUNCTIONS + 1];
		assert_eq!(
			Location::new(0, junctions).unwrap_err(),
			TooManyJunctions { count: 9 }
		);

		let mut full = Location::new(0, vec![Junction::OnlyChild; MAX_JUNCTIONS]).unwrap();
		assert!(full.interior.push(Junction::OnlyChild).is_err());
		assert!(Junctions::decode(&mut &[9u8][..]).is_err());
	}

	#[test]
	fn test_relative_to_own_chain() {
		assert!(Location::sibling_parachain(2114).relative_to(2114).is_here());
		assert_eq!(
			moonbeam_native().relative_to(2004),
			Location::new(0, vec![Junction::PalletInstance(10)]).unwrap()
		);
		assert_eq!(
			Location::sibling_parachain(2000).relative_to(2114),
			Location::sibling_parachain(2000)
		);
	}

	#[test]
	fn test_structural_equality() {
		assert_eq!(moonbeam_native(), moonbeam_native());
		assert_ne!(moonbeam_native(), Location::sibling_parachain(2004));
		assert_eq!(moonbeam_native().para_id(), Some(2004));
		assert_eq!(Location::here().para_id(), None);
	}

	#[test]
	fn test_deserialize_from_config_shape() {
		let location: Location = serde_json::from_str(
			r#"{"parents": 1, "interior": [{"parachain": 2110}, {"general_key": "0x00000000"}]}"#,
		)
		.unwrap();

		assert_eq!(location.para_id(), Some(2110));
		match location.interior.as_slice()[1] {
			Junction::GeneralKey(key) => assert_eq!(key.as_bytes(), &[0, 0, 0, 0]),
			other => panic!("unexpected junction {:?}", other),
		}
		assert!(serde_json::from_str::<Location>(r#"{"parents": 0}"#)
			.unwrap()
			.is_here());
	}

	#[test]
	fn test_general_key_encoding_pads_data() {
		let key = GeneralKey::new(&[0xaa, 0xbb]).unwrap();
		let encoded = Junction::GeneralKey(key).encode();
		assert_eq!(encoded.len(), 1 + 1 + 32);
		assert_eq!(&encoded[..4], &[0x06, 0x02, 0xaa, 0xbb]);
		assert!(GeneralKey::new(&[0u8; 33]).is_none());
	}
}
