//! XCM v3 instruction and asset subset used when building cross-chain calls

use crate::{location::Location, weight::Weight};
use codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum AssetId {
	#[codec(index = 0)]
	Concrete(Location),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum Fungibility {
	#[codec(index = 0)]
	Fungible(#[codec(compact)] u128),
}

/// Amount of a concrete asset.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MultiAsset {
	pub id: AssetId,
	pub fun: Fungibility,
}

impl MultiAsset {
	pub fn fungible(location: Location, amount: u128) -> Self {
		Self {
			id: AssetId::Concrete(location),
			fun: Fungibility::Fungible(amount),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum VersionedMultiAsset {
	#[codec(index = 3)]
	V3(MultiAsset),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum VersionedMultiAssets {
	#[codec(index = 3)]
	V3(Vec<MultiAsset>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum WeightLimit {
	#[codec(index = 0)]
	Unlimited,
	#[codec(index = 1)]
	Limited(Weight),
}

/// Origin under which a `Transact` call is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum OriginKind {
	#[codec(index = 0)]
	Native,
	#[codec(index = 1)]
	SovereignAccount,
	#[codec(index = 2)]
	Superuser,
	#[codec(index = 3)]
	Xcm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum WildMultiAsset {
	#[codec(index = 0)]
	All,
	#[codec(index = 2)]
	AllCounted(#[codec(compact)] u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MultiAssetFilter {
	#[codec(index = 0)]
	Definite(Vec<MultiAsset>),
	#[codec(index = 1)]
	Wild(WildMultiAsset),
}

/// The instructions this crate emits. Indices follow the XCM v3 `Instruction` enum.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Instruction {
	#[codec(index = 0)]
	WithdrawAsset(Vec<MultiAsset>),
	#[codec(index = 6)]
	Transact {
		origin_kind: OriginKind,
		require_weight_at_most: Weight,
		call: Vec<u8>,
	},
	#[codec(index = 11)]
	DescendOrigin(crate::location::Junctions),
	#[codec(index = 13)]
	DepositAsset {
		assets: MultiAssetFilter,
		beneficiary: Location,
	},
	#[codec(index = 19)]
	BuyExecution {
		fees: MultiAsset,
		weight_limit: WeightLimit,
	},
	#[codec(index = 20)]
	RefundSurplus,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum VersionedXcm {
	#[codec(index = 3)]
	V3(Vec<Instruction>),
}

impl VersionedXcm {
	pub fn instructions(&self) -> &[Instruction] {
		match self {
			VersionedXcm::V3(instructions) => instructions,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_multi_asset_encoding() {
		let asset = MultiAsset::fungible(Location::here(), 1);
		// Concrete, (0, Here), Fungible, compact(1)
		assert_eq!(asset.encode(), vec![0x00, 0x00, 0x00, 0x00, 0x04]);
	}

	#[test]
	fn test_weight_limit_encoding() {
		assert_eq!(WeightLimit::Unlimited.encode(), vec![0x00]);
		assert_eq!(
			WeightLimit::Limited(Weight::from_parts(1, 1)).encode(),
			vec![0x01, 0x04, 0x04]
		);
	}

	#[test]
	fn test_transact_call_is_length_prefixed() {
		let instruction = Instruction::Transact {
			origin_kind: OriginKind::SovereignAccount,
			require_weight_at_most: Weight::zero(),
			call: vec![0xaa, 0xbb],
		};
		assert_eq!(
			instruction.encode(),
			vec![0x06, 0x01, 0x00, 0x00, 0x08, 0xaa, 0xbb]
		);
	}

	#[test]
	fn test_versioned_xcm_roundtrip() {
		let message = VersionedXcm::V3(vec![
			Instruction::RefundSurplus,
			Instruction::DepositAsset {
				assets: MultiAssetFilter::Wild(WildMultiAsset::AllCounted(1)),
				beneficiary: Location::here(),
			},
		]);
		let encoded = message.encode();
		assert_eq!(encoded[0], 3);
		assert_eq!(VersionedXcm::decode(&mut &encoded[..]).unwrap(), message);
		assert_eq!(message.instructions().len(), 2);
	}
}
