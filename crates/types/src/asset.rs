//! Assets known to a chain

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// A fungible asset identified by its location as seen from a sibling parachain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAsset {
	pub symbol: String,
	pub decimals: u8,
	pub location: Location,
	/// Whether this is the chain's own currency
	#[serde(default)]
	pub is_native: bool,
}

impl ChainAsset {
	pub fn new(symbol: impl Into<String>, decimals: u8, location: Location, is_native: bool) -> Self {
		Self {
			symbol: symbol.into(),
			decimals,
			location,
			is_native,
		}
	}

	/// `amount` whole tokens in the asset's smallest unit.
	pub fn units(&self, amount: u128) -> Option<u128> {
		10u128
			.checked_pow(u32::from(self.decimals))
			.and_then(|scale| scale.checked_mul(amount))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_units() {
		let tur = ChainAsset::new("TUR", 10, Location::sibling_parachain(2114), true);
		assert_eq!(tur.units(3), Some(30_000_000_000));

		let huge = ChainAsset::new("BIG", 40, Location::here(), false);
		assert_eq!(huge.units(1), None);
	}
}
