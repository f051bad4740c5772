//! Static description of a chain an adapter talks to

use crate::{
	account::AccountKind, asset::ChainAsset, call::CallIndices, derivative::DerivationConfig,
	location::Location, weight::Weight,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Runtime family of a chain, selecting the adapter implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
	/// OAK / Turing, the chains hosting the automation-time scheduler
	Oak,
	Moonbeam,
	Astar,
	Mangata,
}

impl ChainFamily {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChainFamily::Oak => "oak",
			ChainFamily::Moonbeam => "moonbeam",
			ChainFamily::Astar => "astar",
			ChainFamily::Mangata => "mangata",
		}
	}
}

impl fmt::Display for ChainFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Validation errors for chain configurations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainValidationError {
	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Invalid chain key: {key}")]
	InvalidKey { key: String },

	#[error("Default asset {symbol} of chain {key} is not native to it")]
	ForeignDefaultAsset { key: String, symbol: String },

	#[error("Duplicate asset symbol {symbol} on chain {key}")]
	DuplicateAsset { key: String, symbol: String },

	#[error("Instruction weight of chain {key} must not be zero")]
	ZeroInstructionWeight { key: String },
}

/// Chain configuration, loaded once and owned by one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
	/// Unique key, e.g. `turing-local`
	pub key: String,
	pub family: ChainFamily,
	/// Network name, e.g. `turing` or `moonbase-alpha`
	pub network: String,
	pub relay_chain: String,
	/// JSON-RPC endpoint
	pub endpoint: String,
	#[serde(default)]
	pub para_id: Option<u32>,
	#[serde(default)]
	pub account_kind: AccountKind,
	pub default_asset: ChainAsset,
	#[serde(default)]
	pub assets: Vec<ChainAsset>,
	/// Weight charged per XCM instruction on this chain
	pub instruction_weight: Weight,
	/// Set on chains that derive accounts for remote origins
	#[serde(default)]
	pub derivation: Option<DerivationConfig>,
	#[serde(default)]
	pub call_indices: CallIndices,
}

impl Chain {
	/// Location of this chain as seen from a sibling parachain.
	pub fn location(&self) -> Option<Location> {
		self.para_id.map(Location::sibling_parachain)
	}

	/// Whether `location` designates this chain's native currency.
	///
	/// Both sides are compared from this chain's own perspective so that `Here` and the
	/// sibling form of the same asset match.
	pub fn is_native_location(&self, location: &Location) -> bool {
		match self.para_id {
			Some(para_id) => {
				location.relative_to(para_id) == self.default_asset.location.relative_to(para_id)
			},
			None => location == &self.default_asset.location,
		}
	}

	pub fn find_asset(&self, symbol: &str) -> Option<&ChainAsset> {
		std::iter::once(&self.default_asset)
			.chain(self.assets.iter())
			.find(|asset| asset.symbol.eq_ignore_ascii_case(symbol))
	}

	/// Validate the chain configuration
	pub fn validate(&self) -> Result<(), ChainValidationError> {
		if self.key.is_empty() {
			return Err(ChainValidationError::MissingRequiredField {
				field: "key".to_string(),
			});
		}

		if !self
			.key
			.chars()
			.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
		{
			return Err(ChainValidationError::InvalidKey {
				key: self.key.clone(),
			});
		}

		if self.endpoint.is_empty() {
			return Err(ChainValidationError::MissingRequiredField {
				field: "endpoint".to_string(),
			});
		}

		let native_here = match self.para_id {
			Some(para_id) => {
				let own = self.default_asset.location.relative_to(para_id);
				own.parents == 0
			},
			None => self.default_asset.location.parents == 0,
		};
		if !self.default_asset.is_native || !native_here {
			return Err(ChainValidationError::ForeignDefaultAsset {
				key: self.key.clone(),
				symbol: self.default_asset.symbol.clone(),
			});
		}

		let mut seen = vec![self.default_asset.symbol.to_lowercase()];
		for asset in &self.assets {
			let symbol = asset.symbol.to_lowercase();
			if seen.contains(&symbol) {
				return Err(ChainValidationError::DuplicateAsset {
					key: self.key.clone(),
					symbol: asset.symbol.clone(),
				});
			}
			seen.push(symbol);
		}

		if self.instruction_weight.is_zero() {
			return Err(ChainValidationError::ZeroInstructionWeight {
				key: self.key.clone(),
			});
		}

		Ok(())
	}
}
