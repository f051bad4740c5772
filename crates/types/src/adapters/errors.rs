//! Error types for adapter operations

use crate::{chain::ChainValidationError, client::ChainError};
use std::fmt;
use thiserror::Error;

/// Why a non-native asset location could not be priced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedAssetReason {
	/// The registry has no asset id for the location
	AssetNotRegistered,
	/// The asset exists but carries no fee-per-second rate
	MetadataNotInitialized,
}

impl fmt::Display for UnresolvedAssetReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UnresolvedAssetReason::AssetNotRegistered => f.write_str("asset not registered"),
			UnresolvedAssetReason::MetadataNotInitialized => {
				f.write_str("metadata not initialized")
			},
		}
	}
}

/// Adapter operation errors
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("Adapter not initialized: {chain}")]
	NotInitialized { chain: String },

	#[error("Adapter already initialized: {chain}")]
	AlreadyInitialized { chain: String },

	#[error("Unresolved asset {location} on {chain}: {reason}")]
	UnresolvedAsset {
		chain: String,
		location: String,
		reason: UnresolvedAssetReason,
	},

	#[error("Extrinsic rejected by {chain}: {section}.{name}")]
	ChainRejected {
		chain: String,
		section: String,
		name: String,
	},

	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Weight overflow on {chain}")]
	WeightOverflow { chain: String },

	#[error("Fee overflow on {chain}")]
	FeeOverflow { chain: String },

	#[error("Decode error: {0}")]
	Decode(String),

	#[error("RPC error: {0}")]
	Rpc(ChainError),

	#[error("Configuration error: {reason}")]
	Configuration { reason: String },
}

impl AdapterError {
	pub fn configuration(reason: impl Into<String>) -> Self {
		Self::Configuration {
			reason: reason.into(),
		}
	}

	/// Reason of an `UnresolvedAsset` error
	pub fn unresolved_reason(&self) -> Option<UnresolvedAssetReason> {
		match self {
			AdapterError::UnresolvedAsset { reason, .. } => Some(*reason),
			_ => None,
		}
	}
}

impl From<ChainError> for AdapterError {
	fn from(error: ChainError) -> Self {
		match error {
			ChainError::Connection { .. } | ChainError::ConnectionClosed => {
				AdapterError::Connection(error.to_string())
			},
			ChainError::Decode { .. } => AdapterError::Decode(error.to_string()),
			other => AdapterError::Rpc(other),
		}
	}
}

impl From<ChainValidationError> for AdapterError {
	fn from(error: ChainValidationError) -> Self {
		AdapterError::configuration(error.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_chain_error_conversion() {
		assert!(matches!(
			AdapterError::from(ChainError::ConnectionClosed),
			AdapterError::Connection(_)
		));
		assert!(matches!(
			AdapterError::from(ChainError::decode("u128", "eof")),
			AdapterError::Decode(_)
		));
		assert!(matches!(
			AdapterError::from(ChainError::Transport("timeout".to_string())),
			AdapterError::Rpc(ChainError::Transport(_))
		));
	}

	#[test]
	fn test_unresolved_asset_message() {
		let error = AdapterError::UnresolvedAsset {
			chain: "turing-local".to_string(),
			location: "(1, [Parachain(1000)])".to_string(),
			reason: UnresolvedAssetReason::MetadataNotInitialized,
		};
		assert_eq!(
			error.unresolved_reason(),
			Some(UnresolvedAssetReason::MetadataNotInitialized)
		);
		assert!(error.to_string().ends_with("metadata not initialized"));
	}
}
