//! Error types for chain client operations

use thiserror::Error;

/// Transport-level failures talking to a chain node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
	#[error("Failed to connect to {endpoint}: {reason}")]
	Connection { endpoint: String, reason: String },

	#[error("Connection closed")]
	ConnectionClosed,

	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },

	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Invalid response: {reason}")]
	InvalidResponse { reason: String },

	#[error("Failed to decode {what}: {reason}")]
	Decode { what: String, reason: String },

	#[error("No call index configured for {pallet}.{function}")]
	UnknownCall { pallet: String, function: String },

	#[error("Signing failed: {0}")]
	Signing(String),
}

impl ChainError {
	pub fn decode(what: impl Into<String>, error: impl std::fmt::Display) -> Self {
		Self::Decode {
			what: what.into(),
			reason: error.to_string(),
		}
	}

	pub fn invalid_response(reason: impl Into<String>) -> Self {
		Self::InvalidResponse {
			reason: reason.into(),
		}
	}

	/// Whether the error means the node could not be reached at all
	pub fn is_connection_error(&self) -> bool {
		matches!(
			self,
			ChainError::Connection { .. } | ChainError::ConnectionClosed
		)
	}
}
