//! Runtime calls
//!
//! Chain metadata is not interpreted here. A [`Call`] carries its pallet/function names and
//! the SCALE-encoded arguments; the pallet and call indices come from chain configuration.

use codec::Encode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// `(pallet index, call index)` of a dispatchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 2]", into = "[u8; 2]")]
pub struct CallIndex {
	pub pallet: u8,
	pub call: u8,
}

impl From<[u8; 2]> for CallIndex {
	fn from([pallet, call]: [u8; 2]) -> Self {
		Self { pallet, call }
	}
}

impl From<CallIndex> for [u8; 2] {
	fn from(index: CallIndex) -> Self {
		[index.pallet, index.call]
	}
}

/// Call indices keyed by `"Pallet.function"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallIndices(BTreeMap<String, CallIndex>);

impl CallIndices {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, pallet: &str, function: &str, index: [u8; 2]) -> Self {
		self.insert(pallet, function, index);
		self
	}

	pub fn insert(&mut self, pallet: &str, function: &str, index: [u8; 2]) {
		self.0.insert(format!("{}.{}", pallet, function), index.into());
	}

	pub fn get(&self, pallet: &str, function: &str) -> Option<CallIndex> {
		self.0.get(&format!("{}.{}", pallet, function)).copied()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Encode `call` as `pallet index ++ call index ++ args`.
	pub fn encode_call(&self, call: &Call) -> Option<Vec<u8>> {
		let index = self.get(&call.pallet, &call.function)?;
		let mut encoded = Vec::with_capacity(2 + call.args.len());
		encoded.push(index.pallet);
		encoded.push(index.call);
		encoded.extend_from_slice(&call.args);
		Some(encoded)
	}
}

/// A dispatchable with already encoded arguments.
#[derive(Clone, PartialEq, Eq)]
pub struct Call {
	pub pallet: String,
	pub function: String,
	pub args: Vec<u8>,
}

impl Call {
	pub fn new(pallet: impl Into<String>, function: impl Into<String>) -> Self {
		Self {
			pallet: pallet.into(),
			function: function.into(),
			args: Vec::new(),
		}
	}

	/// Append one SCALE-encoded argument.
	pub fn arg<T: Encode + ?Sized>(mut self, value: &T) -> Self {
		value.encode_to(&mut self.args);
		self
	}

	pub fn is(&self, pallet: &str, function: &str) -> bool {
		self.pallet == pallet && self.function == function
	}
}

impl fmt::Debug for Call {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}.{}(0x{})",
			self.pallet,
			self.function,
			hex::encode(&self.args)
		)
	}
}

impl fmt::Display for Call {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.pallet, self.function)
	}
}
