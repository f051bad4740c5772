//! Two-dimensional weight (compute time, proof size)
//!
//! Mirrors the layout of `sp_weights::Weight` so that values can be passed straight into
//! runtime calls and runtime API queries.

use codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, Mul};

/// Amount of `ref_time` that corresponds to one second of execution.
pub const WEIGHT_REF_TIME_PER_SECOND: u64 = 1_000_000_000_000;

/// Resource cost of executing a call.
#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct Weight {
	/// Computational time, in picoseconds
	#[codec(compact)]
	#[serde(alias = "refTime")]
	pub ref_time: u64,
	/// Size of the storage proof, in bytes
	#[codec(compact)]
	#[serde(alias = "proofSize")]
	pub proof_size: u64,
}

impl Weight {
	pub const fn from_parts(ref_time: u64, proof_size: u64) -> Self {
		Self {
			ref_time,
			proof_size,
		}
	}

	pub const fn zero() -> Self {
		Self::from_parts(0, 0)
	}

	pub fn is_zero(&self) -> bool {
		self.ref_time == 0 && self.proof_size == 0
	}

	/// Componentwise sum, `None` if either component overflows.
	pub fn checked_add(&self, other: &Self) -> Option<Self> {
		Some(Self {
			ref_time: self.ref_time.checked_add(other.ref_time)?,
			proof_size: self.proof_size.checked_add(other.proof_size)?,
		})
	}

	/// Componentwise scalar product, `None` if either component overflows.
	pub fn checked_mul(&self, scalar: u64) -> Option<Self> {
		Some(Self {
			ref_time: self.ref_time.checked_mul(scalar)?,
			proof_size: self.proof_size.checked_mul(scalar)?,
		})
	}

	pub fn saturating_add(&self, other: &Self) -> Self {
		Self {
			ref_time: self.ref_time.saturating_add(other.ref_time),
			proof_size: self.proof_size.saturating_add(other.proof_size),
		}
	}

	pub fn saturating_mul(&self, scalar: u64) -> Self {
		Self {
			ref_time: self.ref_time.saturating_mul(scalar),
			proof_size: self.proof_size.saturating_mul(scalar),
		}
	}

	/// `true` if every component of `self` is less than or equal to the one of `other`.
	pub fn all_lte(&self, other: &Self) -> bool {
		self.ref_time <= other.ref_time && self.proof_size <= other.proof_size
	}

	/// `true` if any component of `self` is greater than the one of `other`.
	pub fn any_gt(&self, other: &Self) -> bool {
		!self.all_lte(other)
	}
}

impl Add for Weight {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		self.saturating_add(&rhs)
	}
}

impl Mul<u64> for Weight {
	type Output = Self;

	fn mul(self, rhs: u64) -> Self {
		self.saturating_mul(rhs)
	}
}

/// Componentwise order. Two weights where one component is larger and the other smaller
/// are incomparable.
impl PartialOrd for Weight {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		match (
			self.ref_time.cmp(&other.ref_time),
			self.proof_size.cmp(&other.proof_size),
		) {
			(a, b) if a == b => Some(a),
			(Ordering::Equal, b) => Some(b),
			(a, Ordering::Equal) => Some(a),
			_ => None,
		}
	}
}

impl std::fmt::Display for Weight {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{{ ref_time: {}, proof_size: {} }}",
			self.ref_time, self.proof_size
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_overall_weight_composition() {
		let encoded_call_weight = Weight::from_parts(1_000_000_000, 10_000);
		let instruction_weight = Weight::from_parts(200_000_000, 2_000);

		let overall = instruction_weight
			.checked_mul(6)
			.and_then(|overhead| encoded_call_weight.checked_add(&overhead))
			.unwrap();

		assert_eq!(overall, Weight::from_parts(2_200_000_000, 22_000));
		assert_eq!(encoded_call_weight + instruction_weight * 6, overall);
	}

	#[test]
	fn test_overflow_is_detected_or_saturated() {
		let big = Weight::from_parts(u64::MAX - 1, 1);

		assert!(big.checked_add(&Weight::from_parts(2, 0)).is_none());
		assert!(big.checked_mul(2).is_none());
		assert_eq!((big * 2).ref_time, u64::MAX);
		assert_eq!((big + Weight::from_parts(5, 5)).ref_time, u64::MAX);
		assert_eq!((big + Weight::from_parts(5, 5)).proof_size, 6);
	}

	#[test]
	fn test_componentwise_ordering() {
		let small = Weight::from_parts(1, 1);
		let large = Weight::from_parts(2, 2);
		let mixed = Weight::from_parts(3, 0);

		assert_eq!(small.partial_cmp(&large), Some(Ordering::Less));
		assert_eq!(large.partial_cmp(&small), Some(Ordering::Greater));
		assert_eq!(small.partial_cmp(&small), Some(Ordering::Equal));
		assert_eq!(
			Weight::from_parts(1, 2).partial_cmp(&large),
			Some(Ordering::Less)
		);
		assert_eq!(mixed.partial_cmp(&small), None);
		assert!(small.all_lte(&large));
		assert!(mixed.any_gt(&large));
	}

	#[test]
	fn test_scale_encoding_uses_compact_fields() {
		let weight = Weight::from_parts(1, 2);
		assert_eq!(weight.encode(), vec![0x04, 0x08]);
		assert_eq!(Weight::decode(&mut &weight.encode()[..]).unwrap(), weight);
	}

	#[test]
	fn test_deserialize_camel_case_aliases() {
		let weight: Weight =
			serde_json::from_str(r#"{"refTime": 1000, "proofSize": 20}"#).unwrap();
		assert_eq!(weight, Weight::from_parts(1000, 20));
	}
}
