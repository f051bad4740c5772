//! Task schedules and the argument types of the automation-time pallet

use crate::location::VersionedLocation;
use codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// When a scheduled task runs. Timestamps are unix seconds; they are passed through
/// unchanged and validated by the scheduler pallet.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
	#[codec(index = 0)]
	Fixed { execution_times: Vec<u64> },
	#[codec(index = 1)]
	Recurring {
		next_execution_time: u64,
		frequency: u64,
	},
}

impl Schedule {
	pub fn fixed(execution_times: Vec<u64>) -> Self {
		Schedule::Fixed { execution_times }
	}

	pub fn recurring(next_execution_time: u64, frequency: u64) -> Self {
		Schedule::Recurring {
			next_execution_time,
			frequency,
		}
	}

	/// First time the task is due, if any.
	pub fn first_execution(&self) -> Option<u64> {
		match self {
			Schedule::Fixed { execution_times } => execution_times.iter().min().copied(),
			Schedule::Recurring {
				next_execution_time,
				..
			} => Some(*next_execution_time),
		}
	}
}

/// Fee paid in an asset other than the native currency.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AssetPayment {
	pub asset_location: VersionedLocation,
	pub amount: u128,
}

/// Who pays for the remote execution of an XCMP task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionSequence {
	/// The origin chain's sovereign account on the destination pays
	#[codec(index = 0)]
	PayThroughSovereignAccount,
	/// The user's derivative account on the destination pays
	#[codec(index = 1)]
	PayThroughRemoteDerivativeAccount,
}

impl InstructionSequence {
	/// Number of XCM instructions the origin chain sends to the destination.
	///
	/// `WithdrawAsset, BuyExecution, Transact, RefundSurplus, DepositAsset`, preceded by
	/// `DescendOrigin` when paying from the derivative account.
	pub fn xcm_instruction_count(&self) -> u64 {
		match self {
			InstructionSequence::PayThroughSovereignAccount => 5,
			InstructionSequence::PayThroughRemoteDerivativeAccount => 6,
		}
	}
}

impl std::fmt::Display for InstructionSequence {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			InstructionSequence::PayThroughSovereignAccount => f.write_str("sovereign"),
			InstructionSequence::PayThroughRemoteDerivativeAccount => f.write_str("derivative"),
		}
	}
}
