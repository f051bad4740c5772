//! OAK Types
//!
//! Shared models and traits for the OAK cross-chain task scheduling SDK.
//! This crate holds the chain data model, the XCM/SCALE subset used to build calls, and
//! the adapter and chain client contracts implemented by the other crates.

pub mod account;
pub mod adapters;
pub mod asset;
pub mod call;
pub mod chain;
pub mod client;
pub mod derivative;
pub mod events;
pub mod location;
pub mod schedule;
pub mod serde_hex;
pub mod storage_key;
pub mod test_utils;
pub mod transact;
pub mod weight;
pub mod xcm;

// Re-export codec and serde_json for convenience
pub use codec;
pub use serde_json;

pub use account::{AccountId, AccountKind, AccountParseError};
pub use adapters::{
	AdapterError, AdapterResult, ChainAdapter, RegistryTaskRequest, TaskRegister,
	UnresolvedAssetReason,
};
pub use asset::ChainAsset;
pub use call::{Call, CallIndex, CallIndices};
pub use chain::{Chain, ChainFamily, ChainValidationError};
pub use client::{
	ChainApi, ChainConnector, ChainError, ChainResult, ExtrinsicSigner, PaymentInfo,
	SigningPayload,
};
pub use derivative::{DerivationConfig, DerivationHasher};
pub use events::{ChainEvent, SubmissionReceipt, SubmissionStatus};
pub use location::{GeneralKey, Junction, Junctions, Location, NetworkId, VersionedLocation};
pub use schedule::{AssetPayment, InstructionSequence, Schedule};
pub use storage_key::{StorageHasher, StorageKey};
pub use transact::{TransactInfo, XcmWeight};
pub use weight::{Weight, WEIGHT_REF_TIME_PER_SECOND};
