//! OAK Service
//!
//! Orchestration of cross-chain task scheduling over the chain adapters.

pub mod sdk;

pub use sdk::{
	ScheduledTask, SchedulingError, SchedulingResult, SchedulingStage, Sdk, TaskRequest,
};
