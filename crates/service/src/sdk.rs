//! Cross-chain task scheduling
//!
//! [`Sdk`] composes the OAK origin adapter with a destination adapter and runs one of the
//! two scheduling protocols:
//!
//! - **pay through sovereign account**: the task is scheduled directly on the origin by the
//!   origin signer, and execution on the destination is paid by the origin's sovereign
//!   account there;
//! - **pay through remote derivative account**: the destination signer sends the
//!   registration to the origin through XCM, and the task is scheduled as, and paid by, the
//!   signer's derivative account on the origin.
//!
//! Each request is performed once. The first failure is returned together with the stage
//! it occurred in; nothing is retried.

use oak_adapters::{OakAdapter, XcmpTaskParams};
use oak_types::{
	AccountId, AdapterError, Call, ChainAdapter, ExtrinsicSigner, InstructionSequence,
	Location, RegistryTaskRequest, Schedule, SubmissionReceipt, TaskRegister, TransactInfo,
	XcmWeight,
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Progress of one scheduling request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingStage {
	BuildingPayload,
	WeightsComputed,
	FeesComputed,
	ExtrinsicBuilt,
	Submitted,
	Finalized,
	Rejected,
}

impl SchedulingStage {
	pub fn as_str(&self) -> &'static str {
		match self {
			SchedulingStage::BuildingPayload => "building_payload",
			SchedulingStage::WeightsComputed => "weights_computed",
			SchedulingStage::FeesComputed => "fees_computed",
			SchedulingStage::ExtrinsicBuilt => "extrinsic_built",
			SchedulingStage::Submitted => "submitted",
			SchedulingStage::Finalized => "finalized",
			SchedulingStage::Rejected => "rejected",
		}
	}
}

impl fmt::Display for SchedulingStage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Error)]
pub enum SchedulingError {
	#[error("Chain {chain} cannot register tasks on the origin; use the sovereign account flow")]
	CapabilityMissing { chain: String },

	/// `stage` is the stage that failed to complete
	#[error("Scheduling failed at {stage}: {source}")]
	Stage {
		stage: SchedulingStage,
		#[source]
		source: AdapterError,
	},
}

impl SchedulingError {
	/// Attribute `source` to `stage`, or to `Rejected` when the chain refused the extrinsic
	pub fn at(stage: SchedulingStage) -> impl FnOnce(AdapterError) -> Self {
		move |source| {
			let stage = match source {
				AdapterError::ChainRejected { .. } => SchedulingStage::Rejected,
				_ => stage,
			};
			SchedulingError::Stage { stage, source }
		}
	}

	pub fn stage(&self) -> Option<SchedulingStage> {
		match self {
			SchedulingError::Stage { stage, .. } => Some(*stage),
			SchedulingError::CapabilityMissing { .. } => None,
		}
	}

	pub fn adapter_error(&self) -> Option<&AdapterError> {
		match self {
			SchedulingError::Stage { source, .. } => Some(source),
			SchedulingError::CapabilityMissing { .. } => None,
		}
	}
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// What to run on the destination, when, and which assets pay for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRequest {
	pub schedule: Schedule,
	/// Call executed on the destination chain
	pub payload: Call,
	/// Asset paying the origin's scheduling fee, as seen from a sibling
	pub schedule_fee_location: Location,
	/// Asset paying execution on the destination, as seen from a sibling
	pub execution_fee_location: Location,
}

/// Outcome of a submitted scheduling request
#[derive(Debug, Clone)]
pub struct ScheduledTask {
	pub flow: InstructionSequence,
	/// `Submitted` or `Finalized`
	pub stage: SchedulingStage,
	pub receipt: SubmissionReceipt,
	/// Id from the `automationTime.TaskScheduled` event, when the receipt carries it
	pub task_id: Option<String>,
	/// Destination call with its weights
	pub destination_weight: XcmWeight,
	pub execution_fee: u128,
	/// Account the task runs as on the origin (derivative flow only)
	pub schedule_as: Option<AccountId>,
	/// Origin registration call with its weights and fee (derivative flow only)
	pub registration: Option<TransactInfo>,
}

/// Scheduling orchestrator bound to one OAK origin chain
#[derive(Debug, Clone)]
pub struct Sdk {
	origin: Arc<OakAdapter>,
}

impl Sdk {
	pub fn new(origin: Arc<OakAdapter>) -> Self {
		Self { origin }
	}

	pub fn origin(&self) -> &Arc<OakAdapter> {
		&self.origin
	}

	/// Derivative flow when the destination can register tasks, sovereign flow otherwise
	pub fn recommended_flow(&self, destination: &dyn ChainAdapter) -> InstructionSequence {
		if destination.as_task_register().is_some() {
			InstructionSequence::PayThroughRemoteDerivativeAccount
		} else {
			InstructionSequence::PayThroughSovereignAccount
		}
	}

	/// Run the protocol selected by `flow`
	///
	/// `signer` signs on the origin for the sovereign flow and on the destination for the
	/// derivative flow. An unsupported `flow` is an error, never a fallback.
	pub async fn schedule(
		&self,
		flow: InstructionSequence,
		destination: &dyn ChainAdapter,
		request: &TaskRequest,
		signer: &dyn ExtrinsicSigner,
	) -> SchedulingResult<ScheduledTask> {
		match flow {
			InstructionSequence::PayThroughSovereignAccount => {
				self.schedule_xcmp_task_through_sovereign_account(destination, request, signer)
					.await
			},
			InstructionSequence::PayThroughRemoteDerivativeAccount => {
				self.schedule_xcmp_task_through_remote_derivative_account(
					destination,
					request,
					signer,
				)
				.await
			},
		}
	}

	/// Schedule on the origin, signed by `origin_signer`; execution is paid by the origin's
	/// sovereign account on the destination
	pub async fn schedule_xcmp_task_through_sovereign_account(
		&self,
		destination: &dyn ChainAdapter,
		request: &TaskRequest,
		origin_signer: &dyn ExtrinsicSigner,
	) -> SchedulingResult<ScheduledTask> {
		let flow = InstructionSequence::PayThroughSovereignAccount;
		info!(
			"Scheduling {} on {} through the sovereign account of {}",
			request.payload,
			destination.key(),
			self.origin.key()
		);

		let destination_location = destination
			.get_location()
			.map_err(SchedulingError::at(SchedulingStage::BuildingPayload))?;
		let origin_para_id = self
			.origin
			.chain_data()
			.para_id
			.ok_or_else(|| {
				AdapterError::configuration(format!(
					"origin chain {} has no para id",
					self.origin.key()
				))
			})
			.map_err(SchedulingError::at(SchedulingStage::BuildingPayload))?;
		let sovereign =
			AccountId::sibling_sovereign(origin_para_id, destination.chain_data().account_kind);

		let (destination_weight, execution_fee) = self
			.destination_figures(destination, request, &sovereign, flow)
			.await?;

		let params = self.task_params(
			request,
			destination_location,
			&destination_weight,
			execution_fee,
		);
		let call = self.origin.schedule_xcmp_task_call(&params, flow);
		debug!("Built {} on {}", call, self.origin.key());

		let receipt = self
			.origin
			.sign_and_submit(&call, origin_signer)
			.await
			.map_err(SchedulingError::at(SchedulingStage::Submitted))?;

		Ok(Self::scheduled(
			flow,
			receipt,
			destination_weight,
			execution_fee,
			None,
			None,
		))
	}

	/// Send the registration from the destination, signed by `destination_signer`; the task
	/// is scheduled as, and paid by, the signer's derivative account on the origin
	pub async fn schedule_xcmp_task_through_remote_derivative_account(
		&self,
		destination: &dyn ChainAdapter,
		request: &TaskRequest,
		destination_signer: &dyn ExtrinsicSigner,
	) -> SchedulingResult<ScheduledTask> {
		let flow = InstructionSequence::PayThroughRemoteDerivativeAccount;
		// checked before any network call
		let register: &dyn TaskRegister = destination.as_task_register().ok_or_else(|| {
			warn!(
				"{} has no task registration, refusing the derivative account flow",
				destination.key()
			);
			SchedulingError::CapabilityMissing {
				chain: destination.key().to_string(),
			}
		})?;
		info!(
			"Scheduling {} on {} through the derivative account of {}",
			request.payload,
			destination.key(),
			destination_signer.account()
		);

		let destination_location = destination
			.get_location()
			.map_err(SchedulingError::at(SchedulingStage::BuildingPayload))?;
		let destination_para_id = destination_location
			.para_id()
			.ok_or_else(|| {
				AdapterError::configuration(format!(
					"destination {} is not a sibling parachain",
					destination_location
				))
			})
			.map_err(SchedulingError::at(SchedulingStage::BuildingPayload))?;
		let target = self
			.origin
			.get_location()
			.map_err(SchedulingError::at(SchedulingStage::BuildingPayload))?;

		let (destination_weight, execution_fee) = self
			.destination_figures(destination, request, &destination_signer.account(), flow)
			.await?;

		let derivative = self
			.origin
			.get_derivative_account(&destination_signer.account(), destination_para_id);
		let params = self.task_params(
			request,
			destination_location,
			&destination_weight,
			execution_fee,
		);
		let proxy_call = self
			.origin
			.schedule_xcmp_task_through_proxy_call(&params, &derivative);

		let origin_weight = self
			.origin
			.get_xcm_weight(
				&proxy_call,
				&derivative,
				self.origin.xcm_instruction_count(flow),
			)
			.await
			.map_err(SchedulingError::at(SchedulingStage::WeightsComputed))?;
		let schedule_fee = self
			.origin
			.weight_to_fee(&origin_weight.overall_weight, &request.schedule_fee_location)
			.await
			.map_err(SchedulingError::at(SchedulingStage::FeesComputed))?;
		let transact_info = TransactInfo::new(origin_weight, schedule_fee);
		debug!(
			"Registration on {}: weight {}, fee {}",
			self.origin.key(),
			transact_info.overall_weight,
			schedule_fee
		);

		let call = register
			.create_registry_task_extrinsic(&RegistryTaskRequest {
				target,
				fee_location: request.schedule_fee_location.clone(),
				transact_info: transact_info.clone(),
				derivative_account: derivative,
			})
			.map_err(SchedulingError::at(SchedulingStage::ExtrinsicBuilt))?;
		debug!("Built {} on {}", call, destination.key());

		let receipt = destination
			.sign_and_submit(&call, destination_signer)
			.await
			.map_err(SchedulingError::at(SchedulingStage::Submitted))?;

		Ok(Self::scheduled(
			flow,
			receipt,
			destination_weight,
			execution_fee,
			Some(derivative),
			Some(transact_info),
		))
	}

	/// Derivative account on the origin controlled by `account` of `destination`
	pub fn derivative_account(
		&self,
		destination: &dyn ChainAdapter,
		account: &AccountId,
	) -> Result<AccountId, AdapterError> {
		let para_id = destination.chain_data().para_id.ok_or_else(|| {
			AdapterError::configuration(format!("chain {} has no para id", destination.key()))
		})?;
		Ok(self.origin.get_derivative_account(account, para_id))
	}

	/// Transfer `amount` of the asset at `asset_location` from `destination` to the signer's
	/// derivative account on the origin, so it can pay for derivative-flow registrations
	pub async fn prefund_derivative_account(
		&self,
		destination: &dyn ChainAdapter,
		asset_location: &Location,
		amount: u128,
		destination_signer: &dyn ExtrinsicSigner,
	) -> Result<(AccountId, SubmissionReceipt), AdapterError> {
		let derivative = self.derivative_account(destination, &destination_signer.account())?;
		let origin_location = self.origin.get_location()?;
		info!(
			"Funding derivative account {} on {} with {} from {}",
			derivative,
			self.origin.key(),
			amount,
			destination.key()
		);

		let receipt = destination
			.cross_chain_transfer(
				&origin_location,
				&derivative,
				asset_location,
				amount,
				destination_signer,
			)
			.await?;
		Ok((derivative, receipt))
	}

	async fn destination_figures(
		&self,
		destination: &dyn ChainAdapter,
		request: &TaskRequest,
		sender: &AccountId,
		flow: InstructionSequence,
	) -> SchedulingResult<(XcmWeight, u128)> {
		let weight = destination
			.get_xcm_weight(
				&request.payload,
				sender,
				destination.xcm_instruction_count(flow),
			)
			.await
			.map_err(SchedulingError::at(SchedulingStage::WeightsComputed))?;
		let execution_fee = destination
			.weight_to_fee(&weight.overall_weight, &request.execution_fee_location)
			.await
			.map_err(SchedulingError::at(SchedulingStage::FeesComputed))?;

		debug!(
			"{} on {}: overall weight {}, execution fee {}",
			request.payload,
			destination.key(),
			weight.overall_weight,
			execution_fee
		);
		Ok((weight, execution_fee))
	}

	fn task_params(
		&self,
		request: &TaskRequest,
		destination: Location,
		weight: &XcmWeight,
		execution_fee: u128,
	) -> XcmpTaskParams {
		XcmpTaskParams {
			schedule: request.schedule.clone(),
			destination,
			schedule_fee_location: request.schedule_fee_location.clone(),
			execution_fee_location: request.execution_fee_location.clone(),
			execution_fee_amount: execution_fee,
			transact: weight.clone(),
		}
	}

	fn scheduled(
		flow: InstructionSequence,
		receipt: SubmissionReceipt,
		destination_weight: XcmWeight,
		execution_fee: u128,
		schedule_as: Option<AccountId>,
		registration: Option<TransactInfo>,
	) -> ScheduledTask {
		let stage = if receipt.is_finalized() {
			SchedulingStage::Finalized
		} else {
			SchedulingStage::Submitted
		};
		let task_id = receipt.task_id();
		info!(
			"Task {} via {} flow: {} ({})",
			task_id.as_deref().unwrap_or("<pending>"),
			flow,
			receipt.extrinsic_hash,
			stage
		);

		ScheduledTask {
			flow,
			stage,
			receipt,
			task_id,
			destination_weight,
			execution_fee,
			schedule_as,
			registration,
		}
	}
}
