//! Submission receipts and the events observed on them

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A runtime event, e.g. `automationTime.TaskScheduled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEvent {
	/// Pallet name in camel case (`automationTime`)
	pub section: String,
	/// Event name (`TaskScheduled`)
	pub method: String,
	#[serde(default)]
	pub data: Value,
}

impl ChainEvent {
	pub fn new(section: impl Into<String>, method: impl Into<String>, data: Value) -> Self {
		Self {
			section: section.into(),
			method: method.into(),
			data,
		}
	}

	pub fn is(&self, section: &str, method: &str) -> bool {
		self.section.eq_ignore_ascii_case(section) && self.method == method
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SubmissionStatus {
	/// Accepted into the transaction pool
	Submitted,
	InBlock { block_hash: String },
	Finalized { block_hash: String },
}

/// Outcome of submitting one signed extrinsic.
///
/// Events are only available when the client watched the extrinsic into a block; a plain
/// `author_submitExtrinsic` leaves them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
	pub extrinsic_hash: String,
	pub status: SubmissionStatus,
	#[serde(default)]
	pub events: Vec<ChainEvent>,
}

impl SubmissionReceipt {
	pub fn submitted(extrinsic_hash: impl Into<String>) -> Self {
		Self {
			extrinsic_hash: extrinsic_hash.into(),
			status: SubmissionStatus::Submitted,
			events: Vec::new(),
		}
	}

	pub fn find_event(&self, section: &str, method: &str) -> Option<&ChainEvent> {
		self.events.iter().find(|event| event.is(section, method))
	}

	pub fn is_finalized(&self) -> bool {
		matches!(self.status, SubmissionStatus::Finalized { .. })
	}

	/// Task id carried by an `automationTime.TaskScheduled` event.
	pub fn task_id(&self) -> Option<String> {
		let event = self.find_event("automationTime", "TaskScheduled")?;
		event
			.data
			.get("taskId")
			.or_else(|| event.data.get("task_id"))
			.and_then(|value| match value {
				Value::String(id) => Some(id.clone()),
				Value::Number(id) => Some(id.to_string()),
				_ => None,
			})
	}

	/// `(section, name)` of the module error of a `system.ExtrinsicFailed` event.
	pub fn dispatch_error(&self) -> Option<(String, String)> {
		let event = self.find_event("system", "ExtrinsicFailed")?;
		let error = event
			.data
			.get("dispatchError")
			.or_else(|| event.data.get("dispatch_error"))
			.unwrap_or(&Value::Null);

		let module = error.get("module").unwrap_or(error);
		let section = module.get("section").and_then(Value::as_str);
		let name = module.get("name").and_then(Value::as_str);
		match (section, name) {
			(Some(section), Some(name)) => Some((section.to_string(), name.to_string())),
			_ => Some(("system".to_string(), error.to_string())),
		}
	}
}
