//! Test doubles for the chain client boundary
//!
//! [`MockChainApi`] answers from in-memory tables and records every request so tests can
//! assert both results and the exact RPC traffic an operation produced.

use crate::{
	account::AccountId,
	call::{Call, CallIndices},
	chain::Chain,
	client::{ChainApi, ChainConnector, ChainError, ChainResult, ExtrinsicSigner, PaymentInfo, SigningPayload},
	events::{ChainEvent, SubmissionReceipt, SubmissionStatus},
	storage_key::StorageKey,
	weight::Weight,
};
use async_trait::async_trait;
use codec::{Decode, Encode};
use serde_json::{json, Value};
use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
		Arc, Mutex,
	},
};

/// One request received by a [`MockChainApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
	PaymentInfo { call: Vec<u8>, sender: AccountId },
	QueryWeightToFee(Weight),
	Storage(StorageKey),
	Rpc { method: String, params: Value },
	SignAndSubmit { call: Vec<u8>, signer: AccountId },
	Disconnect,
}

impl RecordedCall {
	pub fn is_storage(&self) -> bool {
		matches!(self, RecordedCall::Storage(_))
	}
}

/// In-memory chain node
#[derive(Debug)]
pub struct MockChainApi {
	call_indices: CallIndices,
	call_weight: Mutex<Weight>,
	partial_fee: Mutex<u128>,
	fee_per_ref_time: Mutex<u128>,
	storage: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
	rpc_responses: Mutex<HashMap<String, Value>>,
	events: Mutex<Vec<ChainEvent>>,
	transport_error: Mutex<Option<ChainError>>,
	calls: Mutex<Vec<RecordedCall>>,
	nonce: AtomicU32,
	closed: AtomicBool,
}

impl Default for MockChainApi {
	fn default() -> Self {
		Self {
			call_indices: CallIndices::new(),
			call_weight: Mutex::new(Weight::from_parts(1_000_000_000, 10_000)),
			partial_fee: Mutex::new(1_000_000),
			fee_per_ref_time: Mutex::new(1),
			storage: Mutex::new(HashMap::new()),
			rpc_responses: Mutex::new(HashMap::new()),
			events: Mutex::new(Vec::new()),
			transport_error: Mutex::new(None),
			calls: Mutex::new(Vec::new()),
			nonce: AtomicU32::new(0),
			closed: AtomicBool::new(false),
		}
	}
}

impl MockChainApi {
	pub fn new() -> Self {
		Self::default()
	}

	/// Encode calls with these indices instead of by name
	pub fn with_call_indices(mut self, call_indices: CallIndices) -> Self {
		self.call_indices = call_indices;
		self
	}

	/// Weight reported by `payment_info` for every call
	pub fn with_call_weight(self, weight: Weight) -> Self {
		*lock(&self.call_weight) = weight;
		self
	}

	/// Native fee per unit of `ref_time`
	pub fn with_fee_per_ref_time(self, rate: u128) -> Self {
		*lock(&self.fee_per_ref_time) = rate;
		self
	}

	pub fn with_storage<V: Encode>(self, key: StorageKey, value: V) -> Self {
		lock(&self.storage).insert(key.as_bytes().to_vec(), value.encode());
		self
	}

	pub fn with_rpc_response(self, method: &str, response: Value) -> Self {
		lock(&self.rpc_responses).insert(method.to_string(), response);
		self
	}

	/// Events attached to every submission receipt
	pub fn with_events(self, events: Vec<ChainEvent>) -> Self {
		*lock(&self.events) = events;
		self
	}

	/// Make every submission fail on chain with a module error
	pub fn with_dispatch_error(self, section: &str, name: &str) -> Self {
		lock(&self.events).push(ChainEvent::new(
			"system",
			"ExtrinsicFailed",
			json!({"dispatchError": {"module": {"section": section, "name": name}}}),
		));
		self
	}

	/// Make every request fail with `error`
	pub fn with_transport_error(self, error: ChainError) -> Self {
		*lock(&self.transport_error) = Some(error);
		self
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		lock(&self.calls).clone()
	}

	pub fn call_count(&self) -> usize {
		lock(&self.calls).len()
	}

	pub fn storage_reads(&self) -> usize {
		lock(&self.calls).iter().filter(|call| call.is_storage()).count()
	}

	/// Encoded calls submitted so far, with their signers
	pub fn submissions(&self) -> Vec<(Vec<u8>, AccountId)> {
		lock(&self.calls)
			.iter()
			.filter_map(|call| match call {
				RecordedCall::SignAndSubmit { call, signer } => Some((call.clone(), *signer)),
				_ => None,
			})
			.collect()
	}

	/// `"Pallet.function"` of calls encoded without configured indices
	pub fn call_name(encoded: &[u8]) -> Option<String> {
		String::decode(&mut &encoded[..]).ok()
	}

	/// Arguments following the name of a call encoded without configured indices
	pub fn call_args(encoded: &[u8]) -> Option<Vec<u8>> {
		let mut input = encoded;
		String::decode(&mut input).ok()?;
		Some(input.to_vec())
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	fn record(&self, call: RecordedCall) -> ChainResult<()> {
		if self.is_closed() {
			return Err(ChainError::ConnectionClosed);
		}
		lock(&self.calls).push(call);
		match lock(&self.transport_error).clone() {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ChainApi for MockChainApi {
	fn encode_call(&self, call: &Call) -> ChainResult<Vec<u8>> {
		if let Some(encoded) = self.call_indices.encode_call(call) {
			return Ok(encoded);
		}
		let mut encoded = format!("{}.{}", call.pallet, call.function).encode();
		encoded.extend_from_slice(&call.args);
		Ok(encoded)
	}

	async fn payment_info(&self, call: &[u8], sender: &AccountId) -> ChainResult<PaymentInfo> {
		self.record(RecordedCall::PaymentInfo {
			call: call.to_vec(),
			sender: *sender,
		})?;
		Ok(PaymentInfo::new(
			*lock(&self.call_weight),
			*lock(&self.partial_fee),
		))
	}

	async fn query_weight_to_fee(&self, weight: &Weight) -> ChainResult<u128> {
		self.record(RecordedCall::QueryWeightToFee(*weight))?;
		Ok(u128::from(weight.ref_time) * *lock(&self.fee_per_ref_time))
	}

	async fn storage(&self, key: &StorageKey) -> ChainResult<Option<Vec<u8>>> {
		self.record(RecordedCall::Storage(key.clone()))?;
		Ok(lock(&self.storage).get(key.as_bytes()).cloned())
	}

	async fn rpc(&self, method: &str, params: Value) -> ChainResult<Value> {
		self.record(RecordedCall::Rpc {
			method: method.to_string(),
			params,
		})?;
		lock(&self.rpc_responses)
			.get(method)
			.cloned()
			.ok_or_else(|| ChainError::Rpc {
				code: -32601,
				message: format!("Method not found: {}", method),
			})
	}

	async fn sign_and_submit(
		&self,
		call: &[u8],
		signer: &dyn ExtrinsicSigner,
	) -> ChainResult<SubmissionReceipt> {
		let account = signer.account();
		self.record(RecordedCall::SignAndSubmit {
			call: call.to_vec(),
			signer: account,
		})?;

		let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
		signer
			.sign_extrinsic(&SigningPayload {
				signer: account,
				call: call.to_vec(),
				nonce,
				spec_version: 1,
				transaction_version: 1,
				genesis_hash: [0u8; 32],
			})
			.await?;

		Ok(SubmissionReceipt {
			extrinsic_hash: format!("0x{:064x}", nonce),
			status: SubmissionStatus::Finalized {
				block_hash: format!("0x{:064x}", u64::from(nonce) + 1),
			},
			events: lock(&self.events).clone(),
		})
	}

	async fn disconnect(&self) -> ChainResult<()> {
		self.record(RecordedCall::Disconnect)?;
		self.closed.store(true, Ordering::SeqCst);
		Ok(())
	}
}

/// Connector handing out one shared [`MockChainApi`]
#[derive(Debug, Clone)]
pub struct MockConnector {
	api: Arc<MockChainApi>,
	fail: bool,
	connects: Arc<AtomicUsize>,
}

impl MockConnector {
	pub fn new(api: Arc<MockChainApi>) -> Self {
		Self {
			api,
			fail: false,
			connects: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Connector whose endpoint is unreachable
	pub fn unreachable() -> Self {
		Self {
			fail: true,
			..Self::new(Arc::new(MockChainApi::new()))
		}
	}

	pub fn api(&self) -> Arc<MockChainApi> {
		self.api.clone()
	}

	pub fn connect_count(&self) -> usize {
		self.connects.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ChainConnector for MockConnector {
	async fn connect(&self, chain: &Chain) -> ChainResult<Arc<dyn ChainApi>> {
		self.connects.fetch_add(1, Ordering::SeqCst);
		if self.fail {
			return Err(ChainError::Connection {
				endpoint: chain.endpoint.clone(),
				reason: "connection refused".to_string(),
			});
		}
		Ok(self.api.clone())
	}
}

/// Signer producing a fake extrinsic `account ++ nonce ++ call`
#[derive(Debug, Clone)]
pub struct MockSigner {
	account: AccountId,
	signatures: Arc<AtomicUsize>,
}

impl MockSigner {
	pub fn new(account: AccountId) -> Self {
		Self {
			account,
			signatures: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Signer with a 32-byte account filled with `byte`
	pub fn id32(byte: u8) -> Self {
		Self::new(AccountId::Id32([byte; 32]))
	}

	/// Signer with a 20-byte account filled with `byte`
	pub fn key20(byte: u8) -> Self {
		Self::new(AccountId::Key20([byte; 20]))
	}

	pub fn signature_count(&self) -> usize {
		self.signatures.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ExtrinsicSigner for MockSigner {
	fn account(&self) -> AccountId {
		self.account
	}

	async fn sign_extrinsic(&self, payload: &SigningPayload) -> ChainResult<Vec<u8>> {
		self.signatures.fetch_add(1, Ordering::SeqCst);
		let mut extrinsic = self.account.encode();
		extrinsic.extend(payload.nonce.encode());
		extrinsic.extend_from_slice(&payload.call);
		Ok(extrinsic)
	}
}

/// Chain configurations of a local relay network with one chain per family
pub mod chains {
	use crate::{
		account::AccountKind,
		asset::ChainAsset,
		call::CallIndices,
		chain::{Chain, ChainFamily},
		location::{GeneralKey, Junction, Location},
		weight::Weight,
	};

	fn chain(
		key: &str,
		family: ChainFamily,
		para_id: u32,
		account_kind: AccountKind,
		default_asset: ChainAsset,
		instruction_weight: Weight,
	) -> Chain {
		Chain {
			key: key.to_string(),
			family,
			network: key.to_string(),
			relay_chain: "local".to_string(),
			endpoint: format!("ws://127.0.0.1:{}", 9900 + para_id % 100),
			para_id: Some(para_id),
			account_kind,
			default_asset,
			assets: vec![],
			instruction_weight,
			derivation: None,
			call_indices: CallIndices::new(),
		}
	}

	/// OAK family, parachain 2114
	pub fn turing() -> Chain {
		chain(
			"turing-local",
			ChainFamily::Oak,
			2114,
			AccountKind::Id32,
			ChainAsset::new("TUR", 10, Location::sibling_parachain(2114), true),
			Weight::from_parts(1_000_000_000, 0),
		)
	}

	/// Moonbeam family, parachain 1000, instruction weight 200_000_000 / 2_000
	pub fn moonbase() -> Chain {
		let dev = Location::new(1, vec![Junction::Parachain(1000), Junction::PalletInstance(3)])
			.unwrap_or_default();
		chain(
			"moonbase-local",
			ChainFamily::Moonbeam,
			1000,
			AccountKind::Key20,
			ChainAsset::new("DEV", 18, dev, true),
			Weight::from_parts(200_000_000, 2_000),
		)
	}

	/// Astar family, parachain 2000
	pub fn shibuya() -> Chain {
		chain(
			"shibuya",
			ChainFamily::Astar,
			2000,
			AccountKind::Id32,
			ChainAsset::new("SBY", 18, Location::sibling_parachain(2000), true),
			Weight::from_parts(1_000_000_000, 64 * 1024),
		)
	}

	/// Mangata family, parachain 2110
	pub fn mangata() -> Chain {
		let mut interior = vec![Junction::Parachain(2110)];
		interior.extend(GeneralKey::new(&[0, 0, 0, 0]).map(Junction::GeneralKey));
		let mgx = Location::new(1, interior).unwrap_or_default();
		chain(
			"mangata-local",
			ChainFamily::Mangata,
			2110,
			AccountKind::Id32,
			ChainAsset::new("MGX", 18, mgx, true),
			Weight::from_parts(150_000_000, 0),
		)
	}
}
