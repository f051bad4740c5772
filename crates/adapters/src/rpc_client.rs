//! JSON-RPC over HTTP chain client
//!
//! Implements the [`ChainApi`] boundary with plain Substrate node RPCs: `state_call` for the
//! transaction-payment runtime APIs, `state_getStorage`, `state_getRuntimeVersion`,
//! `chain_getBlockHash` and `author_submitExtrinsic`. Call indices come from the chain
//! configuration and signing is delegated to an [`ExtrinsicSigner`].

use crate::client_cache::{ClientCache, ClientConfig};
use async_trait::async_trait;
use codec::{Decode, Encode};
use dashmap::DashMap;
use oak_types::{
	serde_hex, AccountId, Call, CallIndices, Chain, ChainApi, ChainConnector, ChainError,
	ChainResult, ExtrinsicSigner, PaymentInfo, SigningPayload, StorageHasher, StorageKey,
	SubmissionReceipt, Weight,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	#[serde(default)]
	result: Option<Value>,
	#[serde(default)]
	error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
	code: i64,
	message: String,
	#[serde(default)]
	data: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeVersion {
	spec_version: u32,
	transaction_version: u32,
}

/// Map a `ws(s)://` endpoint to the `http(s)://` one served on the same port.
pub fn http_endpoint(endpoint: &str) -> ChainResult<Url> {
	let mut url = Url::parse(endpoint).map_err(|e| ChainError::Connection {
		endpoint: endpoint.to_string(),
		reason: format!("invalid endpoint: {}", e),
	})?;

	let scheme = match url.scheme() {
		"ws" | "http" => "http",
		"wss" | "https" => "https",
		other => {
			return Err(ChainError::Connection {
				endpoint: endpoint.to_string(),
				reason: format!("unsupported scheme {}", other),
			})
		},
	};
	if url.scheme() != scheme && url.set_scheme(scheme).is_err() {
		return Err(ChainError::Connection {
			endpoint: endpoint.to_string(),
			reason: "cannot switch endpoint scheme to http".to_string(),
		});
	}
	Ok(url)
}

fn decode_hex_result<T: Decode>(value: &Value, what: &str) -> ChainResult<T> {
	let hex = value
		.as_str()
		.ok_or_else(|| ChainError::invalid_response(format!("{} is not a hex string", what)))?;
	let bytes = serde_hex::decode_hex(hex).map_err(|e| ChainError::decode(what, e))?;
	T::decode(&mut &bytes[..]).map_err(|e| ChainError::decode(what, e))
}

/// Connection to one node over HTTP JSON-RPC
#[derive(Debug)]
pub struct RpcChainApi {
	chain_key: String,
	url: Url,
	client: Arc<Client>,
	call_indices: CallIndices,
	genesis_hash: [u8; 32],
	next_id: AtomicU64,
	next_nonce: DashMap<AccountId, u32>,
	cancel: CancellationToken,
}

impl RpcChainApi {
	/// Connect and fetch the genesis hash, failing if the node cannot be reached
	pub async fn connect(chain: &Chain, client: Arc<Client>) -> ChainResult<Self> {
		let url = http_endpoint(&chain.endpoint)?;
		let mut api = Self {
			chain_key: chain.key.clone(),
			url,
			client,
			call_indices: chain.call_indices.clone(),
			genesis_hash: [0u8; 32],
			next_id: AtomicU64::new(1),
			next_nonce: DashMap::new(),
			cancel: CancellationToken::new(),
		};

		let genesis = api.request("chain_getBlockHash", json!([0])).await?;
		let genesis_hex = genesis
			.as_str()
			.ok_or_else(|| ChainError::invalid_response("genesis hash is not a string"))?;
		let bytes =
			serde_hex::decode_hex(genesis_hex).map_err(|e| ChainError::decode("genesis hash", e))?;
		api.genesis_hash = bytes
			.try_into()
			.map_err(|_| ChainError::invalid_response("genesis hash is not 32 bytes"))?;

		info!(
			"Connected to {} at {} (genesis {})",
			api.chain_key, api.url, genesis_hex
		);
		Ok(api)
	}

	async fn request(&self, method: &str, params: Value) -> ChainResult<Value> {
		if self.cancel.is_cancelled() {
			return Err(ChainError::ConnectionClosed);
		}

		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		debug!("{} -> {} #{} {}", self.chain_key, method, id, params);

		let request = JsonRpcRequest {
			jsonrpc: "2.0",
			id,
			method,
			params,
		};

		tokio::select! {
			_ = self.cancel.cancelled() => Err(ChainError::ConnectionClosed),
			result = self.send(&request) => result,
		}
	}

	async fn send(&self, request: &JsonRpcRequest<'_>) -> ChainResult<Value> {
		let response = self
			.client
			.post(self.url.clone())
			.json(request)
			.send()
			.await
			.map_err(|e| {
				if e.is_connect() {
					ChainError::Connection {
						endpoint: self.url.to_string(),
						reason: e.to_string(),
					}
				} else {
					ChainError::Transport(e.to_string())
				}
			})?;

		if !response.status().is_success() {
			return Err(ChainError::Transport(format!(
				"{} returned status {}",
				self.url,
				response.status()
			)));
		}

		let body: JsonRpcResponse = response
			.json()
			.await
			.map_err(|e| ChainError::invalid_response(format!("invalid JSON-RPC body: {}", e)))?;

		if let Some(error) = body.error {
			let message = match error.data {
				Some(data) => format!("{}: {}", error.message, data),
				None => error.message,
			};
			return Err(ChainError::Rpc {
				code: error.code,
				message,
			});
		}

		debug!("{} <- {} #{}", self.chain_key, request.method, request.id);
		Ok(body.result.unwrap_or(Value::Null))
	}

	async fn state_call(&self, function: &str, data: &[u8]) -> ChainResult<Value> {
		self.request(
			"state_call",
			json!([function, serde_hex::encode_hex(data)]),
		)
		.await
	}

	async fn runtime_version(&self) -> ChainResult<RuntimeVersion> {
		let value = self.request("state_getRuntimeVersion", json!([])).await?;
		serde_json::from_value(value)
			.map_err(|e| ChainError::invalid_response(format!("runtime version: {}", e)))
	}

	/// Next nonce of `account`: the larger of the on-chain nonce and the one after our
	/// last submission, which may still sit in the pool.
	async fn nonce(&self, account: &AccountId) -> ChainResult<u32> {
		let key = StorageKey::map("System", "Account", StorageHasher::Blake2_128Concat, account);
		let on_chain = match self.storage(&key).await? {
			Some(raw) => u32::decode(&mut &raw[..]).map_err(|e| ChainError::decode("AccountInfo", e))?,
			None => 0,
		};
		let local = self.next_nonce.get(account).map(|n| *n).unwrap_or(0);
		Ok(on_chain.max(local))
	}
}

#[async_trait]
impl ChainApi for RpcChainApi {
	fn encode_call(&self, call: &Call) -> ChainResult<Vec<u8>> {
		self.call_indices
			.encode_call(call)
			.ok_or_else(|| ChainError::UnknownCall {
				pallet: call.pallet.clone(),
				function: call.function.clone(),
			})
	}

	async fn payment_info(&self, call: &[u8], sender: &AccountId) -> ChainResult<PaymentInfo> {
		debug!("Dry-running {} byte call for {} on {}", call.len(), sender, self.chain_key);
		let mut data = call.to_vec();
		(call.len() as u32).encode_to(&mut data);

		let result = self
			.state_call("TransactionPaymentCallApi_query_call_info", &data)
			.await?;
		let (weight, class, partial_fee): (Weight, u8, u128) =
			decode_hex_result(&result, "RuntimeDispatchInfo")?;
		Ok(PaymentInfo {
			weight,
			class,
			partial_fee,
		})
	}

	async fn query_weight_to_fee(&self, weight: &Weight) -> ChainResult<u128> {
		let result = self
			.state_call("TransactionPaymentApi_query_weight_to_fee", &weight.encode())
			.await?;
		decode_hex_result(&result, "weight fee")
	}

	async fn storage(&self, key: &StorageKey) -> ChainResult<Option<Vec<u8>>> {
		let result = self.request("state_getStorage", json!([key.to_hex()])).await?;
		match result {
			Value::Null => Ok(None),
			Value::String(hex) => serde_hex::decode_hex(&hex)
				.map(Some)
				.map_err(|e| ChainError::decode("storage value", e)),
			other => Err(ChainError::invalid_response(format!(
				"unexpected storage value {}",
				other
			))),
		}
	}

	async fn rpc(&self, method: &str, params: Value) -> ChainResult<Value> {
		self.request(method, params).await
	}

	async fn sign_and_submit(
		&self,
		call: &[u8],
		signer: &dyn ExtrinsicSigner,
	) -> ChainResult<SubmissionReceipt> {
		let account = signer.account();
		let nonce = self.nonce(&account).await?;
		let version = self.runtime_version().await?;

		let extrinsic = signer
			.sign_extrinsic(&SigningPayload {
				signer: account,
				call: call.to_vec(),
				nonce,
				spec_version: version.spec_version,
				transaction_version: version.transaction_version,
				genesis_hash: self.genesis_hash,
			})
			.await?;

		let hash = self
			.request(
				"author_submitExtrinsic",
				json!([serde_hex::encode_hex(&extrinsic)]),
			)
			.await?;
		let hash = hash
			.as_str()
			.ok_or_else(|| ChainError::invalid_response("extrinsic hash is not a string"))?
			.to_string();

		self.next_nonce.insert(account, nonce.saturating_add(1));
		info!(
			"Submitted extrinsic {} on {} (signer {}, nonce {})",
			hash, self.chain_key, account, nonce
		);
		Ok(SubmissionReceipt::submitted(hash))
	}

	async fn disconnect(&self) -> ChainResult<()> {
		self.cancel.cancel();
		info!("Disconnected from {}", self.chain_key);
		Ok(())
	}
}

/// Opens [`RpcChainApi`] connections with clients from a shared [`ClientCache`]
#[derive(Debug, Clone)]
pub struct RpcConnector {
	cache: ClientCache,
	request_timeout_ms: u64,
}

impl RpcConnector {
	pub fn new() -> Self {
		Self::with_cache(ClientCache::for_adapter())
	}

	pub fn with_cache(cache: ClientCache) -> Self {
		Self {
			cache,
			request_timeout_ms: 30_000,
		}
	}

	pub fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
		self.request_timeout_ms = request_timeout_ms;
		self
	}
}

impl Default for RpcConnector {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ChainConnector for RpcConnector {
	async fn connect(&self, chain: &Chain) -> ChainResult<Arc<dyn ChainApi>> {
		let url = http_endpoint(&chain.endpoint)?;
		let config = ClientConfig::new(&chain.key, url.as_str())
			.with_request_timeout_ms(self.request_timeout_ms);
		let client = self.cache.get_client(&config)?;
		let api = RpcChainApi::connect(chain, client).await?;
		Ok(Arc::new(api))
	}
}
