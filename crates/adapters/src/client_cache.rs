//! HTTP client cache for chain RPC endpoints
//!
//! Provides per-endpoint client instances with connection pooling and keep-alive.

use dashmap::{mapref::entry::Entry, DashMap};
use oak_types::{ChainError, ChainResult};
use reqwest::{Client, ClientBuilder};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for creating HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// HTTP(S) endpoint of the node
	pub endpoint: String,
	/// Chain key for cache differentiation
	pub chain_key: String,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout
	pub keep_alive_timeout_ms: u64,
	/// Timeout of a single request
	pub request_timeout_ms: u64,
	/// Additional headers
	pub headers: Vec<(String, String)>,
}

impl ClientConfig {
	pub fn new(chain_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			chain_key: chain_key.into(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			request_timeout_ms: 30_000,
			headers: vec![
				("User-Agent".to_string(), "OAK-SDK/0.1".to_string()),
				("Content-Type".to_string(), "application/json".to_string()),
			],
		}
	}

	pub fn with_request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
		self.request_timeout_ms = request_timeout_ms;
		self
	}
}

/// Cached client with creation timestamp for TTL management
#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients keyed by configuration, with TTL
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with default 30-minute TTL
	pub fn new() -> Self {
		Self::with_ttl(Duration::from_secs(30 * 60))
	}

	/// Create a new client cache with custom TTL
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Shared process-wide cache
	pub fn for_adapter() -> Self {
		static GLOBAL_CLIENT_CACHE: OnceLock<ClientCache> = OnceLock::new();
		GLOBAL_CLIENT_CACHE.get_or_init(ClientCache::new).clone()
	}

	/// Get or create a client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> ChainResult<Arc<Client>> {
		self.clients.remove_if(config, |_, cached_client| {
			let is_expired = cached_client.is_expired(self.ttl);
			if is_expired {
				warn!(
					"Client cache expired for {} (age: {:?}), will create new client",
					config.endpoint,
					cached_client.created_at.elapsed()
				);
			}
			is_expired
		});

		if let Some(cached_client) = self.clients.get(config) {
			debug!(
				"Reusing cached client for {} (age: {:?})",
				config.endpoint,
				cached_client.created_at.elapsed()
			);
			return Ok(cached_client.client.clone());
		}

		debug!("Creating new client for {}", config.endpoint);
		let cached_client = CachedClient::new(Self::create_client(config)?);
		let client = cached_client.client.clone();

		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => {
				debug!(
					"Another task created client for {}, using existing",
					config.endpoint
				);
				Ok(entry.get().client.clone())
			},
			Entry::Vacant(entry) => {
				entry.insert(cached_client);
				Ok(client)
			},
		}
	}

	fn create_client(config: &ClientConfig) -> ChainResult<Client> {
		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			if let (Ok(header_name), Ok(header_value)) = (
				reqwest::header::HeaderName::from_bytes(key.as_bytes()),
				reqwest::header::HeaderValue::from_str(value),
			) {
				header_map.insert(header_name, header_value);
			}
		}

		ClientBuilder::new()
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.timeout(Duration::from_millis(config.request_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60))
			.default_headers(header_map)
			.build()
			.map_err(|e| ChainError::Transport(e.to_string()))
	}

	/// Remove all expired clients, returning how many were dropped
	pub fn cleanup_expired(&self) -> usize {
		let mut removed_count = 0;
		self.clients.retain(|config, cached_client| {
			let is_expired = cached_client.is_expired(self.ttl);
			if is_expired {
				removed_count += 1;
				debug!("Removed expired client for {}", config.endpoint);
			}
			!is_expired
		});
		removed_count
	}

	pub fn clear(&self) {
		let count = self.clients.len();
		self.clients.clear();
		debug!("Cleared all {} clients from cache", count);
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_client_config_defaults() {
		let config = ClientConfig::new("turing-local", "http://127.0.0.1:9946");

		assert_eq!(config.endpoint, "http://127.0.0.1:9946");
		assert_eq!(config.max_idle_per_host, 10);
		assert_eq!(config.keep_alive_timeout_ms, 90_000);
		assert_eq!(
			config.with_request_timeout_ms(5_000).request_timeout_ms,
			5_000
		);
	}

	#[tokio::test]
	async fn test_client_cache_reuse() {
		let cache = ClientCache::new();
		let config = ClientConfig::new("turing-local", "http://127.0.0.1:9946");

		let client1 = cache.get_client(&config).unwrap();
		let client2 = cache.get_client(&config).unwrap();

		assert!(Arc::ptr_eq(&client1, &client2));
	}

	#[tokio::test]
	async fn test_client_cache_ttl_expiration() {
		let cache = ClientCache::with_ttl(Duration::from_millis(50));
		let config = ClientConfig::new("moonbase-local", "http://127.0.0.1:9949");

		let client1 = cache.get_client(&config).unwrap();
		tokio::time::sleep(Duration::from_millis(100)).await;
		let client2 = cache.get_client(&config).unwrap();

		assert!(!Arc::ptr_eq(&client1, &client2));
		assert_eq!(cache.cleanup_expired(), 0);
	}

	#[tokio::test]
	async fn test_concurrent_access_gets_one_client() {
		let cache = Arc::new(ClientCache::new());
		let config = ClientConfig::new("shibuya", "http://127.0.0.1:9948");

		let mut handles = vec![];
		for _ in 0..10 {
			let cache = cache.clone();
			let config = config.clone();
			handles.push(tokio::spawn(async move {
				Arc::as_ptr(&cache.get_client(&config).unwrap()) as usize
			}));
		}

		let mut results = vec![];
		for handle in handles {
			results.push(handle.await.unwrap());
		}
		assert!(results.iter().all(|&ptr| ptr == results[0]));
	}

	#[test]
	fn test_cache_clones_share_clients() {
		let cache1 = ClientCache::new();
		let cache2 = cache1.clone();
		let config = ClientConfig::new("mangata-local", "http://127.0.0.1:9947");

		let client1 = cache1.get_client(&config).unwrap();
		let client2 = cache2.get_client(&config).unwrap();

		assert!(Arc::ptr_eq(&client1, &client2));
		cache2.clear();
		assert!(!Arc::ptr_eq(&client1, &cache1.get_client(&config).unwrap()));
	}
}
