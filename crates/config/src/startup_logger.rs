//! Startup logging for the OAK SDK
//!
//! Banners logged when a process built on the SDK starts, connects its chains and shuts
//! down.

use oak_types::Chain;
use std::env;
use tracing::info;

/// Logs service information at startup
pub fn log_service_info() {
	// Use the root package name, not the current crate
	let service_name = "oak-sdk";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== OAK SDK Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {}", env::consts::OS);
	info!("🏗️ Architecture: {}", env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}

	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the configuration of one chain
pub fn log_chain_info(chain: &Chain) {
	info!(
		"  - {} ({}, {} on {}): {}",
		chain.key, chain.family, chain.network, chain.relay_chain, chain.endpoint
	);
	info!(
		"      para id {:?}, native {} at {}, instruction weight {}",
		chain.para_id,
		chain.default_asset.symbol,
		chain.default_asset.location,
		chain.instruction_weight
	);
}

/// Logs completed startup
pub fn log_startup_complete(origin: &str, chains: usize) {
	info!("✅ OAK SDK ready");
	info!("🌐 Origin chain: {}", origin);
	info!("📡 Connected chains: {}", chains);
}

/// Logs shutdown information
pub fn log_service_shutdown() {
	info!("🛑 OAK SDK Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}
