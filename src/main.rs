//! OAK SDK probe
//!
//! Connects every configured chain, logs its fee figures and disconnects.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	oak_sdk::run_probe().await
}
