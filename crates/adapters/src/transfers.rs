//! Cross-chain asset transfer calls

use oak_types::{
	xcm::{MultiAsset, VersionedMultiAsset, VersionedMultiAssets, WeightLimit},
	AccountId, AdapterError, AdapterResult, Call, Location, VersionedLocation,
};

/// Beneficiary `account` inside the chain at `destination`
fn account_on(destination: &Location, beneficiary: &AccountId) -> AdapterResult<Location> {
	destination
		.clone()
		.pushed_with(beneficiary.to_junction())
		.map_err(|e| AdapterError::configuration(format!("invalid destination: {}", e)))
}

/// `XTokens.transfer_multiasset(asset, dest, Unlimited)`
///
/// `asset_location` is taken as seen from the sending chain.
pub fn xtokens_transfer_multiasset(
	destination: &Location,
	beneficiary: &AccountId,
	asset_location: &Location,
	amount: u128,
) -> AdapterResult<Call> {
	let dest = account_on(destination, beneficiary)?;
	Ok(Call::new("XTokens", "transfer_multiasset")
		.arg(&VersionedMultiAsset::V3(MultiAsset::fungible(
			asset_location.clone(),
			amount,
		)))
		.arg(&VersionedLocation::V3(dest))
		.arg(&WeightLimit::Unlimited))
}

/// `PolkadotXcm.limited_reserve_transfer_assets(dest, beneficiary, assets, 0, Unlimited)`
pub fn limited_reserve_transfer_assets(
	destination: &Location,
	beneficiary: &AccountId,
	asset_location: &Location,
	amount: u128,
) -> AdapterResult<Call> {
	let beneficiary = account_on(&Location::here(), beneficiary)?;
	Ok(Call::new("PolkadotXcm", "limited_reserve_transfer_assets")
		.arg(&VersionedLocation::V3(destination.clone()))
		.arg(&VersionedLocation::V3(beneficiary))
		.arg(&VersionedMultiAssets::V3(vec![MultiAsset::fungible(
			asset_location.clone(),
			amount,
		)]))
		.arg(&0u32)
		.arg(&WeightLimit::Unlimited))
}
