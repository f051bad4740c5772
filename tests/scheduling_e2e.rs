//! End-to-end scheduling through a started SDK

mod mocks;

use mocks::{local_chains, local_network, remark_request, task_scheduled};
use oak_sdk::codec::Encode;
use oak_sdk::types::test_utils::{MockChainApi, MockSigner, RecordedCall};
use oak_sdk::{
	AccountId, AccountKind, DerivationConfig, ExtrinsicSigner, InstructionSequence, SchedulingStage,
	SdkBuilder, Weight,
};

async fn start(turing: MockChainApi) -> (oak_sdk::OakSdk, std::sync::Arc<mocks::RoutingConnector>) {
	let connector = local_network(turing);
	let mut builder = SdkBuilder::new().with_connector(connector.clone());
	for chain in local_chains() {
		builder = builder.with_chain(chain);
	}
	(builder.start().await.unwrap(), connector)
}

#[tokio::test]
async fn test_mangata_task_uses_sovereign_account() {
	let (oak, network) = start(MockChainApi::new().with_events(vec![task_scheduled("2114-3-1")])).await;
	assert_eq!(network.connect_count(), 4);

	let mangata = oak.chain("mangata-local").unwrap();
	let signer = MockSigner::id32(7);
	let task = oak
		.schedule("mangata-local", &remark_request(mangata.chain_data()), &signer)
		.await
		.unwrap();

	assert_eq!(task.flow, InstructionSequence::PayThroughSovereignAccount);
	assert_eq!(task.stage, SchedulingStage::Finalized);
	assert_eq!(task.task_id.as_deref(), Some("2114-3-1"));

	// weight is measured as the origin's sovereign account on mangata
	let sovereign = AccountId::sibling_sovereign(2114, AccountKind::Id32);
	assert!(matches!(
		&network.api("mangata-local").calls()[0],
		RecordedCall::PaymentInfo { sender, .. } if *sender == sovereign
	));
	assert!(network.api("mangata-local").submissions().is_empty());

	let submissions = network.api("turing-local").submissions();
	assert_eq!(submissions.len(), 1);
	assert_eq!(
		MockChainApi::call_name(&submissions[0].0).as_deref(),
		Some("AutomationTime.schedule_xcmp_task")
	);
	assert_eq!(submissions[0].1, signer.account());

	oak.shutdown().await;
}

#[tokio::test]
async fn test_shibuya_task_uses_derivative_account() {
	let (oak, network) = start(MockChainApi::new()).await;

	let shibuya = oak.chain("shibuya").unwrap();
	let signer = MockSigner::id32(9);
	let task = oak
		.schedule("shibuya", &remark_request(shibuya.chain_data()), &signer)
		.await
		.unwrap();

	let derivative = DerivationConfig::default().derive(&signer.account(), 2000, AccountKind::Id32);
	assert_eq!(task.flow, InstructionSequence::PayThroughRemoteDerivativeAccount);
	assert_eq!(task.schedule_as, Some(derivative.clone()));
	assert_eq!(
		oak.sdk().derivative_account(shibuya.as_ref(), &signer.account()).unwrap(),
		derivative
	);

	// 1_000_000_000 / 10_000 + 6 * 1_000_000_000 / 65_536, priced in native SBY
	assert_eq!(
		task.destination_weight.overall_weight,
		Weight::from_parts(7_000_000_000, 403_216)
	);
	assert_eq!(task.execution_fee, 7_000_000_000);

	// the registration is paid on turing and sent from shibuya
	let registration = task.registration.clone().unwrap();
	assert!(registration.encoded_call.ends_with(&derivative.encode()));
	assert!(network.api("turing-local").submissions().is_empty());

	let submissions = network.api("shibuya").submissions();
	assert_eq!(submissions.len(), 1);
	assert_eq!(
		MockChainApi::call_name(&submissions[0].0).as_deref(),
		Some("PolkadotXcm.send")
	);
	assert_eq!(submissions[0].1, signer.account());
}

#[tokio::test]
async fn test_moonbase_task_can_be_forced_through_sovereign_account() {
	let (oak, network) = start(MockChainApi::new()).await;

	let moonbase = oak.chain("moonbase-local").unwrap();
	let task = oak
		.sdk()
		.schedule(
			InstructionSequence::PayThroughSovereignAccount,
			moonbase.as_ref(),
			&remark_request(moonbase.chain_data()),
			&MockSigner::id32(1),
		)
		.await
		.unwrap();

	assert_eq!(task.flow, InstructionSequence::PayThroughSovereignAccount);
	assert!(task.schedule_as.is_none());
	// 1_000_000_000 / 10_000 + 5 * 200_000_000 / 2_000
	assert_eq!(
		task.destination_weight.overall_weight,
		Weight::from_parts(2_000_000_000, 20_000)
	);
	assert!(network.api("moonbase-local").submissions().is_empty());
	assert_eq!(network.api("turing-local").submissions().len(), 1);
}

#[tokio::test]
async fn test_unknown_destination() {
	let (oak, network) = start(MockChainApi::new()).await;
	let request = remark_request(oak.chain("mangata-local").unwrap().chain_data());

	let error = oak
		.schedule("karura", &request, &MockSigner::id32(1))
		.await
		.unwrap_err();

	assert_eq!(error.stage(), Some(SchedulingStage::BuildingPayload));
	assert!(network.api("turing-local").submissions().is_empty());
}

#[tokio::test]
async fn test_rejected_schedule() {
	let (oak, network) =
		start(MockChainApi::new().with_dispatch_error("automationTime", "InsufficientBalance")).await;
	let mangata = oak.chain("mangata-local").unwrap();

	let error = oak
		.schedule("mangata-local", &remark_request(mangata.chain_data()), &MockSigner::id32(1))
		.await
		.unwrap_err();

	assert_eq!(error.stage(), Some(SchedulingStage::Rejected));
	assert!(error.to_string().contains("InsufficientBalance"));
	assert_eq!(network.api("turing-local").submissions().len(), 1);
}

#[tokio::test]
async fn test_prefund_derivative_account() {
	let (oak, network) = start(MockChainApi::new()).await;
	let shibuya = oak.chain("shibuya").unwrap();
	let signer = MockSigner::id32(9);
	let sby = shibuya.chain_data().default_asset.location.clone();

	let (derivative, _) = oak
		.sdk()
		.prefund_derivative_account(shibuya.as_ref(), &sby, 10_000_000_000, &signer)
		.await
		.unwrap();

	assert_eq!(
		derivative,
		DerivationConfig::default().derive(&signer.account(), 2000, AccountKind::Id32)
	);
	let submissions = network.api("shibuya").submissions();
	assert_eq!(submissions.len(), 1);
	assert_eq!(
		MockChainApi::call_name(&submissions[0].0).as_deref(),
		Some("PolkadotXcm.limited_reserve_transfer_assets")
	);
}

#[tokio::test]
async fn test_shutdown_closes_every_node() {
	let (oak, network) = start(MockChainApi::new()).await;
	oak.shutdown().await;

	for key in ["turing-local", "moonbase-local", "shibuya", "mangata-local"] {
		assert!(network.api(key).is_closed(), "{} still open", key);
		assert!(!oak.chain(key).unwrap().is_ready().await);
	}
}
