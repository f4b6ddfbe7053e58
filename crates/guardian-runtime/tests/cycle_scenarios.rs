//! # Guardian Cycle Scenarios
//!
//! End-to-end cycles over the fixture adapter, the real key validation
//! service and the local wallet.
//!
//! ## Test Categories
//!
//! 1. **Deposits** - clean modules attest, repeated states are not re-signed
//! 2. **Unvetting** - resolved duplicates and invalid signatures
//! 3. **Pauses** - live front-runs, historical theft, legacy on-chain pause
//! 4. **Cycle control** - concurrency guard, repeated blocks, guardian set,
//!    retries after a module failure

use async_trait::async_trait;
use blst::min_pk::SecretKey;
use dg_01_deposit_verification::domain::bls::DST;
use dg_01_deposit_verification::{
    DepositMessage, DepositSignatureVerifier, KeyValidationService, VerificationPool,
    DEPOSIT_AMOUNT_GWEI,
};
use dg_02_block_snapshot::{BlockSnapshotCollector, RegistryService, SnapshotConfig};
use dg_03_key_guard::{
    ContractCall, GatewayError, GatewayResult, GuardDecision, GuardError, GuardianMessenger,
    PauseReason, SigningPayload, StakingModuleGuard, TransactionGateway,
};
use guardian_runtime::{
    CycleOutcome, CycleReport, Fixture, FixtureAdapter, GuardianCycle, LocalWallet, MessagePrefixes,
};
use shared_bus::{AppMeta, Envelope, InMemoryMessageBus, MessageBody};
use shared_types::{
    Address, BlockRef, BlsPublicKey, BlsSignature, DepositEvent, EcdsaSignature, Hash,
    NodeOperator, RegistryKey, SigningKeyEvent, StakingModule, WithdrawalCredentials,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

// =============================================================================
// TEST HELPERS
// =============================================================================

const WALLET_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const MODULE_A: u32 = 1;
const MODULE_B: u32 = 2;
const BLOCK: u64 = 100;

type TestCycle<G> = GuardianCycle<
    FixtureAdapter,
    FixtureAdapter,
    FixtureAdapter,
    FixtureAdapter,
    KeyValidationService,
    G,
    InMemoryMessageBus,
>;

struct Harness<G: TransactionGateway = LocalWallet> {
    source: Arc<FixtureAdapter>,
    wallet: Arc<G>,
    messages: Receiver<Envelope>,
    cycle: TestCycle<G>,
}

impl<G: TransactionGateway> Harness<G> {
    fn drain(&mut self) -> Vec<MessageBody> {
        let mut bodies = Vec::new();
        while let Ok(envelope) = self.messages.try_recv() {
            bodies.push(envelope.message.body);
        }
        bodies
    }
}

fn protocol_wc() -> WithdrawalCredentials {
    let mut raw = [0u8; 32];
    raw[0] = 0x01;
    raw[12..].copy_from_slice(&[0xb9; 20]);
    raw.into()
}

fn foreign_wc() -> WithdrawalCredentials {
    let mut raw = [0u8; 32];
    raw[0] = 0x01;
    raw[12..].copy_from_slice(&[0xee; 20]);
    raw.into()
}

fn module_address(module_id: u32) -> Address {
    match module_id {
        MODULE_A => Address([0xaa; 20]),
        _ => Address([0xbb; 20]),
    }
}

fn block_ref(number: u64) -> BlockRef {
    BlockRef {
        number,
        hash: Hash::from([number as u8; 32]),
    }
}

fn verifier() -> DepositSignatureVerifier {
    DepositSignatureVerifier::for_chain(1).unwrap()
}

fn secret_key(seed: u8) -> SecretKey {
    SecretKey::key_gen(&[seed; 32], &[]).unwrap()
}

fn pubkey(seed: u8) -> BlsPublicKey {
    BlsPublicKey(secret_key(seed).sk_to_pk().to_bytes())
}

/// A vetted unused key whose deposit signature is valid for `wc`.
fn signed_key(
    seed: u8,
    wc: &WithdrawalCredentials,
    module_id: u32,
    operator_index: u64,
    index: u64,
) -> RegistryKey {
    let sk = secret_key(seed);
    let message = DepositMessage {
        pubkey: pubkey(seed),
        withdrawal_credentials: *wc,
        amount: DEPOSIT_AMOUNT_GWEI,
    };
    let signature = sk.sign(&verifier().signing_root(&message), DST, &[]);

    RegistryKey {
        key: pubkey(seed),
        deposit_signature: BlsSignature(signature.to_bytes()),
        operator_index,
        module_address: module_address(module_id),
        index,
        used: false,
        vetted: true,
    }
}

fn deposit(seed: u8, wc: WithdrawalCredentials, block_number: u64, log_index: u64) -> DepositEvent {
    DepositEvent {
        pubkey: pubkey(seed),
        withdrawal_credentials: wc,
        amount: DEPOSIT_AMOUNT_GWEI,
        signature: BlsSignature::ZERO,
        valid: true,
        tx_hash: Hash::from([seed; 32]),
        block_number,
        block_hash: block_ref(block_number).hash,
        log_index,
    }
}

fn registration(seed: u8, module_id: u32, operator_index: u64, block_number: u64) -> SigningKeyEvent {
    SigningKeyEvent {
        module_address: module_address(module_id),
        operator_index,
        key: pubkey(seed),
        block_number,
        block_hash: block_ref(block_number).hash,
        log_index: 0,
    }
}

fn operator(index: u64, staking_limit: u64, used_key_count: u64) -> NodeOperator {
    NodeOperator {
        index,
        staking_limit,
        used_key_count,
    }
}

fn wallet() -> LocalWallet {
    LocalWallet::from_hex(
        WALLET_KEY,
        MessagePrefixes {
            attest: Hash::from([0x01; 32]),
            pause: Hash::from([0x02; 32]),
            unvet: Hash::from([0x03; 32]),
        },
    )
    .unwrap()
}

/// Local wallet whose first `failing_pauses` pause signatures fail.
struct FlakyWallet {
    inner: LocalWallet,
    failing_pauses: AtomicUsize,
}

impl FlakyWallet {
    fn failing(failing_pauses: usize) -> Self {
        Self {
            inner: wallet(),
            failing_pauses: AtomicUsize::new(failing_pauses),
        }
    }
}

#[async_trait]
impl TransactionGateway for FlakyWallet {
    fn guardian_address(&self) -> Address {
        self.inner.guardian_address()
    }

    async fn sign(&self, payload: &SigningPayload) -> GatewayResult<EcdsaSignature> {
        if matches!(payload, SigningPayload::Pause { .. })
            && self
                .failing_pauses
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(GatewayError::Signing("signer busy".to_string()));
        }
        self.inner.sign(payload).await
    }

    async fn submit(&self, call: ContractCall) -> GatewayResult<()> {
        self.inner.submit(call).await
    }
}

/// Two clean modules, one operator each, two valid keys per operator.
fn base_fixture() -> Fixture {
    let wc = protocol_wc();
    Fixture {
        chain_id: 1,
        registry_version: "1.0.0".to_string(),
        block: block_ref(BLOCK),
        freshness_token: Hash::from([0xf1; 32]),
        modules: vec![
            StakingModule {
                id: MODULE_A,
                address: module_address(MODULE_A),
                nonce: 5,
                paused: false,
            },
            StakingModule {
                id: MODULE_B,
                address: module_address(MODULE_B),
                nonce: 7,
                paused: false,
            },
        ],
        operators: BTreeMap::from([
            (MODULE_A, vec![operator(0, 2, 0)]),
            (MODULE_B, vec![operator(0, 2, 0)]),
        ]),
        keys: vec![
            signed_key(1, &wc, MODULE_A, 0, 0),
            signed_key(2, &wc, MODULE_A, 0, 1),
            signed_key(3, &wc, MODULE_B, 0, 0),
            signed_key(4, &wc, MODULE_B, 0, 1),
        ],
        deposit_root: Hash::from([0x0d; 32]),
        guardians: vec![wallet().guardian_address()],
        withdrawal_credentials: wc,
        security_version: 3,
        max_operators_per_unvetting: 200,
        ..Default::default()
    }
}

fn harness(fixture: Fixture) -> Harness {
    harness_with(fixture, Arc::new(wallet()))
}

fn harness_with<G: TransactionGateway>(fixture: Fixture, wallet: Arc<G>) -> Harness<G> {
    let source = Arc::new(FixtureAdapter::new(fixture));
    let bus = Arc::new(InMemoryMessageBus::new());
    let messages = bus.subscribe();

    let registry = RegistryService::new(Arc::clone(&source), Arc::clone(&source), Duration::from_secs(5));
    let collector = BlockSnapshotCollector::new(
        Arc::clone(&source),
        Arc::clone(&source),
        wallet.guardian_address(),
        SnapshotConfig {
            read_timeout: Duration::from_secs(5),
            deposit_events_from_block: 0,
        },
    );
    let validator = Arc::new(KeyValidationService::new(
        verifier(),
        VerificationPool::new(2).unwrap(),
    ));
    let messenger = GuardianMessenger::new(
        bus,
        "mainnet-defender",
        AppMeta {
            name: "deposit-guardian".to_string(),
            version: "0.1.0".to_string(),
        },
    );
    let guard = StakingModuleGuard::new(Arc::clone(&wallet), messenger, 50);

    Harness {
        source,
        wallet,
        messages,
        cycle: GuardianCycle::new(registry, collector, validator, guard),
    }
}

fn completed(outcome: CycleOutcome) -> CycleReport {
    match outcome {
        CycleOutcome::Completed(report) => report,
        other => panic!("expected a completed cycle, got {other:?}"),
    }
}

fn decision(report: &CycleReport, module_id: u32) -> &GuardDecision {
    &report.report_for(module_id).unwrap().decision
}

fn pauses(bodies: &[MessageBody]) -> usize {
    bodies
        .iter()
        .filter(|body| matches!(body, MessageBody::Pause(_)))
        .count()
}

fn deposits_for(bodies: &[MessageBody], module_id: u32) -> usize {
    bodies
        .iter()
        .filter(|body| matches!(body, MessageBody::Deposit(m) if m.staking_module_id == module_id))
        .count()
}

// =============================================================================
// DEPOSITS
// =============================================================================

/// Test: Clean modules attest once and ping the processed block
#[tokio::test]
async fn test_clean_modules_attest_and_ping() {
    let mut h = harness(base_fixture());

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert!(report.failures.is_empty());
    assert!(report.ping_sent);
    assert!(matches!(decision(&report, MODULE_A), GuardDecision::Deposit { .. }));
    assert!(matches!(decision(&report, MODULE_B), GuardDecision::Deposit { .. }));
    assert_eq!(deposits_for(&bodies, MODULE_A), 1);
    assert_eq!(deposits_for(&bodies, MODULE_B), 1);

    let deposit = bodies
        .iter()
        .find_map(|body| match body {
            MessageBody::Deposit(m) if m.staking_module_id == MODULE_B => Some(m.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(deposit.nonce, 7);
    assert_eq!(deposit.block_number, BLOCK);
    assert_eq!(deposit.deposit_root, Hash::from([0x0d; 32]));
    assert_ne!(deposit.signature.v, 0);

    let ping = bodies
        .iter()
        .find_map(|body| match body {
            MessageBody::Ping(m) => Some(m.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(ping.block_number, BLOCK);
    assert_eq!(ping.staking_module_ids, vec![MODULE_A, MODULE_B]);
}

/// Test: A new block in the same re-signing bucket is not re-attested
#[tokio::test]
async fn test_unchanged_state_is_not_resigned() {
    let mut h = harness(base_fixture());
    completed(h.cycle.run().await.unwrap());
    h.drain();

    h.source.update(|f| f.block = block_ref(BLOCK + 1));
    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert!(matches!(decision(&report, MODULE_A), GuardDecision::Unchanged { .. }));
    assert_eq!(deposits_for(&bodies, MODULE_A), 0);
    assert_eq!(deposits_for(&bodies, MODULE_B), 0);
    assert!(bodies.iter().any(|body| matches!(body, MessageBody::Ping(_))));
}

// =============================================================================
// UNVETTING
// =============================================================================

/// Test: A resolved duplicate unvets only the later registrant's module
#[tokio::test]
async fn test_resolved_duplicate_unvets_later_registrant() {
    let wc = protocol_wc();
    let mut fixture = base_fixture();
    fixture.keys = vec![
        signed_key(1, &wc, MODULE_A, 0, 0),
        signed_key(9, &wc, MODULE_A, 0, 1),
        signed_key(3, &wc, MODULE_B, 0, 0),
        signed_key(9, &wc, MODULE_B, 0, 1),
    ];
    fixture.signing_key_events = vec![
        registration(9, MODULE_B, 0, 10),
        registration(9, MODULE_A, 0, 20),
    ];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    match decision(&report, MODULE_A) {
        GuardDecision::Unvet { keys } => {
            assert_eq!(keys.len(), 1);
            assert_eq!(keys[0].key, pubkey(9));
            assert_eq!(keys[0].module_address, module_address(MODULE_A));
        }
        other => panic!("expected unvet, got {other:?}"),
    }
    assert!(matches!(decision(&report, MODULE_B), GuardDecision::Deposit { .. }));

    let unvet = bodies
        .iter()
        .find_map(|body| match body {
            MessageBody::Unvet(m) => Some(m.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(unvet.staking_module_id, MODULE_A);
    assert_eq!(unvet.nonce, 5);
    assert_eq!(unvet.operator_ids, "0x0000000000000000");
    assert_eq!(unvet.vetted_keys_by_operator, format!("0x{:032x}", 1));

    assert_eq!(deposits_for(&bodies, MODULE_A), 0);
    assert_eq!(deposits_for(&bodies, MODULE_B), 1);
    assert!(matches!(
        h.wallet.submitted_calls().as_slice(),
        [ContractCall::Unvet { staking_module_id: MODULE_A, .. }]
    ));
}

/// Test: A key signed for other credentials is unvetted from its index
#[tokio::test]
async fn test_invalid_signature_unvets_operator() {
    let wc = protocol_wc();
    let mut fixture = base_fixture();
    fixture.keys = vec![
        signed_key(1, &wc, MODULE_A, 0, 0),
        signed_key(2, &foreign_wc(), MODULE_A, 0, 1),
        signed_key(3, &wc, MODULE_B, 0, 0),
    ];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert!(matches!(decision(&report, MODULE_A), GuardDecision::Unvet { .. }));
    let unvet = bodies
        .iter()
        .find_map(|body| match body {
            MessageBody::Unvet(m) => Some(m.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(unvet.vetted_keys_by_operator, format!("0x{:032x}", 1));
}

/// Test: A critical wallet balance still signs the unvet but skips the transaction
#[tokio::test]
async fn test_critical_balance_skips_unvet_transaction() {
    let mut fixture = base_fixture();
    fixture.keys[1] = signed_key(2, &foreign_wc(), MODULE_A, 0, 1);
    fixture.wallet_balance_critical = true;
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert_eq!(report.report_for(MODULE_A).unwrap().calls_submitted, 0);
    assert!(h.wallet.submitted_calls().is_empty());
    assert!(bodies.iter().any(|body| matches!(body, MessageBody::Unvet(_))));
}

// =============================================================================
// PAUSES
// =============================================================================

/// Test: A foreign-credential deposit in the live window pauses the module
#[tokio::test]
async fn test_live_front_run_pauses_module() {
    let mut fixture = base_fixture();
    fixture.deposit_events = vec![deposit(1, foreign_wc(), BLOCK, 3)];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    match decision(&report, MODULE_A) {
        GuardDecision::Pause { reasons } => assert_eq!(reasons, &vec![PauseReason::LiveFrontRun]),
        other => panic!("expected pause, got {other:?}"),
    }
    assert_eq!(deposits_for(&bodies, MODULE_A), 0);

    let pause = bodies
        .iter()
        .find_map(|body| match body {
            MessageBody::Pause(m) => Some(m.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(pause.block_number, BLOCK);
    assert_eq!(pause.staking_module_id, None);
    assert!(h.wallet.submitted_calls().is_empty());
}

/// Test: A deposit with protocol credentials is benign prior use
#[tokio::test]
async fn test_protocol_credentials_deposit_is_benign() {
    let mut fixture = base_fixture();
    fixture.deposit_events = vec![deposit(1, protocol_wc(), BLOCK, 0)];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert!(matches!(decision(&report, MODULE_A), GuardDecision::Deposit { .. }));
    assert_eq!(deposits_for(&bodies, MODULE_A), 1);
}

/// Test: A stolen deposit of a used key pauses every module
#[tokio::test]
async fn test_historical_theft_pauses_every_module() {
    let wc = protocol_wc();
    let mut fixture = base_fixture();
    let mut used = signed_key(8, &wc, MODULE_B, 0, 0);
    used.used = true;
    fixture.keys = vec![
        signed_key(1, &wc, MODULE_A, 0, 0),
        used,
        signed_key(3, &wc, MODULE_B, 0, 1),
    ];
    fixture.operators.insert(MODULE_B, vec![operator(0, 2, 1)]);
    fixture.deposit_events = vec![
        deposit(8, foreign_wc(), 40, 0),
        deposit(8, wc, 60, 0),
    ];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    for module_id in [MODULE_A, MODULE_B] {
        match decision(&report, module_id) {
            GuardDecision::Pause { reasons } => {
                assert!(reasons.contains(&PauseReason::HistoricalFrontRun));
            }
            other => panic!("expected pause for module {module_id}, got {other:?}"),
        }
    }
    assert_eq!(deposits_for(&bodies, MODULE_A), 0);
    assert_eq!(deposits_for(&bodies, MODULE_B), 0);
    // One module-less pause covers both modules
    assert_eq!(pauses(&bodies), 1);
}

/// Test: Before pause mechanism v3 the pause is per module and sent on-chain
#[tokio::test]
async fn test_legacy_pause_submits_transaction() {
    let mut fixture = base_fixture();
    fixture.security_version = 2;
    fixture.deposit_events = vec![deposit(1, foreign_wc(), BLOCK, 0)];
    let mut h = harness(fixture);

    completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert!(matches!(
        h.wallet.submitted_calls().as_slice(),
        [ContractCall::PauseModule { staking_module_id: MODULE_A, block_number: BLOCK, .. }]
    ));
    assert!(bodies
        .iter()
        .any(|body| matches!(body, MessageBody::Pause(m) if m.staking_module_id == Some(MODULE_A))));
}

/// Test: A paused module gets no action at all
#[tokio::test]
async fn test_paused_module_is_left_alone() {
    let mut fixture = base_fixture();
    fixture.paused_modules.insert(MODULE_A);
    fixture.deposit_events = vec![deposit(1, foreign_wc(), BLOCK, 0)];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert_eq!(decision(&report, MODULE_A), &GuardDecision::AlreadyPaused);
    assert!(!bodies.iter().any(|body| matches!(body, MessageBody::Pause(_))));
}

// =============================================================================
// CYCLE CONTROL
// =============================================================================

/// Test: A second concurrent cycle returns immediately
#[tokio::test]
async fn test_concurrent_cycle_already_running() {
    let mut fixture = base_fixture();
    fixture.read_delay_ms = 50;
    let h = harness(fixture);

    let (first, second) = tokio::join!(h.cycle.run(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        h.cycle.run().await
    });

    assert!(matches!(first.unwrap(), CycleOutcome::Completed(_)));
    assert!(matches!(second.unwrap(), CycleOutcome::AlreadyRunning));
}

/// Test: The same registry block is processed once
#[tokio::test]
async fn test_same_block_is_skipped() {
    let mut h = harness(base_fixture());
    completed(h.cycle.run().await.unwrap());
    h.drain();

    let outcome = h.cycle.run().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::AlreadyProcessed { block_number: BLOCK }));
    assert!(h.drain().is_empty());
    assert_eq!(h.cycle.last_processed(), Some(block_ref(BLOCK)));
}

/// Test: A registry block behind the last processed one is not acted on
#[tokio::test]
async fn test_stale_block_is_skipped() {
    let mut h = harness(base_fixture());
    completed(h.cycle.run().await.unwrap());
    h.drain();

    h.source.update(|f| f.block = block_ref(BLOCK - 1));
    let outcome = h.cycle.run().await.unwrap();

    assert!(matches!(
        outcome,
        CycleOutcome::Stale { block_number: 99, last_processed: BLOCK }
    ));
    assert!(h.drain().is_empty());
}

/// Test: A guardian outside the guardian set publishes nothing
#[tokio::test]
async fn test_no_guardian_index_publishes_nothing() {
    let mut fixture = base_fixture();
    fixture.guardians = vec![Address([0x01; 20])];
    let mut h = harness(fixture);

    let report = completed(h.cycle.run().await.unwrap());

    assert!(h.drain().is_empty());
    assert!(!report.ping_sent);
    assert_eq!(report.report_for(MODULE_A).unwrap().messages_sent, 0);
    assert!(h.cycle.guard().states().get(MODULE_A).is_some());
}

/// Test: One failing module does not stop the others or the ping
#[tokio::test]
async fn test_module_failure_is_isolated() {
    let mut h = harness(base_fixture());
    h.source.update(|f| f.max_operators_per_unvetting = 0);
    h.source.update(|f| f.keys[1] = signed_key(2, &foreign_wc(), MODULE_A, 0, 1));

    let outcome = h.cycle.run().await.unwrap();
    assert_eq!(outcome.label(), "partial");
    let report = completed(outcome);

    // Zero chunk size fails only the module that needed unvetting
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, MODULE_A);
    assert!(matches!(decision(&report, MODULE_B), GuardDecision::Deposit { .. }));
    assert!(h.drain().iter().any(|body| matches!(body, MessageBody::Ping(_))));

    // The block stays unprocessed and is handled again
    assert_eq!(h.cycle.last_processed(), None);
    let retry = completed(h.cycle.run().await.unwrap());
    assert_eq!(retry.failures.len(), 1);
    assert!(matches!(decision(&retry, MODULE_B), GuardDecision::Unchanged { .. }));
}

/// Test: A pause that failed to sign is retried as live on the next block
#[tokio::test]
async fn test_failed_pause_is_retried_next_block() {
    let mut fixture = base_fixture();
    fixture.deposit_events = vec![deposit(1, foreign_wc(), BLOCK, 3)];
    let mut h = harness_with(fixture, Arc::new(FlakyWallet::failing(1)));

    let first = completed(h.cycle.run().await.unwrap());
    assert!(matches!(
        first.failures.as_slice(),
        [(MODULE_A, GuardError::Gateway(GatewayError::Signing(_)))]
    ));
    assert_eq!(pauses(&h.drain()), 0);
    assert_eq!(h.cycle.last_processed(), None);

    h.source.update(|f| f.block = block_ref(BLOCK + 1));
    let second = completed(h.cycle.run().await.unwrap());
    let bodies = h.drain();

    assert!(second.failures.is_empty());
    match decision(&second, MODULE_A) {
        GuardDecision::Pause { reasons } => assert_eq!(reasons, &vec![PauseReason::LiveFrontRun]),
        other => panic!("expected pause, got {other:?}"),
    }
    assert_eq!(pauses(&bodies), 1);
    assert_eq!(h.cycle.last_processed(), Some(block_ref(BLOCK + 1)));
}
