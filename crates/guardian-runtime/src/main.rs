//! # Deposit Guardian
//!
//! Dry-run entry point: chain and registry state come from the fixture file,
//! signatures from the local wallet, and messages go to the in-memory bus.

use anyhow::{Context, Result};
use dg_01_deposit_verification::{KeyValidationService, VerificationPool};
use dg_02_block_snapshot::{BlockSnapshotCollector, RegistryService, SnapshotConfig};
use dg_03_key_guard::{GuardianMessenger, StakingModuleGuard, TransactionGateway};
use guardian_runtime::{
    verify_network, CycleOutcome, FixtureAdapter, GuardianConfig, GuardianCycle, LocalWallet,
    APP_NAME,
};
use guardian_telemetry::{init_telemetry, TelemetryConfig};
use shared_bus::{topic_for_network, AppMeta, InMemoryMessageBus};
use std::sync::Arc;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = GuardianConfig::from_env().context("Invalid guardian configuration")?;
    info!(
        network = %config.network,
        fixture = %config.fixture_path.display(),
        workers = config.workers,
        resign_blocks = config.resign_blocks,
        "Starting deposit guardian"
    );

    let source = Arc::new(
        FixtureAdapter::from_file(&config.fixture_path).context("Failed to load fixture")?,
    );
    let wallet = Arc::new(
        LocalWallet::from_hex(&config.wallet_private_key, config.prefixes)
            .context("Failed to load guardian wallet")?,
    );

    let registry = RegistryService::new(Arc::clone(&source), Arc::clone(&source), config.read_timeout);
    let verifier = verify_network(&registry, config.registry_major_version)
        .await
        .context("Network check failed")?;

    let pool = VerificationPool::new(config.workers).context("Failed to start verification pool")?;
    let validator = Arc::new(KeyValidationService::new(verifier, pool));

    let collector = BlockSnapshotCollector::new(
        Arc::clone(&source),
        Arc::clone(&source),
        wallet.guardian_address(),
        SnapshotConfig {
            read_timeout: config.read_timeout,
            deposit_events_from_block: config.deposit_deployment_block,
        },
    );

    let bus = Arc::new(InMemoryMessageBus::new());
    let messenger = GuardianMessenger::new(
        bus,
        topic_for_network(&config.network),
        AppMeta {
            name: APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    );
    let guard = StakingModuleGuard::new(Arc::clone(&wallet), messenger, config.resign_blocks);

    let cycle = GuardianCycle::new(registry, collector, validator, guard);

    info!(
        guardian_address = %wallet.guardian_address(),
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Guardian is running. Press Ctrl+C to stop."
    );

    let mut ticks = IntervalStream::new(tokio::time::interval(config.poll_interval));
    loop {
        tokio::select! {
            tick = ticks.next() => {
                if tick.is_none() {
                    break;
                }
                match cycle.run().await {
                    Ok(CycleOutcome::Completed(report)) => info!(
                        block_number = report.block.number,
                        modules = report.reports.len(),
                        failed_modules = report.failures.len(),
                        "Cycle completed"
                    ),
                    Ok(_) => {}
                    // Already logged with block context; retried next tick
                    Err(e) => error!(error = %e, "Cycle failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!(calls = wallet.submitted_calls().len(), "Deposit guardian stopped");
    Ok(())
}
