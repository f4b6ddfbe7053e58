//! # Startup Checks
//!
//! Runs once before the first cycle. Signing with the wrong network's
//! deposit domain or against a registry API this build does not speak
//! would produce unsafe attestations, so both failures are fatal.

use crate::error::{GuardianError, GuardianResult};
use dg_01_deposit_verification::DepositSignatureVerifier;
use dg_02_block_snapshot::{RegistryReader, RegistryService, SigningKeyEventSource};
use tracing::info;

/// Major component of a `major.minor.patch` version, with an optional `v`.
pub fn major_version(version: &str) -> Option<u64> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
}

/// Fail unless `version` has the expected major component.
pub fn check_registry_version(version: &str, expected_major: u64) -> GuardianResult<()> {
    match major_version(version) {
        Some(major) if major == expected_major => Ok(()),
        _ => Err(GuardianError::VersionMismatch {
            expected: expected_major,
            actual: version.to_string(),
        }),
    }
}

/// Check the registry version and build the network's deposit verifier.
///
/// # Errors
/// * `VersionMismatch` if the registry speaks another major version
/// * `UnsupportedChain` if the chain id has no known genesis fork version
/// * `Snapshot` if the status read fails
pub async fn verify_network<R, S>(
    registry: &RegistryService<R, S>,
    expected_major: u64,
) -> GuardianResult<DepositSignatureVerifier>
where
    R: RegistryReader,
    S: SigningKeyEventSource,
{
    let status = registry.status().await?;
    check_registry_version(&status.version, expected_major)?;

    let verifier = DepositSignatureVerifier::for_chain(status.chain_id)
        .map_err(|_| GuardianError::UnsupportedChain(status.chain_id))?;

    info!(
        chain_id = status.chain_id,
        registry_version = %status.version,
        fork_version = %hex::encode(verifier.fork_version()),
        "Network verified"
    );
    Ok(verifier)
}
