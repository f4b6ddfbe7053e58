//! # Guardian Configuration
//!
//! Runtime parameters read from the environment at startup.
//!
//! ## Required
//!
//! - `GUARDIAN_WALLET_PRIVATE_KEY`: hex secp256k1 key of the guardian wallet
//! - `GUARDIAN_ATTEST_PREFIX`, `GUARDIAN_PAUSE_PREFIX`,
//!   `GUARDIAN_UNVET_PREFIX`: 32-byte message prefixes of the security
//!   contract
//!
//! Everything else has a default.

use crate::adapters::MessagePrefixes;
use dg_03_key_guard::DEFAULT_RESIGN_BLOCKS;
use shared_types::Hash;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Complete guardian configuration.
#[derive(Debug, Clone)]
pub struct GuardianConfig {
    /// Network name; also selects the message topic.
    pub network: String,
    /// Registry service major version this build speaks.
    pub registry_major_version: u64,
    /// Blocks per deposit re-signing bucket.
    pub resign_blocks: u64,
    /// Upper bound for any single external read.
    pub read_timeout: Duration,
    pub poll_interval: Duration,
    /// Deposit signature verification threads.
    pub workers: usize,
    /// Block the deposit contract was deployed at.
    pub deposit_deployment_block: u64,
    pub wallet_private_key: String,
    pub prefixes: MessagePrefixes,
    /// Chain and registry state served to the dry-run adapters.
    pub fixture_path: PathBuf,
}

impl GuardianConfig {
    /// Read the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            network: lookup("GUARDIAN_NETWORK").unwrap_or_else(|| "mainnet".to_string()),
            registry_major_version: parse_or(&lookup, "GUARDIAN_REGISTRY_MAJOR_VERSION", 1)?,
            resign_blocks: parse_or(&lookup, "GUARDIAN_RESIGN_BLOCKS", DEFAULT_RESIGN_BLOCKS)?,
            read_timeout: Duration::from_millis(parse_or(&lookup, "GUARDIAN_READ_TIMEOUT_MS", 30_000)?),
            poll_interval: Duration::from_millis(parse_or(&lookup, "GUARDIAN_POLL_INTERVAL_MS", 12_000)?),
            workers: parse_or(&lookup, "GUARDIAN_WORKERS", num_cpus::get())?,
            deposit_deployment_block: parse_or(&lookup, "GUARDIAN_DEPOSIT_DEPLOYMENT_BLOCK", 0)?,
            wallet_private_key: lookup("GUARDIAN_WALLET_PRIVATE_KEY")
                .ok_or(ConfigError::Missing("GUARDIAN_WALLET_PRIVATE_KEY"))?,
            prefixes: MessagePrefixes {
                attest: required(&lookup, "GUARDIAN_ATTEST_PREFIX")?,
                pause: required(&lookup, "GUARDIAN_PAUSE_PREFIX")?,
                unvet: required(&lookup, "GUARDIAN_UNVET_PREFIX")?,
            },
            fixture_path: lookup("GUARDIAN_FIXTURE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./fixture.json")),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                name: "GUARDIAN_WORKERS",
                reason: "must be positive".to_string(),
            });
        }
        if self.resign_blocks == 0 {
            return Err(ConfigError::Invalid {
                name: "GUARDIAN_RESIGN_BLOCKS",
                reason: "must be positive".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "GUARDIAN_POLL_INTERVAL_MS",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<Hash, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name).ok_or(ConfigError::Missing(name))?;
    raw.trim().parse().map_err(|e: shared_types::HexError| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> HashMap<&'static str, String> {
        HashMap::from([
            ("GUARDIAN_WALLET_PRIVATE_KEY", "0x01".to_string()),
            ("GUARDIAN_ATTEST_PREFIX", format!("0x{}", "11".repeat(32))),
            ("GUARDIAN_PAUSE_PREFIX", format!("0x{}", "22".repeat(32))),
            ("GUARDIAN_UNVET_PREFIX", format!("0x{}", "33".repeat(32))),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<GuardianConfig, ConfigError> {
        GuardianConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&base()).unwrap();

        assert_eq!(config.network, "mainnet");
        assert_eq!(config.resign_blocks, 50);
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert!(config.workers > 0);
        assert_eq!(config.prefixes.pause, Hash::from([0x22; 32]));
    }

    #[test]
    fn test_overrides() {
        let mut vars = base();
        vars.insert("GUARDIAN_NETWORK", "holesky".to_string());
        vars.insert("GUARDIAN_WORKERS", "3".to_string());
        vars.insert("GUARDIAN_DEPOSIT_DEPLOYMENT_BLOCK", "1000".to_string());

        let config = load(&vars).unwrap();

        assert_eq!(config.network, "holesky");
        assert_eq!(config.workers, 3);
        assert_eq!(config.deposit_deployment_block, 1000);
    }

    #[test]
    fn test_missing_wallet_key() {
        let mut vars = base();
        vars.remove("GUARDIAN_WALLET_PRIVATE_KEY");

        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("GUARDIAN_WALLET_PRIVATE_KEY")
        );
    }

    #[test]
    fn test_invalid_values() {
        let mut vars = base();
        vars.insert("GUARDIAN_WORKERS", "0".to_string());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { name: "GUARDIAN_WORKERS", .. })));

        let mut vars = base();
        vars.insert("GUARDIAN_READ_TIMEOUT_MS", "soon".to_string());
        assert!(load(&vars).is_err());

        let mut vars = base();
        vars.insert("GUARDIAN_UNVET_PREFIX", "0x1234".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { name: "GUARDIAN_UNVET_PREFIX", .. })
        ));
    }
}
