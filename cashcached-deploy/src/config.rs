//! Configuration loading from environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DeployError;

pub const OWNER_ADDRESS_VAR: &str = "CASHCACHED_OWNER_ADDRESS";

/// A 20-byte account address written as `0x` + 40 hex digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DeployError::InvalidAddress(s.to_string());
        let digits = s
            .trim()
            .strip_prefix("0x")
            .or_else(|| s.trim().strip_prefix("0X"))
            .ok_or_else(invalid)?;
        if digits.len() != 40 {
            return Err(invalid());
        }
        let bytes = hex::decode(digits).map_err(|_| invalid())?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Deployment configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub owner: Address,
    pub deployer: Address,
    pub rpc_url: String,
    pub artifact_path: PathBuf,
    pub receipt_poll_interval: Duration,
    pub receipt_poll_attempts: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, DeployError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DeployError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let owner: Address = get(OWNER_ADDRESS_VAR)
            .ok_or(DeployError::MissingEnv(OWNER_ADDRESS_VAR))?
            .parse()?;

        let deployer = match get("CASHCACHED_DEPLOYER_ADDRESS") {
            Some(addr) => addr.parse()?,
            None => owner.clone(),
        };

        let rpc_url = get("CASHCACHED_RPC_URL").unwrap_or_else(|| "http://127.0.0.1:8545".to_string());

        let artifact_path = get("CASHCACHED_ARTIFACT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("artifacts/CashCached.json"));

        let poll_ms: u64 = parse_or(get("CASHCACHED_RECEIPT_POLL_MS"), "CASHCACHED_RECEIPT_POLL_MS", 1000)?;
        let receipt_poll_attempts: u32 =
            parse_or(get("CASHCACHED_RECEIPT_POLL_ATTEMPTS"), "CASHCACHED_RECEIPT_POLL_ATTEMPTS", 60)?;
        // The creation transaction is only sent when its receipt can be polled.
        if receipt_poll_attempts == 0 {
            return Err(DeployError::InvalidEnv {
                key: "CASHCACHED_RECEIPT_POLL_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            owner,
            deployer,
            rpc_url,
            artifact_path,
            receipt_poll_interval: Duration::from_millis(poll_ms),
            receipt_poll_attempts,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, DeployError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| DeployError::InvalidEnv { key, value: v }),
        None => Ok(default),
    }
}
