use crate::error::{Result, StakingError};
use crate::evm::Address;

pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;
pub const DEFAULT_POLL_MS: u32 = 4_000;
/// How long the advisory banner stays up.
pub const NOTICE_TIMEOUT_MS: u32 = 5_000;

/// Deployment settings, fixed at build time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub staking_contract: Address,
    pub staking_token: Address,
    pub rpc_url: String,
    pub token_decimals: u8,
    pub poll_ms: u32,
}

/// Raw values as they arrive from the build environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawConfig<'a> {
    pub staking_contract: Option<&'a str>,
    pub staking_token: Option<&'a str>,
    pub rpc_url: Option<&'a str>,
    pub token_decimals: Option<&'a str>,
    pub poll_ms: Option<&'a str>,
}

impl AppConfig {
    /// Reads `STAKING_CONTRACT`, `STAKING_TOKEN`, `STAKING_RPC_URL`,
    /// `STAKING_TOKEN_DECIMALS` and `STAKING_POLL_MS` as set when the
    /// bundle was built.
    pub fn from_build_env() -> Result<Self> {
        Self::from_raw(RawConfig {
            staking_contract: option_env!("STAKING_CONTRACT"),
            staking_token: option_env!("STAKING_TOKEN"),
            rpc_url: option_env!("STAKING_RPC_URL"),
            token_decimals: option_env!("STAKING_TOKEN_DECIMALS"),
            poll_ms: option_env!("STAKING_POLL_MS"),
        })
    }

    pub fn from_raw(raw: RawConfig<'_>) -> Result<Self> {
        let staking_contract = required_address("STAKING_CONTRACT", raw.staking_contract)?;
        let staking_token = required_address("STAKING_TOKEN", raw.staking_token)?;

        let rpc_url = match non_empty(raw.rpc_url) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
            Some(url) => {
                return Err(StakingError::Config(format!(
                    "STAKING_RPC_URL must be an http(s) URL, got {}",
                    url
                )))
            }
            None => DEFAULT_RPC_URL.to_string(),
        };

        let token_decimals = match non_empty(raw.token_decimals) {
            Some(v) => v
                .parse::<u8>()
                .ok()
                .filter(|d| *d <= 36)
                .ok_or_else(|| StakingError::Config(format!("STAKING_TOKEN_DECIMALS is invalid: {}", v)))?,
            None => DEFAULT_TOKEN_DECIMALS,
        };

        let poll_ms = match non_empty(raw.poll_ms) {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| StakingError::Config(format!("STAKING_POLL_MS is invalid: {}", v)))?,
            None => DEFAULT_POLL_MS,
        };

        Ok(Self {
            staking_contract,
            staking_token,
            rpc_url,
            token_decimals,
            poll_ms,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required_address(name: &str, value: Option<&str>) -> Result<Address> {
    let value = non_empty(value).ok_or_else(|| StakingError::Config(format!("{} is not set", name)))?;
    value
        .parse()
        .map_err(|e| StakingError::Config(format!("{}: {}", name, e)))
}
