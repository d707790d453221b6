//! Typed reads against the staking contract and its token.

use crate::config::AppConfig;
use crate::error::Result;
use crate::evm::abi;
use crate::evm::contracts::{self, StakedEvent, UserPosition};
use crate::evm::Address;
use crate::rpc::{parse_quantity, RpcClient};

#[derive(Clone, Debug, PartialEq)]
pub struct StakingReader {
    rpc: RpcClient,
    staking: Address,
    token: Address,
}

impl StakingReader {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            rpc: RpcClient::new(config.rpc_url.clone()),
            staking: config.staking_contract,
            token: config.staking_token,
        }
    }

    async fn staking_uint(&self, signature: &str) -> Result<u128> {
        let data = self.rpc.call(&self.staking, &contracts::view(signature)).await?;
        abi::decode_uint(&data, 0)
    }

    pub async fn user_details(&self, user: &Address) -> Result<UserPosition> {
        let data = self
            .rpc
            .call(&self.staking, &contracts::get_user_details(user))
            .await?;
        contracts::decode_user_details(&data)
    }

    pub async fn total_staked(&self) -> Result<u128> {
        self.staking_uint(contracts::TOTAL_STAKED).await
    }

    pub async fn current_reward_rate(&self) -> Result<u128> {
        self.staking_uint(contracts::CURRENT_REWARD_RATE).await
    }

    pub async fn initial_apr(&self) -> Result<u128> {
        self.staking_uint(contracts::INITIAL_APR).await
    }

    pub async fn emergency_withdraw_penalty(&self) -> Result<u128> {
        self.staking_uint(contracts::EMERGENCY_WITHDRAW_PENALTY).await
    }

    pub async fn min_lock_duration(&self) -> Result<u64> {
        let data = self
            .rpc
            .call(&self.staking, &contracts::view(contracts::MIN_LOCK_DURATION))
            .await?;
        abi::decode_u64(&data, 0)
    }

    pub async fn token_symbol(&self) -> Result<String> {
        let data = self.rpc.call(&self.token, &contracts::view(contracts::SYMBOL)).await?;
        abi::decode_string(&data)
    }

    pub async fn token_name(&self) -> Result<String> {
        let data = self.rpc.call(&self.token, &contracts::view(contracts::NAME)).await?;
        abi::decode_string(&data)
    }

    pub async fn balance_of(&self, owner: &Address) -> Result<u128> {
        let data = self.rpc.call(&self.token, &contracts::balance_of(owner)).await?;
        abi::decode_uint(&data, 0)
    }

    /// How much the staking contract may pull from `owner`.
    pub async fn allowance(&self, owner: &Address) -> Result<u128> {
        let data = self
            .rpc
            .call(&self.token, &contracts::allowance(owner, &self.staking))
            .await?;
        abi::decode_uint(&data, 0)
    }

    pub async fn latest_block(&self) -> Result<u64> {
        self.rpc.block_number().await
    }

    /// `Staked` events in `from..=to`, in log order. Logs that fail to
    /// decode are skipped with a warning.
    pub async fn staked_events(&self, from: u64, to: u64) -> Result<Vec<StakedEvent>> {
        let topic = abi::event_topic(contracts::STAKED_EVENT);
        let logs = self.rpc.get_logs(&self.staking, &topic, from, to).await?;
        let mut events = Vec::with_capacity(logs.len());
        for log_entry in logs {
            let block = log_entry
                .block_number
                .as_deref()
                .and_then(|b| parse_quantity(b).ok());
            let decoded = abi::decode_payload(&log_entry.data)
                .and_then(|data| contracts::decode_staked_log(&log_entry.topics, &data, block));
            match decoded {
                Ok(event) => events.push(event),
                Err(e) => log::warn!("Skipping Staked log: {}", e),
            }
        }
        Ok(events)
    }
}
