//! One hook per contract-mutating call. Each resolves after confirmation.

use dioxus::prelude::*;

use super::write::{use_contract_write, ContractWrite, TxStatus};
use crate::controls;
use crate::error::Result;
use crate::evm::contracts;
use crate::evm::{Address, TxHash};
use crate::format::parse_units;

#[derive(Clone, Copy, PartialEq)]
pub struct TokenApproval {
    write: ContractWrite,
}

impl TokenApproval {
    pub fn status(&self) -> TxStatus {
        self.write.status()
    }

    /// Lets the staking contract pull `amount` of the token.
    pub async fn approve_token(&self, amount: &str) -> Result<TxHash> {
        let config = self.write.config();
        let amount = parse_units(amount, config.token_decimals)?;
        self.write
            .send(config.staking_token, contracts::approve(&config.staking_contract, amount))
            .await
    }

    pub fn needs_approval(&self, amount: &str, allowance: Option<u128>) -> bool {
        controls::needs_approval(amount, allowance, self.write.config().token_decimals)
    }
}

pub fn use_token_approval(account: ReadOnlySignal<Option<Address>>) -> TokenApproval {
    TokenApproval {
        write: use_contract_write(account),
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct Stake {
    write: ContractWrite,
}

impl Stake {
    pub fn status(&self) -> TxStatus {
        self.write.status()
    }

    pub async fn stake(&self, amount: &str) -> Result<TxHash> {
        let config = self.write.config();
        let amount = parse_units(amount, config.token_decimals)?;
        self.write
            .send(config.staking_contract, contracts::stake(amount))
            .await
    }
}

pub fn use_stake(account: ReadOnlySignal<Option<Address>>) -> Stake {
    Stake {
        write: use_contract_write(account),
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct Withdraw {
    write: ContractWrite,
}

impl Withdraw {
    pub fn status(&self) -> TxStatus {
        self.write.status()
    }

    pub async fn withdraw(&self, amount: &str) -> Result<TxHash> {
        let config = self.write.config();
        let amount = parse_units(amount, config.token_decimals)?;
        self.write
            .send(config.staking_contract, contracts::withdraw(amount))
            .await
    }
}

pub fn use_withdraw(account: ReadOnlySignal<Option<Address>>) -> Withdraw {
    Withdraw {
        write: use_contract_write(account),
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct ClaimRewards {
    write: ContractWrite,
}

impl ClaimRewards {
    pub fn status(&self) -> TxStatus {
        self.write.status()
    }

    pub async fn claim_rewards(&self) -> Result<TxHash> {
        let staking = self.write.config().staking_contract;
        self.write.send(staking, contracts::claim_rewards()).await
    }
}

pub fn use_claim_rewards(account: ReadOnlySignal<Option<Address>>) -> ClaimRewards {
    ClaimRewards {
        write: use_contract_write(account),
    }
}

#[derive(Clone, Copy, PartialEq)]
pub struct EmergencyWithdraw {
    write: ContractWrite,
}

impl EmergencyWithdraw {
    pub fn status(&self) -> TxStatus {
        self.write.status()
    }

    /// Exits the whole position now, forfeiting rewards and paying the
    /// penalty.
    pub async fn emergency_withdraw(&self) -> Result<TxHash> {
        let staking = self.write.config().staking_contract;
        self.write.send(staking, contracts::emergency_withdraw()).await
    }
}

pub fn use_emergency_withdraw(account: ReadOnlySignal<Option<Address>>) -> EmergencyWithdraw {
    EmergencyWithdraw {
        write: use_contract_write(account),
    }
}
