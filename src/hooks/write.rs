use dioxus::prelude::*;

use crate::config::AppConfig;
use crate::error::{Result, StakingError};
use crate::evm::{Address, TxHash};
use crate::rpc::RpcClient;
use crate::wallet::WalletAdapter;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TxPhase {
    #[default]
    Idle,
    /// Handed to the wallet, not yet acknowledged.
    Pending,
    /// Broadcast, waiting to be mined.
    Confirming,
    Confirmed,
    Failed,
}

/// Lifecycle of the most recent transaction sent through one write hook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxStatus {
    pub phase: TxPhase,
    pub hash: Option<TxHash>,
    pub error: Option<StakingError>,
}

impl TxStatus {
    pub fn pending() -> Self {
        Self {
            phase: TxPhase::Pending,
            ..Self::default()
        }
    }

    pub fn confirming(hash: TxHash) -> Self {
        Self {
            phase: TxPhase::Confirming,
            hash: Some(hash),
            error: None,
        }
    }

    pub fn confirmed(hash: TxHash) -> Self {
        Self {
            phase: TxPhase::Confirmed,
            hash: Some(hash),
            error: None,
        }
    }

    pub fn failed(hash: Option<TxHash>, error: StakingError) -> Self {
        Self {
            phase: TxPhase::Failed,
            hash,
            error: Some(error),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase == TxPhase::Pending
    }

    pub fn is_confirming(&self) -> bool {
        self.phase == TxPhase::Confirming
    }

    pub fn is_confirmed(&self) -> bool {
        self.phase == TxPhase::Confirmed
    }

    pub fn is_busy(&self) -> bool {
        self.is_pending() || self.is_confirming()
    }
}

/// Shared plumbing behind every write hook: submit through the wallet,
/// then wait for the receipt. `send` resolves only once the transaction
/// is mined; `status` tracks the steps on the way.
#[derive(Clone, Copy, PartialEq)]
pub struct ContractWrite {
    status: Signal<TxStatus>,
    account: ReadOnlySignal<Option<Address>>,
    config: Signal<AppConfig>,
}

impl ContractWrite {
    pub fn status(&self) -> TxStatus {
        self.status.read().clone()
    }

    pub fn config(&self) -> AppConfig {
        self.config.peek().clone()
    }

    pub async fn send(&self, to: Address, data: Vec<u8>) -> Result<TxHash> {
        let from = (*self.account.peek()).ok_or(StakingError::WalletNotConnected)?;
        let config = self.config();
        let rpc = RpcClient::new(config.rpc_url.clone());
        let mut status = self.status;

        status.set(TxStatus::pending());
        log::info!("Submitting transaction from {} to {}", from, to);

        let hash = match WalletAdapter::new().send_transaction(&from, &to, &data).await {
            Ok(hash) => hash,
            Err(e) => {
                log::error!("Wallet refused transaction: {}", e);
                status.set(TxStatus::failed(None, e.clone()));
                return Err(e);
            }
        };

        log::info!("Transaction {} broadcast, waiting for confirmation", hash);
        status.set(TxStatus::confirming(hash.clone()));

        match rpc.wait_for_receipt(&hash, config.poll_ms).await {
            Ok(_) => {
                status.set(TxStatus::confirmed(hash.clone()));
                Ok(hash)
            }
            Err(e) => {
                status.set(TxStatus::failed(Some(hash), e.clone()));
                Err(e)
            }
        }
    }
}

pub fn use_contract_write(account: ReadOnlySignal<Option<Address>>) -> ContractWrite {
    let config = use_context::<AppConfig>();
    ContractWrite {
        status: use_signal(TxStatus::default),
        account,
        config: use_signal(move || config),
    }
}
