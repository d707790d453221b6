use thiserror::Error;

use crate::evm::TxHash;

pub type Result<T> = std::result::Result<T, StakingError>;

/// Everything that can stop a dashboard action.
///
/// Validation variants are raised before anything touches the network.
/// Transaction variants come back from the wallet or the node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StakingError {
    #[error("Enter an amount")]
    EmptyAmount,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("Amount is too large")]
    AmountOverflow,

    #[error("You need tokens to stake")]
    NoBalance,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Please approve tokens before staking")]
    ApprovalRequired,

    #[error("Withdrawal exceeds your staked amount")]
    ExceedsStake,

    #[error("Tokens are locked for another {0}")]
    Locked(String),

    #[error("Nothing staked")]
    NoStake,

    #[error("No rewards to claim")]
    NoRewards,

    #[error("Connect your wallet first")]
    WalletNotConnected,

    #[error("Another transaction is still in progress")]
    ActionInFlight,

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),

    #[error("Unexpected contract response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StakingError {
    /// True for errors caught locally, before any request was sent.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            StakingError::Wallet(_)
                | StakingError::Rpc(_)
                | StakingError::Reverted(_)
                | StakingError::Decode(_)
                | StakingError::Config(_)
        )
    }
}
