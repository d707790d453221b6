pub mod actions;
pub mod contract_data;
pub mod total_staked;
pub mod write;

pub use actions::{
    use_claim_rewards, use_emergency_withdraw, use_stake, use_token_approval, use_withdraw,
};
pub use contract_data::{use_contract_data, ContractData};
pub use total_staked::use_live_total_staked;
pub use write::{TxPhase, TxStatus};
