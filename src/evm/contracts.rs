//! Call builders and decoders for the staking contract and its token.
//! Method names, argument order and field order follow the deployed ABI.

use super::abi::{self, Token};
use super::address::Address;
use crate::error::{Result, StakingError};

pub const GET_USER_DETAILS: &str = "getUserDetails(address)";
pub const TOTAL_STAKED: &str = "totalStaked()";
pub const CURRENT_REWARD_RATE: &str = "currentRewardRate()";
pub const INITIAL_APR: &str = "initialApr()";
pub const EMERGENCY_WITHDRAW_PENALTY: &str = "emergencyWithdrawPenalty()";
pub const MIN_LOCK_DURATION: &str = "minLockDuration()";
pub const STAKE: &str = "stake(uint256)";
pub const WITHDRAW: &str = "withdraw(uint256)";
pub const CLAIM_REWARDS: &str = "claimRewards()";
pub const EMERGENCY_WITHDRAW: &str = "emergencyWithdraw()";
pub const STAKED_EVENT: &str = "Staked(address,uint256,uint256,uint256,uint256)";

pub const SYMBOL: &str = "symbol()";
pub const NAME: &str = "name()";
pub const BALANCE_OF: &str = "balanceOf(address)";
pub const ALLOWANCE: &str = "allowance(address,address)";
pub const APPROVE: &str = "approve(address,uint256)";

/// A wallet's stake as reported by `getUserDetails`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserPosition {
    pub staked_amount: u128,
    pub pending_rewards: u128,
    pub can_withdraw: bool,
    pub time_until_unlock: u64,
}

/// Decoded `Staked` log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakedEvent {
    pub user: Address,
    pub amount: u128,
    pub timestamp: u64,
    pub new_total_staked: u128,
    pub current_reward_rate: u128,
    pub block_number: Option<u64>,
}

/// Zero-argument view calls share one builder.
pub fn view(signature: &str) -> Vec<u8> {
    abi::encode_call(signature, &[])
}

pub fn get_user_details(user: &Address) -> Vec<u8> {
    abi::encode_call(GET_USER_DETAILS, &[Token::Address(*user)])
}

pub fn stake(amount: u128) -> Vec<u8> {
    abi::encode_call(STAKE, &[Token::Uint(amount)])
}

pub fn withdraw(amount: u128) -> Vec<u8> {
    abi::encode_call(WITHDRAW, &[Token::Uint(amount)])
}

pub fn claim_rewards() -> Vec<u8> {
    abi::encode_call(CLAIM_REWARDS, &[])
}

pub fn emergency_withdraw() -> Vec<u8> {
    abi::encode_call(EMERGENCY_WITHDRAW, &[])
}

pub fn balance_of(owner: &Address) -> Vec<u8> {
    abi::encode_call(BALANCE_OF, &[Token::Address(*owner)])
}

pub fn allowance(owner: &Address, spender: &Address) -> Vec<u8> {
    abi::encode_call(ALLOWANCE, &[Token::Address(*owner), Token::Address(*spender)])
}

pub fn approve(spender: &Address, amount: u128) -> Vec<u8> {
    abi::encode_call(APPROVE, &[Token::Address(*spender), Token::Uint(amount)])
}

pub fn decode_user_details(data: &[u8]) -> Result<UserPosition> {
    Ok(UserPosition {
        staked_amount: abi::decode_uint(data, 0)?,
        pending_rewards: abi::decode_uint(data, 1)?,
        can_withdraw: abi::decode_bool(data, 2)?,
        time_until_unlock: abi::decode_u64(data, 3)?,
    })
}

/// Decodes a `Staked` log. `user` may be indexed (second topic) or sit in
/// the data section; both layouts are accepted.
pub fn decode_staked_log(topics: &[String], data: &[u8], block_number: Option<u64>) -> Result<StakedEvent> {
    let expected = abi::event_topic(STAKED_EVENT);
    match topics.first() {
        Some(topic0) if topic0.eq_ignore_ascii_case(&expected) => {}
        _ => return Err(StakingError::Decode("not a Staked log".to_string())),
    }

    let (user, first) = match topics.get(1) {
        Some(indexed) => (abi::decode_address(&abi::decode_payload(indexed)?, 0)?, 0),
        None => (abi::decode_address(data, 0)?, 1),
    };

    Ok(StakedEvent {
        user,
        amount: abi::decode_uint(data, first)?,
        timestamp: abi::decode_u64(data, first + 1)?,
        new_total_staked: abi::decode_uint(data, first + 2)?,
        current_reward_rate: abi::decode_uint(data, first + 3)?,
        block_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::address::encode_hex;
    use pretty_assertions::assert_eq;

    fn uint_word(v: u128) -> Vec<u8> {
        abi::encode_word(&Token::Uint(v)).to_vec()
    }

    fn user() -> Address {
        "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
    }

    #[test]
    fn user_details_decode_in_abi_order() {
        let mut data = uint_word(5_000_000_000_000_000_000);
        data.extend(uint_word(12_345));
        data.extend(uint_word(0));
        data.extend(uint_word(3600));
        assert_eq!(
            decode_user_details(&data).unwrap(),
            UserPosition {
                staked_amount: 5_000_000_000_000_000_000,
                pending_rewards: 12_345,
                can_withdraw: false,
                time_until_unlock: 3600,
            }
        );
        assert!(decode_user_details(&data[..96]).is_err());
    }

    #[test]
    fn write_calls_carry_amount() {
        let data = stake(7);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &abi::selector(STAKE));
        assert_eq!(data[35], 7);
        assert_eq!(withdraw(1).len(), 36);
        assert_eq!(claim_rewards().len(), 4);
        assert_eq!(emergency_withdraw().len(), 4);
        assert_eq!(encode_hex(&approve(&user(), 0)[..4]), "0x095ea7b3");
    }

    #[test]
    fn staked_log_with_indexed_user() {
        let topics = vec![
            abi::event_topic(STAKED_EVENT),
            encode_hex(&abi::encode_word(&Token::Address(user()))),
        ];
        let mut data = uint_word(10);
        data.extend(uint_word(1_700_000_000));
        data.extend(uint_word(510));
        data.extend(uint_word(800));
        let event = decode_staked_log(&topics, &data, Some(99)).unwrap();
        assert_eq!(event.user, user());
        assert_eq!(event.amount, 10);
        assert_eq!(event.timestamp, 1_700_000_000);
        assert_eq!(event.new_total_staked, 510);
        assert_eq!(event.current_reward_rate, 800);
        assert_eq!(event.block_number, Some(99));
    }

    #[test]
    fn staked_log_with_user_in_data() {
        let topics = vec![abi::event_topic(STAKED_EVENT)];
        let mut data = abi::encode_word(&Token::Address(user())).to_vec();
        data.extend(uint_word(10));
        data.extend(uint_word(1_700_000_000));
        data.extend(uint_word(510));
        data.extend(uint_word(800));
        let event = decode_staked_log(&topics, &data, None).unwrap();
        assert_eq!(event.user, user());
        assert_eq!(event.new_total_staked, 510);
    }

    #[test]
    fn foreign_log_is_rejected() {
        let topics = vec![abi::event_topic("Transfer(address,address,uint256)")];
        assert!(decode_staked_log(&topics, &[], None).is_err());
        assert!(decode_staked_log(&[], &[], None).is_err());
    }
}
