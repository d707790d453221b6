//! What the dashboard lets the user do right now, derived from the latest
//! cached chain state and the form inputs. Nothing in here touches the
//! network; a rejected action never leaves the browser.

use crate::error::{Result, StakingError};
use crate::evm::UserPosition;
use crate::format::{
    format_time_remaining, format_token_amount, format_units, format_units_floor,
    format_units_rounded, parse_units, DISPLAY_DECIMALS,
};
use crate::session::ActionKind;

const PROCESSING: &str = "Processing...";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonState {
    pub enabled: bool,
    pub label: String,
}

impl ButtonState {
    fn enabled(label: impl Into<String>) -> Self {
        Self {
            enabled: true,
            label: label.into(),
        }
    }

    fn disabled(label: impl Into<String>) -> Self {
        Self {
            enabled: false,
            label: label.into(),
        }
    }
}

/// Inputs to every gating decision.
#[derive(Clone, Debug)]
pub struct DashboardSnapshot<'a> {
    pub connected: bool,
    pub token_decimals: u8,
    pub symbol: &'a str,
    pub balance: Option<u128>,
    pub allowance: Option<u128>,
    pub position: Option<UserPosition>,
    pub stake_input: &'a str,
    pub withdraw_input: &'a str,
    pub in_flight: Option<ActionKind>,
    /// Amount covered by an approval confirmed in this session.
    pub approved_this_session: Option<u128>,
    /// The cached allowance is missing or a refetch is outstanding.
    pub allowance_pending: bool,
}

impl DashboardSnapshot<'_> {
    pub fn busy(&self) -> bool {
        self.in_flight.is_some()
    }

    fn staked(&self) -> u128 {
        self.position.map(|p| p.staked_amount).unwrap_or(0)
    }

    fn pending_rewards(&self) -> u128 {
        self.position.map(|p| p.pending_rewards).unwrap_or(0)
    }

    fn busy_label(&self, kind: ActionKind, idle: String) -> ButtonState {
        if self.in_flight == Some(kind) {
            ButtonState::disabled(PROCESSING)
        } else {
            ButtonState::disabled(idle)
        }
    }
}

/// True when the allowance is unknown, the amount does not parse, or the
/// allowance falls short of the amount.
pub fn needs_approval(amount: &str, allowance: Option<u128>, decimals: u8) -> bool {
    let Some(allowance) = allowance else {
        return true;
    };
    match parse_units(amount, decimals) {
        Ok(amount) => allowance < amount,
        Err(_) => true,
    }
}

fn positive_amount(input: &str, decimals: u8) -> Result<u128> {
    match parse_units(input, decimals)? {
        0 => Err(StakingError::NonPositiveAmount),
        amount => Ok(amount),
    }
}

pub fn validate_approve(s: &DashboardSnapshot<'_>) -> Result<u128> {
    if !s.connected {
        return Err(StakingError::WalletNotConnected);
    }
    positive_amount(s.stake_input, s.token_decimals)
}

pub fn validate_stake(s: &DashboardSnapshot<'_>) -> Result<u128> {
    if !s.connected {
        return Err(StakingError::WalletNotConnected);
    }
    let amount = positive_amount(s.stake_input, s.token_decimals)?;
    let balance = match s.balance {
        None | Some(0) => return Err(StakingError::NoBalance),
        Some(b) => b,
    };
    if amount > balance {
        return Err(StakingError::InsufficientBalance);
    }
    if approval_outstanding(s, amount) {
        return Err(StakingError::ApprovalRequired);
    }
    Ok(amount)
}

/// A session approval only stands in for the allowance until the refetch
/// lands, and only for amounts it covers.
fn approval_outstanding(s: &DashboardSnapshot<'_>, amount: u128) -> bool {
    if !needs_approval(s.stake_input, s.allowance, s.token_decimals) {
        return false;
    }
    let covered = s.allowance_pending && s.approved_this_session.is_some_and(|approved| approved >= amount);
    !covered
}

/// The request may exceed neither the rounded figure on screen nor the
/// on-chain stake.
pub fn validate_withdraw(s: &DashboardSnapshot<'_>) -> Result<u128> {
    if !s.connected {
        return Err(StakingError::WalletNotConnected);
    }
    let amount = positive_amount(s.withdraw_input, s.token_decimals)?;
    let staked = s.staked();
    if staked == 0 {
        return Err(StakingError::NoStake);
    }
    let displayed = parse_units(
        &format_units_rounded(staked, s.token_decimals, DISPLAY_DECIMALS),
        s.token_decimals,
    )?;
    if amount > displayed.min(staked) {
        return Err(StakingError::ExceedsStake);
    }
    if let Some(position) = s.position {
        if !position.can_withdraw {
            return Err(StakingError::Locked(format_time_remaining(Some(position.time_until_unlock))));
        }
    }
    Ok(amount)
}

pub fn validate_claim(s: &DashboardSnapshot<'_>) -> Result<()> {
    if !s.connected {
        return Err(StakingError::WalletNotConnected);
    }
    if s.pending_rewards() == 0 {
        return Err(StakingError::NoRewards);
    }
    Ok(())
}

/// Not gated on lock status.
pub fn validate_emergency(s: &DashboardSnapshot<'_>) -> Result<()> {
    if !s.connected {
        return Err(StakingError::WalletNotConnected);
    }
    if s.staked() == 0 {
        return Err(StakingError::NoStake);
    }
    Ok(())
}

/// The approve button only shows while the typed stake is not covered.
pub fn show_approve(s: &DashboardSnapshot<'_>) -> bool {
    s.connected
        && positive_amount(s.stake_input, s.token_decimals).is_ok()
        && needs_approval(s.stake_input, s.allowance, s.token_decimals)
}

pub fn approve_button(s: &DashboardSnapshot<'_>) -> ButtonState {
    let label = format!("Approve {}", s.symbol);
    if s.busy() {
        return s.busy_label(ActionKind::Approve, label);
    }
    match validate_approve(s) {
        Ok(_) => ButtonState::enabled(label),
        Err(_) => ButtonState::disabled(label),
    }
}

pub fn stake_button(s: &DashboardSnapshot<'_>) -> ButtonState {
    if !s.connected {
        return ButtonState::disabled("Connect wallet");
    }
    if matches!(s.balance, None | Some(0)) {
        return ButtonState::disabled(format!("Get {} to stake", s.symbol));
    }
    let label = format!("Stake {}", s.symbol);
    if s.busy() {
        return s.busy_label(ActionKind::Stake, label);
    }
    match validate_stake(s) {
        Ok(_) => ButtonState::enabled(label),
        Err(StakingError::ApprovalRequired) => ButtonState::disabled("Approve first"),
        Err(StakingError::InsufficientBalance) => ButtonState::disabled("Insufficient balance"),
        Err(_) => ButtonState::disabled(label),
    }
}

pub fn withdraw_button(s: &DashboardSnapshot<'_>) -> ButtonState {
    if !s.connected {
        return ButtonState::disabled("Connect wallet");
    }
    let Some(position) = s.position.filter(|p| p.staked_amount > 0) else {
        return ButtonState::disabled("Nothing staked");
    };
    if !position.can_withdraw {
        return ButtonState::disabled(format!(
            "Locked · {}",
            format_time_remaining(Some(position.time_until_unlock))
        ));
    }
    let label = "Withdraw".to_string();
    if s.busy() {
        return s.busy_label(ActionKind::Withdraw, label);
    }
    match validate_withdraw(s) {
        Ok(_) => ButtonState::enabled(label),
        Err(StakingError::ExceedsStake) => ButtonState::disabled("Exceeds staked amount"),
        Err(_) => ButtonState::disabled(label),
    }
}

pub fn claim_button(s: &DashboardSnapshot<'_>) -> ButtonState {
    if !s.connected {
        return ButtonState::disabled("Connect wallet");
    }
    let rewards = s.pending_rewards();
    if rewards == 0 {
        return ButtonState::disabled("No rewards to claim");
    }
    let label = format!(
        "Claim {} {}",
        format_token_amount(Some(rewards), s.token_decimals),
        s.symbol
    );
    if s.busy() {
        return s.busy_label(ActionKind::Claim, label);
    }
    ButtonState::enabled(label)
}

pub fn emergency_button(s: &DashboardSnapshot<'_>) -> ButtonState {
    let label = "Emergency Withdraw All".to_string();
    if s.busy() {
        return s.busy_label(ActionKind::EmergencyWithdraw, label);
    }
    match validate_emergency(s) {
        Ok(()) => ButtonState::enabled(label),
        Err(_) => ButtonState::disabled(label),
    }
}

/// Whole balance, exact.
pub fn max_stake(s: &DashboardSnapshot<'_>) -> String {
    format_units(s.balance.unwrap_or(0), s.token_decimals)
}

/// Stake truncated to display precision so it never exceeds either the
/// on-chain amount or the figure on screen.
pub fn max_withdraw(s: &DashboardSnapshot<'_>) -> String {
    format_units_floor(s.staked(), s.token_decimals, DISPLAY_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ONE: u128 = 1_000_000_000_000_000_000;

    fn position(staked: u128, rewards: u128, can_withdraw: bool, unlock_in: u64) -> UserPosition {
        UserPosition {
            staked_amount: staked,
            pending_rewards: rewards,
            can_withdraw,
            time_until_unlock: unlock_in,
        }
    }

    fn snapshot() -> DashboardSnapshot<'static> {
        DashboardSnapshot {
            connected: true,
            token_decimals: 18,
            symbol: "STK",
            balance: Some(100 * ONE),
            allowance: Some(0),
            position: Some(position(10 * ONE, 0, true, 0)),
            stake_input: "",
            withdraw_input: "",
            in_flight: None,
            approved_this_session: None,
            allowance_pending: false,
        }
    }

    #[test]
    fn needs_approval_predicate() {
        assert!(needs_approval("1", None, 18));
        assert!(needs_approval("1", Some(ONE - 1), 18));
        assert!(!needs_approval("1", Some(ONE), 18));
        assert!(!needs_approval("0.5", Some(ONE), 18));
        assert!(needs_approval("", Some(u128::MAX), 18));
        assert!(needs_approval("abc", Some(u128::MAX), 18));
        assert!(needs_approval("1.0000000000000000001", Some(u128::MAX), 18));
    }

    #[test]
    fn stake_validation_order() {
        let mut s = snapshot();
        assert_eq!(validate_stake(&s), Err(StakingError::EmptyAmount));
        s.stake_input = "abc";
        assert_eq!(validate_stake(&s), Err(StakingError::InvalidAmount));
        s.stake_input = "1.5x";
        assert_eq!(validate_stake(&s), Err(StakingError::InvalidAmount));
        s.stake_input = "1.5.2";
        assert_eq!(validate_stake(&s), Err(StakingError::InvalidAmount));
        s.stake_input = "0";
        assert_eq!(validate_stake(&s), Err(StakingError::NonPositiveAmount));
        s.stake_input = "101";
        assert_eq!(validate_stake(&s), Err(StakingError::InsufficientBalance));
        s.stake_input = "5";
        assert_eq!(validate_stake(&s), Err(StakingError::ApprovalRequired));
        s.allowance = Some(5 * ONE);
        assert_eq!(validate_stake(&s), Ok(5 * ONE));
    }

    #[test]
    fn session_approval_covers_stake_until_allowance_refetched() {
        let s = DashboardSnapshot {
            stake_input: "5",
            approved_this_session: Some(5 * ONE),
            allowance_pending: true,
            ..snapshot()
        };
        assert_eq!(validate_stake(&s), Ok(5 * ONE));

        let larger = DashboardSnapshot {
            stake_input: "10",
            ..s.clone()
        };
        assert_eq!(validate_stake(&larger), Err(StakingError::ApprovalRequired));
    }

    #[test]
    fn fresh_allowance_below_amount_blocks_despite_session_approval() {
        let s = DashboardSnapshot {
            stake_input: "10",
            allowance: Some(5 * ONE),
            approved_this_session: Some(5 * ONE),
            ..snapshot()
        };
        assert_eq!(validate_stake(&s), Err(StakingError::ApprovalRequired));
        assert!(show_approve(&s));
        assert_eq!(stake_button(&s), ButtonState::disabled("Approve first"));

        let settled_larger = DashboardSnapshot {
            approved_this_session: Some(u128::MAX),
            ..s
        };
        assert_eq!(validate_stake(&settled_larger), Err(StakingError::ApprovalRequired));
    }

    #[test]
    fn approve_shows_only_when_needed() {
        let s = DashboardSnapshot {
            stake_input: "5",
            ..snapshot()
        };
        assert!(show_approve(&s));
        assert_eq!(approve_button(&s), ButtonState::enabled("Approve STK"));
        let covered = DashboardSnapshot {
            allowance: Some(5 * ONE),
            ..s.clone()
        };
        assert!(!show_approve(&covered));
        let empty = DashboardSnapshot {
            stake_input: "",
            ..s
        };
        assert!(!show_approve(&empty));
    }

    #[test]
    fn zero_balance_disables_stake_regardless_of_input() {
        for input in ["", "1", "1000", "abc"] {
            let s = DashboardSnapshot {
                balance: Some(0),
                allowance: Some(u128::MAX),
                stake_input: input,
                ..snapshot()
            };
            assert_eq!(stake_button(&s), ButtonState::disabled("Get STK to stake"));
        }
        let s = DashboardSnapshot {
            balance: None,
            stake_input: "1",
            ..snapshot()
        };
        assert_eq!(stake_button(&s), ButtonState::disabled("Get STK to stake"));
        assert_eq!(validate_stake(&s), Err(StakingError::NoBalance));
    }

    #[test]
    fn stake_button_labels() {
        let s = DashboardSnapshot {
            stake_input: "5",
            ..snapshot()
        };
        assert_eq!(stake_button(&s), ButtonState::disabled("Approve first"));
        let s = DashboardSnapshot {
            allowance: Some(u128::MAX),
            ..s
        };
        assert_eq!(stake_button(&s), ButtonState::enabled("Stake STK"));
        let s = DashboardSnapshot {
            connected: false,
            ..s
        };
        assert_eq!(stake_button(&s), ButtonState::disabled("Connect wallet"));
    }

    #[test]
    fn locked_position_disables_withdraw_with_remaining_time() {
        let s = DashboardSnapshot {
            position: Some(position(10 * ONE, 0, false, 3600)),
            withdraw_input: "1",
            ..snapshot()
        };
        let button = withdraw_button(&s);
        assert!(!button.enabled);
        assert_eq!(button.label, "Locked · 1h 0m");
        assert_eq!(validate_withdraw(&s), Err(StakingError::Locked("1h 0m".to_string())));
    }

    #[test]
    fn withdraw_checks_against_displayed_stake() {
        // 1.23454 staked, shown as 1.2345
        let staked = 1_234_540_000_000_000_000;
        let mut s = DashboardSnapshot {
            position: Some(position(staked, 0, true, 0)),
            withdraw_input: "1.2345",
            ..snapshot()
        };
        assert_eq!(validate_withdraw(&s), Ok(1_234_500_000_000_000_000));
        assert!(withdraw_button(&s).enabled);

        // Valid on chain, but above what the screen shows.
        s.withdraw_input = "1.23454";
        assert_eq!(validate_withdraw(&s), Err(StakingError::ExceedsStake));
        assert_eq!(withdraw_button(&s), ButtonState::disabled("Exceeds staked amount"));

        s.withdraw_input = "2";
        assert_eq!(validate_withdraw(&s), Err(StakingError::ExceedsStake));

        // Too close to the display for a float comparison to notice.
        s.position = Some(position(ONE / 10, 0, true, 0));
        s.withdraw_input = "0.100000000000000001";
        assert_eq!(validate_withdraw(&s), Err(StakingError::ExceedsStake));
        s.withdraw_input = "0.1";
        assert_eq!(validate_withdraw(&s), Ok(ONE / 10));

        // Rounded up on screen: the on-chain stake still caps the request.
        s.position = Some(position(1_234_560_000_000_000_000, 0, true, 0));
        s.withdraw_input = "1.2346";
        assert_eq!(validate_withdraw(&s), Err(StakingError::ExceedsStake));
        s.withdraw_input = "";
        assert_eq!(validate_withdraw(&s), Err(StakingError::EmptyAmount));
        s.withdraw_input = "-1";
        assert_eq!(validate_withdraw(&s), Err(StakingError::NonPositiveAmount));
    }

    #[test]
    fn withdraw_without_stake() {
        let s = DashboardSnapshot {
            position: Some(position(0, 0, true, 0)),
            withdraw_input: "1",
            ..snapshot()
        };
        assert_eq!(validate_withdraw(&s), Err(StakingError::NoStake));
        assert_eq!(withdraw_button(&s), ButtonState::disabled("Nothing staked"));
    }

    #[test]
    fn claim_tracks_pending_rewards() {
        let s = snapshot();
        assert_eq!(claim_button(&s), ButtonState::disabled("No rewards to claim"));
        assert_eq!(validate_claim(&s), Err(StakingError::NoRewards));

        let s = DashboardSnapshot {
            position: Some(position(10 * ONE, ONE + ONE / 4, false, 100)),
            ..snapshot()
        };
        assert_eq!(claim_button(&s), ButtonState::enabled("Claim 1.25 STK"));
        assert_eq!(validate_claim(&s), Ok(()));
    }

    #[test]
    fn emergency_ignores_lock() {
        let s = DashboardSnapshot {
            position: Some(position(10 * ONE, 0, false, 86_400)),
            ..snapshot()
        };
        assert!(emergency_button(&s).enabled);
        assert_eq!(validate_emergency(&s), Ok(()));

        let s = DashboardSnapshot {
            position: Some(position(0, 0, false, 86_400)),
            ..snapshot()
        };
        assert!(!emergency_button(&s).enabled);
        assert_eq!(validate_emergency(&s), Err(StakingError::NoStake));
    }

    #[test]
    fn everything_disabled_while_busy() {
        let s = DashboardSnapshot {
            position: Some(position(10 * ONE, ONE, true, 0)),
            allowance: Some(u128::MAX),
            stake_input: "1",
            withdraw_input: "1",
            in_flight: Some(ActionKind::Claim),
            ..snapshot()
        };
        assert!(!stake_button(&s).enabled);
        assert!(!withdraw_button(&s).enabled);
        assert!(!approve_button(&s).enabled);
        assert!(!emergency_button(&s).enabled);
        assert_eq!(claim_button(&s), ButtonState::disabled("Processing..."));
        assert_eq!(stake_button(&s).label, "Stake STK");
    }

    #[test]
    fn max_helpers() {
        let s = DashboardSnapshot {
            balance: Some(ONE + 1),
            position: Some(position(1_234_560_000_000_000_000, 0, true, 0)),
            ..snapshot()
        };
        assert_eq!(max_stake(&s), "1.000000000000000001");
        assert_eq!(max_withdraw(&s), "1.2345");
    }

    #[test]
    fn disconnected_rejects_everything() {
        let s = DashboardSnapshot {
            connected: false,
            stake_input: "1",
            withdraw_input: "1",
            ..snapshot()
        };
        assert_eq!(validate_stake(&s), Err(StakingError::WalletNotConnected));
        assert_eq!(validate_withdraw(&s), Err(StakingError::WalletNotConnected));
        assert_eq!(validate_claim(&s), Err(StakingError::WalletNotConnected));
        assert_eq!(validate_emergency(&s), Err(StakingError::WalletNotConnected));
        assert_eq!(validate_approve(&s), Err(StakingError::WalletNotConnected));
    }
}
