//! Lifecycle of dashboard actions and the advisory banner.

use std::collections::BTreeSet;
use std::fmt;

use crate::cache::RemoteField;
use crate::error::StakingError;
use crate::evm::TxHash;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Approve,
    Stake,
    Withdraw,
    Claim,
    EmergencyWithdraw,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Approve => "Approval",
            ActionKind::Stake => "Stake",
            ActionKind::Withdraw => "Withdrawal",
            ActionKind::Claim => "Claim",
            ActionKind::EmergencyWithdraw => "Emergency withdrawal",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Banner message. The kind is fixed by whoever produces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

impl From<&StakingError> for Notice {
    fn from(err: &StakingError) -> Self {
        if err.is_validation() {
            Notice::info(err.to_string())
        } else {
            Notice::error(err.to_string())
        }
    }
}

/// Holds the latest notice. Each post bumps a generation so a delayed
/// clear only removes the notice it was scheduled for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoticeBoard {
    current: Option<Notice>,
    generation: u64,
}

impl NoticeBoard {
    pub fn post(&mut self, notice: Notice) -> u64 {
        self.generation += 1;
        self.current = Some(notice);
        self.generation
    }

    pub fn expire(&mut self, generation: u64) {
        if generation == self.generation {
            self.current = None;
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting(ActionKind),
    Confirming(ActionKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    Stake,
    Withdraw,
}

/// Everything the dashboard must do once an action settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub notice: Notice,
    pub clear_input: Option<InputField>,
    pub clear_session_approval: bool,
    pub grant_session_approval: bool,
    pub refresh: BTreeSet<RemoteField>,
}

/// Single-flight gate: at most one action between submission and
/// settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionFlight {
    phase: Phase,
}

impl Default for ActionFlight {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl ActionFlight {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn in_flight(&self) -> Option<ActionKind> {
        match self.phase {
            Phase::Idle => None,
            Phase::Submitting(kind) | Phase::Confirming(kind) => Some(kind),
        }
    }

    pub fn begin(&mut self, kind: ActionKind) -> Result<(), StakingError> {
        if self.is_busy() {
            return Err(StakingError::ActionInFlight);
        }
        self.phase = Phase::Submitting(kind);
        Ok(())
    }

    pub fn confirming(&mut self) {
        if let Phase::Submitting(kind) = self.phase {
            self.phase = Phase::Confirming(kind);
        }
    }

    /// Returns to idle and describes the follow-up work.
    pub fn settle(&mut self, kind: ActionKind, outcome: &Result<TxHash, StakingError>) -> Settlement {
        self.phase = Phase::Idle;

        let hash = match outcome {
            Ok(hash) => hash,
            Err(err) => {
                log::warn!("{} failed: {}", kind, err);
                return Settlement {
                    notice: Notice::from(err),
                    clear_input: None,
                    clear_session_approval: false,
                    grant_session_approval: false,
                    refresh: BTreeSet::new(),
                };
            }
        };

        log::info!("{} confirmed: {}", kind, hash);
        let account_fields = BTreeSet::from([RemoteField::Position, RemoteField::Balance, RemoteField::Allowance]);
        // Only Staked is followed live, so exits reload the total.
        let exit_fields = BTreeSet::from([
            RemoteField::Position,
            RemoteField::Balance,
            RemoteField::Allowance,
            RemoteField::TotalStaked,
        ]);

        match kind {
            ActionKind::Approve => Settlement {
                notice: Notice::success(format!("Tokens approved ({})", hash.short())),
                clear_input: None,
                clear_session_approval: false,
                grant_session_approval: true,
                refresh: BTreeSet::from([RemoteField::Allowance]),
            },
            ActionKind::Stake => Settlement {
                notice: Notice::success(format!("Stake confirmed ({})", hash.short())),
                clear_input: Some(InputField::Stake),
                clear_session_approval: true,
                grant_session_approval: false,
                refresh: account_fields,
            },
            ActionKind::Withdraw => Settlement {
                notice: Notice::success(format!("Withdrawal confirmed ({})", hash.short())),
                clear_input: Some(InputField::Withdraw),
                clear_session_approval: false,
                grant_session_approval: false,
                refresh: exit_fields,
            },
            ActionKind::Claim => Settlement {
                notice: Notice::success(format!("Rewards claimed ({})", hash.short())),
                clear_input: None,
                clear_session_approval: false,
                grant_session_approval: false,
                refresh: account_fields,
            },
            ActionKind::EmergencyWithdraw => Settlement {
                notice: Notice::success(format!("Emergency withdrawal confirmed ({})", hash.short())),
                clear_input: Some(InputField::Withdraw),
                clear_session_approval: false,
                grant_session_approval: false,
                refresh: exit_fields,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hash() -> TxHash {
        TxHash::new("0x8f3c5a9e0d1b2c3d4e5f60718293a4b5c6d7e8f9011223344556677889900aabb")
    }

    #[test]
    fn single_flight() {
        let mut flight = ActionFlight::default();
        assert!(!flight.is_busy());

        flight.begin(ActionKind::Stake).unwrap();
        assert_eq!(flight.phase(), Phase::Submitting(ActionKind::Stake));
        assert_eq!(flight.begin(ActionKind::Claim), Err(StakingError::ActionInFlight));
        assert_eq!(flight.begin(ActionKind::Stake), Err(StakingError::ActionInFlight));

        flight.confirming();
        assert_eq!(flight.phase(), Phase::Confirming(ActionKind::Stake));
        assert_eq!(flight.begin(ActionKind::EmergencyWithdraw), Err(StakingError::ActionInFlight));
        assert_eq!(flight.in_flight(), Some(ActionKind::Stake));

        flight.settle(ActionKind::Stake, &Ok(hash()));
        assert_eq!(flight.phase(), Phase::Idle);
        assert!(flight.begin(ActionKind::Claim).is_ok());
    }

    #[test]
    fn confirming_requires_submission() {
        let mut flight = ActionFlight::default();
        flight.confirming();
        assert_eq!(flight.phase(), Phase::Idle);
    }

    #[test]
    fn confirmed_actions_refresh_account_fields_once() {
        let expected = BTreeSet::from([RemoteField::Position, RemoteField::Balance, RemoteField::Allowance]);
        for kind in [ActionKind::Stake, ActionKind::Claim] {
            let mut flight = ActionFlight::default();
            flight.begin(kind).unwrap();
            let settlement = flight.settle(kind, &Ok(hash()));
            assert_eq!(settlement.refresh, expected, "{}", kind);
            assert_eq!(settlement.notice.kind, NoticeKind::Success);
        }
    }

    #[test]
    fn exits_also_reload_total_staked() {
        let mut expected = BTreeSet::from([RemoteField::Position, RemoteField::Balance, RemoteField::Allowance]);
        expected.insert(RemoteField::TotalStaked);
        for kind in [ActionKind::Withdraw, ActionKind::EmergencyWithdraw] {
            let mut flight = ActionFlight::default();
            flight.begin(kind).unwrap();
            let settlement = flight.settle(kind, &Ok(hash()));
            assert_eq!(settlement.refresh, expected, "{}", kind);
            assert_eq!(settlement.clear_input, Some(InputField::Withdraw));
        }
    }

    #[test]
    fn stake_success_clears_input_and_session_approval() {
        let mut flight = ActionFlight::default();
        flight.begin(ActionKind::Stake).unwrap();
        let settlement = flight.settle(ActionKind::Stake, &Ok(hash()));
        assert_eq!(settlement.clear_input, Some(InputField::Stake));
        assert!(settlement.clear_session_approval);
        assert!(!settlement.grant_session_approval);
        assert_eq!(settlement.notice.text, "Stake confirmed (0x8f3c5a9e…aabb)");
    }

    #[test]
    fn approval_grants_session_flag_and_refreshes_allowance() {
        let mut flight = ActionFlight::default();
        flight.begin(ActionKind::Approve).unwrap();
        let settlement = flight.settle(ActionKind::Approve, &Ok(hash()));
        assert!(settlement.grant_session_approval);
        assert_eq!(settlement.refresh, BTreeSet::from([RemoteField::Allowance]));
        assert_eq!(settlement.clear_input, None);
    }

    #[test]
    fn failure_surfaces_message_and_refreshes_nothing() {
        let mut flight = ActionFlight::default();
        flight.begin(ActionKind::Withdraw).unwrap();
        let err = StakingError::Wallet("User rejected the request.".to_string());
        let settlement = flight.settle(ActionKind::Withdraw, &Err(err));
        assert_eq!(flight.phase(), Phase::Idle);
        assert_eq!(settlement.notice, Notice::error("Wallet error: User rejected the request."));
        assert!(settlement.refresh.is_empty());
        assert_eq!(settlement.clear_input, None);
        assert!(!settlement.clear_session_approval);
    }

    #[test]
    fn notice_kind_follows_error_family() {
        assert_eq!(Notice::from(&StakingError::NoRewards).kind, NoticeKind::Info);
        assert_eq!(Notice::from(&StakingError::Rpc("down".into())).kind, NoticeKind::Error);
    }

    #[test]
    fn notice_board_expires_only_its_own_notice() {
        let mut board = NoticeBoard::default();
        let first = board.post(Notice::info("first"));
        let second = board.post(Notice::error("second"));
        board.expire(first);
        assert_eq!(board.current(), Some(&Notice::error("second")));
        board.expire(second);
        assert_eq!(board.current(), None);

        board.post(Notice::success("third"));
        board.dismiss();
        assert_eq!(board.current(), None);
    }
}
