use std::future::Future;

use dioxus::prelude::*;
use futures::StreamExt;
use gloo_timers::future::TimeoutFuture;

use super::{NoticeBanner, StatCard, TxBadge};
use crate::config::{AppConfig, NOTICE_TIMEOUT_MS};
use crate::controls::{self, ButtonState, DashboardSnapshot};
use crate::error::Result;
use crate::evm::{Address, TxHash};
use crate::format::{
    format_apr, format_date, format_time_remaining, format_token_amount, is_partial_amount,
    is_valid_amount,
};
use crate::hooks::{
    use_claim_rewards, use_contract_data, use_emergency_withdraw, use_live_total_staked,
    use_stake, use_token_approval, use_withdraw, ContractData, TxStatus,
};
use crate::session::{ActionFlight, ActionKind, InputField, Notice, NoticeBoard, Phase};
use crate::wallet::WalletAdapter;

const CARD_STYLE: &str = "background: #0f172a; padding: 16px; border-radius: 12px; margin-bottom: 16px; border: 1px solid #334155;";
const TITLE_STYLE: &str = "color: #e0e0e0; font-size: 16px; font-weight: 600; margin-bottom: 12px;";
const MUTED_STYLE: &str = "color: #94a3b8; font-size: 14px;";

/// Form inputs plus the single-flight gate and notice board. All fields
/// are signals, so the struct is `Copy` and can move into every handler.
#[derive(Clone, Copy)]
struct FormState {
    stake_amount: Signal<String>,
    withdraw_amount: Signal<String>,
    approved_this_session: Signal<Option<u128>>,
    flight: Signal<ActionFlight>,
    notices: Signal<NoticeBoard>,
}

impl FormState {
    fn new() -> Self {
        Self {
            stake_amount: use_signal(String::new),
            withdraw_amount: use_signal(String::new),
            approved_this_session: use_signal(|| None),
            flight: use_signal(ActionFlight::default),
            notices: use_signal(NoticeBoard::default),
        }
    }

    fn snapshot<R>(
        &self,
        data: &ContractData,
        connected: bool,
        token_decimals: u8,
        f: impl FnOnce(&DashboardSnapshot<'_>) -> R,
    ) -> R {
        let symbol = data.token_symbol();
        let stake_input = self.stake_amount.read().clone();
        let withdraw_input = self.withdraw_amount.read().clone();
        let allowance_pending = {
            let allowance = data.allowance.read();
            !allowance.is_fetched() || allowance.is_stale()
        };
        let snapshot = DashboardSnapshot {
            connected,
            token_decimals,
            symbol: &symbol,
            balance: data.balance.read().get(),
            allowance: data.allowance.read().get(),
            position: data.position.read().get(),
            stake_input: &stake_input,
            withdraw_input: &withdraw_input,
            in_flight: self.flight.read().in_flight(),
            approved_this_session: *self.approved_this_session.read(),
            allowance_pending,
        };
        f(&snapshot)
    }

    /// Shows `notice` and clears it after a while unless a newer one
    /// replaced it.
    fn notify(self, notice: Notice) {
        let mut notices = self.notices;
        let generation = notices.write().post(notice);
        spawn(async move {
            TimeoutFuture::new(NOTICE_TIMEOUT_MS).await;
            notices.write().expire(generation);
        });
    }

    /// Runs a write if `checked` passed and nothing else is in flight.
    /// `checked` carries the validated amount for actions that take one.
    fn run<Fut>(self, data: ContractData, kind: ActionKind, checked: Result<Option<u128>>, action: Fut)
    where
        Fut: Future<Output = Result<TxHash>> + 'static,
    {
        let mut flight = self.flight;
        let amount = match checked.and_then(|amount| flight.write().begin(kind).map(|_| amount)) {
            Ok(amount) => amount,
            Err(e) => {
                self.notify(Notice::from(&e));
                return;
            }
        };
        log::info!("{} submitted", kind);
        spawn(async move {
            let outcome = action.await;
            self.settle(kind, amount, &outcome, data);
        });
    }

    fn settle(self, kind: ActionKind, amount: Option<u128>, outcome: &Result<TxHash>, data: ContractData) {
        let (mut stake_amount, mut withdraw_amount, mut approved) =
            (self.stake_amount, self.withdraw_amount, self.approved_this_session);
        let mut flight = self.flight;
        let settlement = flight.write().settle(kind, outcome);

        match settlement.clear_input {
            Some(InputField::Stake) => stake_amount.set(String::new()),
            Some(InputField::Withdraw) => withdraw_amount.set(String::new()),
            None => {}
        }
        if settlement.clear_session_approval {
            approved.set(None);
        }
        if settlement.grant_session_approval {
            approved.set(amount);
        }
        data.refresh(&settlement.refresh);
        self.notify(settlement.notice);
    }
}

fn button_style(state: &ButtonState, accent: &str) -> String {
    let (border, cursor, opacity) = if state.enabled {
        (accent, "pointer", "1")
    } else {
        ("#475569", "not-allowed", "0.6")
    };
    format!(
        "width: 100%; background: linear-gradient(135deg, #2a2a2a 0%, #1a1a1a 100%); color: #e0e0e0; padding: 14px; border-radius: 12px; border: 2px solid {}; font-size: 15px; font-weight: 600; cursor: {}; opacity: {}; transition: all 0.3s ease;",
        border, cursor, opacity
    )
}

fn input_style(value: &str) -> String {
    let border = if is_valid_amount(value) {
        "#3b82f6"
    } else if is_partial_amount(value) {
        "#334155"
    } else {
        "#ef4444"
    };
    format!(
        "flex: 1; background: transparent; border: 1px solid {}; border-radius: 8px; padding: 10px; color: white; font-size: 20px; outline: none;",
        border
    )
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[component]
pub fn StakingDashboard() -> Element {
    let decimals = use_context::<AppConfig>().token_decimals;
    let mut account = use_signal(|| Option::<Address>::None);
    let account_ro = ReadOnlySignal::new(account);

    let data = use_contract_data(account_ro);
    use_live_total_staked(data);

    let approval = use_token_approval(account_ro);
    let staker = use_stake(account_ro);
    let withdrawer = use_withdraw(account_ro);
    let claimer = use_claim_rewards(account_ro);
    let emergency = use_emergency_withdraw(account_ro);

    let form = FormState::new();
    let (mut stake_amount, mut withdraw_amount) = (form.stake_amount, form.withdraw_amount);
    let mut notices = form.notices;

    // Wallet callbacks arrive outside the runtime; route them through a channel.
    let account_updates = use_coroutine(move |mut rx: UnboundedReceiver<Option<Address>>| async move {
        while let Some(next) = rx.next().await {
            match next {
                Some(addr) => log::info!("Wallet switched to {}", addr),
                None => log::info!("Wallet disconnected"),
            }
            account.set(next);
        }
    });

    use_hook(move || {
        let tx = account_updates.tx();
        if let Err(e) = WalletAdapter::on_accounts_changed(move |next| {
            let _ = tx.unbounded_send(next);
        }) {
            log::warn!("Not listening for account changes: {}", e);
        }
    });

    use_future(move || async move {
        match WalletAdapter::current_account().await {
            Ok(Some(addr)) => {
                log::info!("Restored wallet session: {}", addr);
                account.set(Some(addr));
            }
            Ok(None) => {}
            Err(e) => log::debug!("No wallet session to restore: {}", e),
        }
    });

    use_effect(move || {
        let statuses = [
            approval.status(),
            staker.status(),
            withdrawer.status(),
            claimer.status(),
            emergency.status(),
        ];
        if statuses.iter().any(TxStatus::is_confirming) {
            let mut flight = form.flight;
            flight.write().confirming();
        }
    });

    let connect_wallet = move |_| {
        spawn(async move {
            match WalletAdapter::connect_wallet().await {
                Ok(addr) => {
                    log::info!("Wallet connected: {}", addr);
                    account.set(Some(addr));
                }
                Err(e) => {
                    log::error!("Wallet connection failed: {}", e);
                    form.notify(Notice::error(format!("Failed to connect wallet: {}", e)));
                }
            }
        });
    };

    let connected = move || account.peek().is_some();

    let on_approve = move |_| {
        let checked = form.snapshot(&data, connected(), decimals, |s| controls::validate_approve(s).map(Some));
        let amount = stake_amount.peek().clone();
        form.run(data, ActionKind::Approve, checked, async move {
            approval.approve_token(&amount).await
        });
    };

    let on_stake = move |_| {
        let checked = form.snapshot(&data, connected(), decimals, |s| controls::validate_stake(s).map(Some));
        let amount = stake_amount.peek().clone();
        form.run(data, ActionKind::Stake, checked, async move { staker.stake(&amount).await });
    };

    let on_withdraw = move |_| {
        let checked = form.snapshot(&data, connected(), decimals, |s| controls::validate_withdraw(s).map(Some));
        let amount = withdraw_amount.peek().clone();
        form.run(data, ActionKind::Withdraw, checked, async move { withdrawer.withdraw(&amount).await });
    };

    let on_claim = move |_| {
        let checked = form.snapshot(&data, connected(), decimals, |s| controls::validate_claim(s).map(|_| None));
        form.run(data, ActionKind::Claim, checked, async move { claimer.claim_rewards().await });
    };

    let on_emergency = move |_| {
        let checked = form.snapshot(&data, connected(), decimals, |s| controls::validate_emergency(s).map(|_| None));
        form.run(data, ActionKind::EmergencyWithdraw, checked, async move {
            emergency.emergency_withdraw().await
        });
    };

    let on_max_stake = move |_| {
        let max = form.snapshot(&data, connected(), decimals, controls::max_stake);
        stake_amount.set(max);
    };

    let on_max_withdraw = move |_| {
        let max = form.snapshot(&data, connected(), decimals, controls::max_withdraw);
        withdraw_amount.set(max);
    };

    // Render-time view; reads subscribe this component to every input.
    let is_connected = account.read().is_some();
    let symbol = data.token_symbol();
    let (show_approve, approve_btn, stake_btn, withdraw_btn, claim_btn, emergency_btn) =
        form.snapshot(&data, is_connected, decimals, |s| {
            (
                controls::show_approve(s),
                controls::approve_button(s),
                controls::stake_button(s),
                controls::withdraw_button(s),
                controls::claim_button(s),
                controls::emergency_button(s),
            )
        });

    let position = data.position.read().get();
    let position_stale = data.position.read().is_stale();
    let staked = position.map(|p| p.staked_amount);
    let rewards = position.map(|p| p.pending_rewards);
    let unlock = position.filter(|p| p.staked_amount > 0).map(|p| {
        if p.can_withdraw || p.time_until_unlock == 0 {
            "Unlocked".to_string()
        } else {
            format!(
                "{} ({})",
                format_time_remaining(Some(p.time_until_unlock)),
                format_date(Some(unix_now() + p.time_until_unlock))
            )
        }
    });

    let phase_line = match form.flight.read().phase() {
        Phase::Idle => None,
        Phase::Submitting(kind) => Some(format!("{}: waiting for wallet signature", kind)),
        Phase::Confirming(kind) => Some(format!("{}: waiting for block confirmation", kind)),
    };
    let notice = notices.read().current().cloned();
    let current_account = *account.read();
    let total_staked = if data.total_staked.read().is_fetched() {
        format!("{} {}", format_token_amount(data.total_staked.read().get(), decimals), symbol)
    } else {
        "Loading...".to_string()
    };
    let token_name = data.token_name();
    let penalty = format_apr(data.penalty.read().get());
    let stake_input = stake_amount.read().clone();
    let withdraw_input = withdraw_amount.read().clone();
    let approval_hint = (is_connected
        && is_valid_amount(&stake_input)
        && approval.needs_approval(&stake_input, data.allowance.read().get()))
    .then(|| {
        format!(
            "Allowance {} {}. Approve at least the amount you stake.",
            format_token_amount(data.allowance.read().get(), decimals),
            symbol
        )
    });

    rsx! {
        div {
            style: "max-width: 560px; margin: 0 auto; padding: 24px; background: linear-gradient(135deg, #1e293b 0%, #0f172a 100%); border-radius: 16px; box-shadow: 0 8px 32px rgba(0,0,0,0.4); border: 2px solid #334155;",

            h2 {
                style: "color: #e0e0e0; margin-bottom: 24px; font-size: 24px; text-align: center;",
                "Stake {token_name}"
            }

            if let Some(notice) = notice {
                NoticeBanner {
                    notice,
                    on_dismiss: move |_| notices.write().dismiss(),
                }
            }

            // Wallet connection
            {match current_account {
                None => rsx! {
                    div {
                        style: "margin-bottom: 24px;",
                        button {
                            onclick: connect_wallet,
                            style: "width: 100%; background: linear-gradient(135deg, #2a2a2a 0%, #1a1a1a 100%); color: #e0e0e0; padding: 16px; border-radius: 12px; border: 2px solid #3b82f6; font-size: 16px; font-weight: 600; cursor: pointer; transition: all 0.3s ease;",
                            if WalletAdapter::is_installed() { "Connect Wallet" } else { "Install a wallet to continue" }
                        }
                    }
                },
                Some(addr) => rsx! {
                    div {
                        style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 24px;",
                        span { style: MUTED_STYLE, "Connected: {addr.short()}" }
                        button {
                            onclick: move |_| account.set(None),
                            style: "background: transparent; color: #94a3b8; border: 1px solid #475569; border-radius: 8px; padding: 6px 12px; cursor: pointer;",
                            "Disconnect"
                        }
                    }
                },
            }}

            // Protocol
            div {
                style: "display: grid; grid-template-columns: 1fr 1fr; gap: 8px; margin-bottom: 16px;",
                StatCard {
                    label: "Total staked",
                    value: total_staked,
                    stale: data.total_staked.read().is_stale(),
                }
                StatCard {
                    label: "APR",
                    value: format_apr(data.initial_apr.read().get()),
                    stale: data.initial_apr.read().is_stale(),
                }
                StatCard {
                    label: "Reward rate",
                    value: format_apr(data.reward_rate.read().get()),
                    stale: data.reward_rate.read().is_stale(),
                }
                StatCard {
                    label: "Emergency penalty",
                    value: format_apr(data.penalty.read().get()),
                    stale: data.penalty.read().is_stale(),
                }
                StatCard {
                    label: "Minimum lock",
                    value: format_time_remaining(data.min_lock.read().get()),
                    stale: data.min_lock.read().is_stale(),
                }
                StatCard {
                    label: "Wallet balance",
                    value: format!("{} {}", format_token_amount(data.balance.read().get(), decimals), symbol),
                    stale: data.balance.read().is_stale(),
                }
            }

            // Position
            if is_connected {
                div {
                    style: CARD_STYLE,
                    div { style: TITLE_STYLE, "Your position" }
                    div {
                        style: "display: grid; grid-template-columns: 1fr 1fr; gap: 8px;",
                        StatCard {
                            label: "Staked",
                            value: format!("{} {}", format_token_amount(staked, decimals), symbol),
                            stale: position_stale,
                        }
                        StatCard {
                            label: "Pending rewards",
                            value: format!("{} {}", format_token_amount(rewards, decimals), symbol),
                            stale: position_stale,
                        }
                    }
                    if let Some(unlock) = unlock {
                        div { style: "color: #94a3b8; font-size: 13px; margin-top: 8px;", "Unlock: {unlock}" }
                    }
                }
            }

            // Stake
            div {
                style: CARD_STYLE,
                div { style: TITLE_STYLE, "Stake" }
                div {
                    style: "display: flex; gap: 8px; margin-bottom: 12px;",
                    input {
                        r#type: "text",
                        value: "{stake_input}",
                        oninput: move |e| stake_amount.set(e.value()),
                        placeholder: "0.0",
                        style: input_style(&stake_input),
                    }
                    button {
                        onclick: on_max_stake,
                        disabled: !is_connected,
                        style: "background: #334155; color: white; padding: 8px 12px; border-radius: 8px; border: 1px solid #475569; cursor: pointer;",
                        "Max"
                    }
                }
                if let Some(hint) = approval_hint {
                    div { style: "color: #f59e0b; font-size: 13px; margin-bottom: 8px;", "{hint}" }
                }
                if show_approve {
                    div {
                        style: "margin-bottom: 8px;",
                        button {
                            onclick: on_approve,
                            disabled: !approve_btn.enabled,
                            style: button_style(&approve_btn, "#f59e0b"),
                            "{approve_btn.label}"
                        }
                        TxBadge { status: approval.status() }
                    }
                }
                button {
                    onclick: on_stake,
                    disabled: !stake_btn.enabled,
                    style: button_style(&stake_btn, "#3b82f6"),
                    "{stake_btn.label}"
                }
                TxBadge { status: staker.status() }
            }

            // Withdraw and claim
            div {
                style: CARD_STYLE,
                div { style: TITLE_STYLE, "Withdraw" }
                div {
                    style: "display: flex; gap: 8px; margin-bottom: 12px;",
                    input {
                        r#type: "text",
                        value: "{withdraw_input}",
                        oninput: move |e| withdraw_amount.set(e.value()),
                        placeholder: "0.0",
                        style: input_style(&withdraw_input),
                    }
                    button {
                        onclick: on_max_withdraw,
                        disabled: !is_connected,
                        style: "background: #334155; color: white; padding: 8px 12px; border-radius: 8px; border: 1px solid #475569; cursor: pointer;",
                        "Max"
                    }
                }
                button {
                    onclick: on_withdraw,
                    disabled: !withdraw_btn.enabled,
                    style: button_style(&withdraw_btn, "#3b82f6"),
                    "{withdraw_btn.label}"
                }
                TxBadge { status: withdrawer.status() }
                div {
                    style: "margin-top: 12px;",
                    button {
                        onclick: on_claim,
                        disabled: !claim_btn.enabled,
                        style: button_style(&claim_btn, "#34d399"),
                        "{claim_btn.label}"
                    }
                    TxBadge { status: claimer.status() }
                }
            }

            // Emergency
            div {
                style: "background: rgba(239, 68, 68, 0.05); padding: 16px; border-radius: 12px; margin-bottom: 16px; border: 1px solid #7f1d1d;",
                div { style: "color: #fca5a5; font-size: 16px; font-weight: 600; margin-bottom: 8px;", "Emergency withdraw" }
                div {
                    style: "color: #94a3b8; font-size: 13px; margin-bottom: 12px;",
                    "Withdraws your whole stake immediately, ignoring the lock. Pending rewards are forfeited and a {penalty} penalty applies."
                }
                button {
                    onclick: on_emergency,
                    disabled: !emergency_btn.enabled,
                    style: button_style(&emergency_btn, "#ef4444"),
                    "{emergency_btn.label}"
                }
                TxBadge { status: emergency.status() }
            }

            if let Some(line) = phase_line {
                div { style: "color: #64748b; font-size: 12px; text-align: center;", "{line}" }
            }
        }
    }
}
