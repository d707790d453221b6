use std::collections::BTreeSet;
use std::future::Future;

use dioxus::prelude::*;

use crate::cache::{Cached, RemoteField};
use crate::chain::StakingReader;
use crate::config::AppConfig;
use crate::error::Result;
use crate::evm::{Address, UserPosition};

/// Cached contract state for the dashboard, one slot per remote field.
#[derive(Clone, Copy, PartialEq)]
pub struct ContractData {
    pub position: Signal<Cached<UserPosition>>,
    pub total_staked: Signal<Cached<u128>>,
    pub reward_rate: Signal<Cached<u128>>,
    pub initial_apr: Signal<Cached<u128>>,
    pub penalty: Signal<Cached<u128>>,
    pub min_lock: Signal<Cached<u64>>,
    pub symbol: Signal<Cached<String>>,
    pub name: Signal<Cached<String>>,
    pub balance: Signal<Cached<u128>>,
    pub allowance: Signal<Cached<u128>>,
    address: ReadOnlySignal<Option<Address>>,
    reader: Signal<StakingReader>,
}

impl ContractData {
    pub fn reader(&self) -> StakingReader {
        self.reader.peek().clone()
    }

    pub fn token_symbol(&self) -> String {
        self.symbol.read().get().unwrap_or_else(|| "TOKEN".to_string())
    }

    pub fn token_name(&self) -> String {
        self.name.read().get().unwrap_or_else(|| "Token".to_string())
    }

    /// Fetches a value that does not depend on the connected account.
    fn refresh_global<T, F, Fut>(&self, mut slot: Signal<Cached<T>>, what: &'static str, fetch: F)
    where
        T: 'static,
        F: FnOnce(StakingReader) -> Fut + 'static,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let reader = self.reader();
        slot.write().mark_stale();
        spawn(async move {
            match fetch(reader).await {
                Ok(value) => slot.set(Cached::fresh(value)),
                Err(e) => {
                    log::error!("Failed to fetch {}: {}", what, e);
                    slot.write().clear_stale();
                }
            }
        });
    }

    /// Fetches a value keyed by the connected account. Without an account
    /// the slot is cleared and nothing is sent; a response that arrives
    /// after the account changed is dropped.
    fn refresh_scoped<T, F, Fut>(&self, mut slot: Signal<Cached<T>>, what: &'static str, fetch: F)
    where
        T: 'static,
        F: FnOnce(StakingReader, Address) -> Fut + 'static,
        Fut: Future<Output = Result<T>> + 'static,
    {
        let Some(account) = *self.address.peek() else {
            slot.set(Cached::NotFetched);
            return;
        };
        let reader = self.reader();
        let current = self.address;
        slot.write().mark_stale();
        spawn(async move {
            let result = fetch(reader, account).await;
            if *current.peek() != Some(account) {
                log::debug!("Dropping {} for {}: account changed", what, account);
                return;
            }
            match result {
                Ok(value) => slot.set(Cached::fresh(value)),
                Err(e) => {
                    log::error!("Failed to fetch {} for {}: {}", what, account, e);
                    slot.write().clear_stale();
                }
            }
        });
    }

    pub fn refetch_position(&self) {
        self.refresh_scoped(self.position, "position", |reader, account| async move {
            reader.user_details(&account).await
        });
    }

    pub fn refetch_balance(&self) {
        self.refresh_scoped(self.balance, "balance", |reader, account| async move {
            reader.balance_of(&account).await
        });
    }

    pub fn refetch_allowance(&self) {
        self.refresh_scoped(self.allowance, "allowance", |reader, account| async move {
            reader.allowance(&account).await
        });
    }

    pub fn refetch_total_staked(&self) {
        self.refresh_global(self.total_staked, "total staked", |reader| async move {
            reader.total_staked().await
        });
    }

    /// Protocol parameters and token metadata.
    pub fn refetch_protocol(&self) {
        self.refetch_total_staked();
        self.refresh_global(self.reward_rate, "reward rate", |reader| async move {
            reader.current_reward_rate().await
        });
        self.refresh_global(self.initial_apr, "initial APR", |reader| async move {
            reader.initial_apr().await
        });
        self.refresh_global(self.penalty, "emergency penalty", |reader| async move {
            reader.emergency_withdraw_penalty().await
        });
        self.refresh_global(self.min_lock, "min lock duration", |reader| async move {
            reader.min_lock_duration().await
        });
        self.refresh_global(self.symbol, "token symbol", |reader| async move {
            reader.token_symbol().await
        });
        self.refresh_global(self.name, "token name", |reader| async move {
            reader.token_name().await
        });
    }

    /// Issues every requested refetch at once; completion order is free.
    pub fn refresh(&self, fields: &BTreeSet<RemoteField>) {
        for field in fields {
            match field {
                RemoteField::Position => self.refetch_position(),
                RemoteField::Balance => self.refetch_balance(),
                RemoteField::Allowance => self.refetch_allowance(),
                RemoteField::TotalStaked => self.refetch_total_staked(),
            }
        }
    }

    fn on_account_changed(&self, account: Option<Address>) {
        let (mut position, mut balance, mut allowance) = (self.position, self.balance, self.allowance);
        position.write().reset();
        balance.write().reset();
        allowance.write().reset();
        match account {
            Some(account) => {
                log::info!("Loading account state for {}", account);
                self.refresh(&BTreeSet::from([
                    RemoteField::Position,
                    RemoteField::Balance,
                    RemoteField::Allowance,
                ]));
            }
            None => log::info!("No account connected"),
        }
    }
}

/// Reads staking and token state. Account-scoped values follow `address`
/// and are reloaded whenever it changes.
pub fn use_contract_data(address: ReadOnlySignal<Option<Address>>) -> ContractData {
    let config = use_context::<AppConfig>();
    let reader = use_signal(move || StakingReader::new(&config));

    let data = ContractData {
        position: use_signal(Cached::default),
        total_staked: use_signal(Cached::default),
        reward_rate: use_signal(Cached::default),
        initial_apr: use_signal(Cached::default),
        penalty: use_signal(Cached::default),
        min_lock: use_signal(Cached::default),
        symbol: use_signal(Cached::default),
        name: use_signal(Cached::default),
        balance: use_signal(Cached::default),
        allowance: use_signal(Cached::default),
        address,
        reader,
    };

    use_effect(move || data.refetch_protocol());

    use_effect(move || {
        let account = address();
        data.on_account_changed(account);
    });

    data
}
