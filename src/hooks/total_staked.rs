use dioxus::prelude::*;
use futures::StreamExt;
use gloo_timers::future::TimeoutFuture;

use super::ContractData;
use crate::cache::Cached;
use crate::chain::StakingReader;
use crate::config::AppConfig;
use crate::evm::StakedEvent;

/// Keeps `data.total_staked` current from `Staked` events instead of
/// re-querying after every stake. Events travel through a coroutine
/// channel into the same slot a refetch would write. Both the poller and
/// the channel belong to the calling component and stop with it.
pub fn use_live_total_staked(data: ContractData) {
    let poll_ms = use_context::<AppConfig>().poll_ms;
    let mut total = data.total_staked;

    let updates = use_coroutine(move |mut rx: UnboundedReceiver<StakedEvent>| async move {
        while let Some(event) = rx.next().await {
            log::info!(
                "Staked by {}: {} (total now {})",
                event.user,
                event.amount,
                event.new_total_staked
            );
            total.set(Cached::fresh(event.new_total_staked));
        }
    });

    use_future(move || {
        let reader = data.reader();
        let updates = updates.clone();
        async move { follow_staked_events(data, reader, poll_ms, updates).await }
    });
}

async fn follow_staked_events(
    data: ContractData,
    reader: StakingReader,
    poll_ms: u32,
    updates: Coroutine<StakedEvent>,
) {
    let mut next_block = loop {
        match reader.latest_block().await {
            Ok(head) => break head + 1,
            Err(e) => {
                log::warn!("Cannot start Staked subscription: {}", e);
                TimeoutFuture::new(poll_ms).await;
            }
        }
    };
    log::info!("Following Staked events from block {}", next_block);
    // The mount read may predate `next_block`; re-read so no stake falls in between.
    data.refetch_total_staked();

    loop {
        TimeoutFuture::new(poll_ms).await;

        let head = match reader.latest_block().await {
            Ok(head) => head,
            Err(e) => {
                log::warn!("Block number lookup failed: {}", e);
                continue;
            }
        };
        if head < next_block {
            continue;
        }

        match reader.staked_events(next_block, head).await {
            Ok(events) => {
                for event in events {
                    updates.send(event);
                }
                next_block = head + 1;
            }
            Err(e) => log::warn!("Staked log query {}..={} failed: {}", next_block, head, e),
        }
    }
}
