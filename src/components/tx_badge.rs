use dioxus::prelude::*;

use crate::hooks::{TxPhase, TxStatus};

/// Progress line for an in-flight transaction. Renders nothing when idle
/// or settled; the outcome is reported through the notice banner.
#[component]
pub fn TxBadge(status: TxStatus) -> Element {
    let text = match (status.phase, &status.hash) {
        (TxPhase::Pending, _) => "Confirm in your wallet...".to_string(),
        (TxPhase::Confirming, Some(hash)) => format!("Waiting for block confirmation ({})", hash.short()),
        (TxPhase::Confirming, None) => "Waiting for block confirmation...".to_string(),
        _ => return rsx! {},
    };

    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 8px; color: #94a3b8; font-size: 13px; margin-top: 8px;",
            div {
                class: "pulse-loader",
                style: "width: 8px; height: 8px; border-radius: 50%; background: linear-gradient(135deg, #60a5fa 0%, #a78bfa 50%, #34d399 100%);"
            }
            span { "{text}" }
        }
    }
}
