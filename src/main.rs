use dioxus::prelude::*;

mod cache;
mod chain;
mod components;
mod config;
mod controls;
mod error;
mod evm;
mod format;
mod hooks;
mod rpc;
mod session;
mod wallet;

use components::StakingDashboard;
use config::AppConfig;

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");

    let config = AppConfig::from_build_env()
        .inspect_err(|e| log::error!("Invalid build configuration: {}", e))
        .expect("invalid staking configuration");
    log::info!(
        "Staking contract {} (token {}) via {}",
        config.staking_contract,
        config.staking_token,
        config.rpc_url
    );

    LaunchBuilder::new().with_context(config).launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        div {
            style: "width: 100%; min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 24px 0; background: #0f172a;",
            StakingDashboard {}
        }
    }
}
