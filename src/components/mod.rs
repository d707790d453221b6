mod notice_banner;
mod staking_dashboard;
mod stat_card;
mod tx_badge;

pub use notice_banner::NoticeBanner;
pub use staking_dashboard::StakingDashboard;
pub use stat_card::StatCard;
pub use tx_badge::TxBadge;
