// [libs/infra/discovery/src/config.rs]
//! Node-level configuration: an optional local asset to announce and
//! answer queries for, plus the auto-announce/auto-query timer
//! periods. Defaults match the contract: announce every 60s, query
//! every 5 minutes, auto-query on.

use std::time::Duration;

use fabric_domain_models::AssetRecord;

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub local_asset: Option<AssetRecord>,
    pub auto_query: bool,
    pub query_interval: Duration,
    pub announce_interval: Duration,
    pub max_event_log: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            local_asset: None,
            auto_query: true,
            query_interval: Duration::from_secs(5 * 60),
            announce_interval: Duration::from_secs(60),
            max_event_log: 1000,
        }
    }
}
