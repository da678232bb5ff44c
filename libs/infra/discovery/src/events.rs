// [libs/infra/discovery/src/events.rs]
//! Fan-out channels for in-process listeners. Four independent
//! `broadcast` channels (not one combined enum channel) so a listener
//! that only cares about `lost` never pays for `discovered`/`updated`
//! traffic parsing. Ordering is preserved per-asset because exactly
//! one task (the receive loop) ever produces these events, serially.

use tokio::sync::broadcast;

use fabric_domain_models::AssetRecord;

use crate::filter::QueryFilter;

#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    Discovered(AssetRecord),
    Updated(AssetRecord),
    Lost(String),
    QueryReceived { sender_id: String, filter: QueryFilter },
}

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Owns the four sender halves; `DiscoveryNode` holds one of these and
/// hands out receivers via `subscribe_*`. A send with no active
/// receivers is not an error — discovery tolerates listener-less runs.
pub struct DiscoveryEvents {
    discovered: broadcast::Sender<AssetRecord>,
    updated: broadcast::Sender<AssetRecord>,
    lost: broadcast::Sender<String>,
    query_received: broadcast::Sender<(String, QueryFilter)>,
}

impl Default for DiscoveryEvents {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl DiscoveryEvents {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            discovered: broadcast::channel(capacity).0,
            updated: broadcast::channel(capacity).0,
            lost: broadcast::channel(capacity).0,
            query_received: broadcast::channel(capacity).0,
        }
    }

    pub fn subscribe_discovered(&self) -> broadcast::Receiver<AssetRecord> {
        self.discovered.subscribe()
    }

    pub fn subscribe_updated(&self) -> broadcast::Receiver<AssetRecord> {
        self.updated.subscribe()
    }

    pub fn subscribe_lost(&self) -> broadcast::Receiver<String> {
        self.lost.subscribe()
    }

    pub fn subscribe_query_received(&self) -> broadcast::Receiver<(String, QueryFilter)> {
        self.query_received.subscribe()
    }

    pub(crate) fn emit_discovered(&self, asset: AssetRecord) {
        let _ = self.discovered.send(asset);
    }

    pub(crate) fn emit_updated(&self, asset: AssetRecord) {
        let _ = self.updated.send(asset);
    }

    pub(crate) fn emit_lost(&self, id: String) {
        let _ = self.lost.send(id);
    }

    pub(crate) fn emit_query_received(&self, sender_id: String, filter: QueryFilter) {
        let _ = self.query_received.send((sender_id, filter));
    }
}
