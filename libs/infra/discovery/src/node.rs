// [libs/infra/discovery/src/node.rs]
/*!
 * Receive loop, janitor, and optional auto-announce/auto-query timers
 * for one discovery node. `process_inbound` is deliberately a free
 * function operating on plain bytes (no socket) so the demultiplexing
 * logic — dedup, staleness, query matching — is unit-testable without
 * a real multicast group, the same separation the Tapo client keeps
 * between its wire functions and the `reqwest::Client` that calls them.
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fabric_domain_models::messages::{DiscoveryEnvelope, MAX_DISCOVERY_DATAGRAM_BYTES};
use fabric_domain_models::AssetRecord;
use fabric_shared_errors::FabricError;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::DiscoveryConfig;
use crate::events::DiscoveryEvents;
use crate::filter::QueryFilter;
use crate::socket::{bind_multicast_socket, multicast_target};
use crate::table::{AssetTable, RefreshOutcome};

const JANITOR_INTERVAL: Duration = Duration::from_secs(30);
const RECV_DEADLINE: Duration = Duration::from_secs(1);
const RECV_BUFFER_SIZE: usize = MAX_DISCOVERY_DATAGRAM_BYTES + 1;

pub struct DiscoveryNode {
    socket: UdpSocket,
    table: Arc<AssetTable>,
    events: Arc<DiscoveryEvents>,
    config: DiscoveryConfig,
    sender_id: String,
}

impl DiscoveryNode {
    pub async fn new(config: DiscoveryConfig) -> Result<Self, FabricError> {
        let socket = bind_multicast_socket()?;
        let sender_id = config
            .local_asset
            .as_ref()
            .map(|asset| asset.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            socket,
            table: Arc::new(AssetTable::new()),
            events: Arc::new(DiscoveryEvents::with_capacity(config.max_event_log.min(1024).max(1))),
            config,
            sender_id,
        })
    }

    pub fn table(&self) -> Arc<AssetTable> {
        self.table.clone()
    }

    pub fn events(&self) -> Arc<DiscoveryEvents> {
        self.events.clone()
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// Broadcasts the configured local asset as an `announce`. A
    /// no-op (not an error) if no local asset is configured.
    #[instrument(skip(self))]
    pub async fn announce(&self) -> Result<(), FabricError> {
        let Some(asset) = self.config.local_asset.clone() else {
            return Ok(());
        };

        let envelope = DiscoveryEnvelope::Announce {
            sender_id: self.sender_id.clone(),
            timestamp: Utc::now().timestamp(),
            asset,
        };
        self.send_envelope(&envelope).await
    }

    #[instrument(skip(self, filter))]
    pub async fn send_query(&self, filter: QueryFilter) -> Result<(), FabricError> {
        let envelope = DiscoveryEnvelope::Query {
            sender_id: self.sender_id.clone(),
            timestamp: Utc::now().timestamp(),
            asset_types: filter.asset_types,
            capabilities: filter.capabilities,
            room: filter.room,
            max_age_secs: filter.max_age_secs,
        };
        self.send_envelope(&envelope).await
    }

    async fn send_envelope(&self, envelope: &DiscoveryEnvelope) -> Result<(), FabricError> {
        let payload = serde_json::to_vec(envelope).map_err(|err| FabricError::protocol(err.to_string()))?;
        self.socket
            .send_to(&payload, multicast_target())
            .await
            .map_err(|err| FabricError::connection(format!("discovery send failed: {err}")))?;
        Ok(())
    }

    /// Spawns the receive loop, the 30s TTL janitor, and (if
    /// configured) the auto-announce/auto-query timers. Every task
    /// honours `cancel` and returns within the receive loop's 1s recv
    /// deadline or the relevant timer's period.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> JoinSet<()> {
        let mut tasks = JoinSet::new();

        tasks.spawn(self.clone().run_receive_loop(cancel.clone()));
        tasks.spawn(self.clone().run_janitor(cancel.clone()));

        if !self.config.announce_interval.is_zero() {
            tasks.spawn(self.clone().run_announce_timer(cancel.clone()));
        }
        if self.config.auto_query {
            tasks.spawn(self.clone().run_query_timer(cancel));
        }

        tasks
    }

    async fn run_receive_loop(self: Arc<Self>, cancel: CancellationToken) {
        let mut buffer = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            if cancel.is_cancelled() {
                info!("discovery receive loop shutting down");
                break;
            }

            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                result = tokio::time::timeout(RECV_DEADLINE, self.socket.recv_from(&mut buffer)) => result,
            };

            let Ok(Ok((len, _peer))) = received else {
                continue;
            };

            let now = Utc::now().timestamp();
            if let Some(response) = process_inbound(
                &buffer[..len],
                &self.sender_id,
                &self.table,
                &self.events,
                self.config.local_asset.as_ref(),
                now,
            ) {
                if let Err(err) = self.send_envelope(&response).await {
                    warn!(error = %err, "failed to send query response");
                }
            }
        }
    }

    async fn run_janitor(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(JANITOR_INTERVAL);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let now = Utc::now().timestamp();
                    for id in self.table.evict_expired(now) {
                        debug!(asset_id = %id, "asset expired");
                        self.events.emit_lost(id);
                    }
                }
            }
        }
    }

    async fn run_announce_timer(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.announce_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(err) = self.announce().await {
                        warn!(error = %err, "auto-announce failed");
                    }
                }
            }
        }
    }

    async fn run_query_timer(self: Arc<Self>, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.query_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(err) = self.send_query(QueryFilter::default()).await {
                        warn!(error = %err, "auto-query failed");
                    }
                }
            }
        }
    }
}

/// Demultiplexes one inbound datagram against the node's table and
/// event channels. Returns `Some(response)` when the datagram was a
/// `query` this node's local asset is eligible to answer.
fn process_inbound(
    data: &[u8],
    own_sender_id: &str,
    table: &AssetTable,
    events: &DiscoveryEvents,
    local_asset: Option<&AssetRecord>,
    now_unix: i64,
) -> Option<DiscoveryEnvelope> {
    if data.len() > MAX_DISCOVERY_DATAGRAM_BYTES {
        warn!(bytes = data.len(), "dropping oversized discovery datagram");
        return None;
    }

    let envelope: DiscoveryEnvelope = match serde_json::from_slice(data) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!(error = %err, "dropping malformed discovery datagram");
            return None;
        }
    };

    match envelope {
        DiscoveryEnvelope::Announce { asset, .. } | DiscoveryEnvelope::Response { asset, .. } => {
            if asset.id == own_sender_id {
                return None;
            }
            match table.insert_or_refresh(asset.clone()) {
                RefreshOutcome::Inserted => events.emit_discovered(asset),
                RefreshOutcome::Updated => events.emit_updated(asset),
                RefreshOutcome::Stale => {}
            }
            None
        }
        DiscoveryEnvelope::Query {
            sender_id,
            asset_types,
            capabilities,
            room,
            max_age_secs,
        } => {
            if sender_id == own_sender_id {
                return None;
            }
            let filter = QueryFilter {
                asset_types,
                capabilities,
                room,
                max_age_secs,
            };
            events.emit_query_received(sender_id.clone(), filter.clone());

            let local_asset = local_asset?;
            if filter.is_eligible(local_asset, now_unix) {
                Some(DiscoveryEnvelope::Response {
                    sender_id: own_sender_id.to_string(),
                    timestamp: now_unix,
                    asset: local_asset.clone(),
                })
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_domain_models::AssetStatus;

    fn asset(id: &str, room: &str, last_seen: i64) -> AssetRecord {
        AssetRecord {
            id: id.to_string(),
            asset_type: "gateway".into(),
            name: "Test".into(),
            model: "M1".into(),
            manufacturer: "Fabric".into(),
            version: "1.0".into(),
            ip_address: "10.0.0.1".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            hostname: "t1.local".into(),
            room: room.into(),
            zone: "main".into(),
            capabilities: vec!["discovery".into()],
            services: vec![],
            status: AssetStatus::Online,
            health: "ok".into(),
            battery_level: None,
            last_seen,
            ttl: 60,
            created_at: None,
        }
    }

    fn announce_bytes(sender_id: &str, asset: AssetRecord, timestamp: i64) -> Vec<u8> {
        serde_json::to_vec(&DiscoveryEnvelope::Announce {
            sender_id: sender_id.to_string(),
            timestamp,
            asset,
        })
        .unwrap()
    }

    #[test]
    fn announce_from_a_new_asset_emits_discovered() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        let mut discovered_rx = events.subscribe_discovered();

        let bytes = announce_bytes("node-b", asset("a1", "office", 1000), 1000);
        let response = process_inbound(&bytes, "node-a", &table, &events, None, 1000);

        assert!(response.is_none());
        assert_eq!(discovered_rx.try_recv().unwrap().id, "a1");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn own_asset_id_is_ignored_for_self_dedup() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        let mut discovered_rx = events.subscribe_discovered();

        let bytes = announce_bytes("node-a", asset("a1", "office", 1000), 1000);
        process_inbound(&bytes, "a1", &table, &events, None, 1000);

        assert!(discovered_rx.try_recv().is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn stale_announce_does_not_emit_updated() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        table.insert_or_refresh(asset("a1", "office", 1000));
        let mut updated_rx = events.subscribe_updated();

        let bytes = announce_bytes("node-b", asset("a1", "office", 900), 900);
        process_inbound(&bytes, "node-a", &table, &events, None, 1000);

        assert!(updated_rx.try_recv().is_err());
    }

    #[test]
    fn matching_query_produces_response_when_local_asset_eligible() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        let local = asset("local-1", "office", 1000);

        let query = serde_json::to_vec(&DiscoveryEnvelope::Query {
            sender_id: "node-b".into(),
            timestamp: 1000,
            asset_types: vec!["gateway".into()],
            capabilities: vec![],
            room: None,
            max_age_secs: None,
        })
        .unwrap();

        let response = process_inbound(&query, "node-a", &table, &events, Some(&local), 1000);
        match response {
            Some(DiscoveryEnvelope::Response { asset, sender_id, .. }) => {
                assert_eq!(asset.id, "local-1");
                assert_eq!(sender_id, "node-a");
            }
            _ => panic!("expected a response"),
        }
    }

    #[test]
    fn non_matching_query_produces_no_response() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        let local = asset("local-1", "office", 1000);

        let query = serde_json::to_vec(&DiscoveryEnvelope::Query {
            sender_id: "node-b".into(),
            timestamp: 1000,
            asset_types: vec!["sensor".into()],
            capabilities: vec![],
            room: None,
            max_age_secs: None,
        })
        .unwrap();

        let response = process_inbound(&query, "node-a", &table, &events, Some(&local), 1000);
        assert!(response.is_none());
    }

    #[test]
    fn own_query_is_ignored() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        let mut query_rx = events.subscribe_query_received();
        let local = asset("local-1", "office", 1000);

        let query = serde_json::to_vec(&DiscoveryEnvelope::Query {
            sender_id: "node-a".into(),
            timestamp: 1000,
            asset_types: vec![],
            capabilities: vec![],
            room: None,
            max_age_secs: None,
        })
        .unwrap();

        let response = process_inbound(&query, "node-a", &table, &events, Some(&local), 1000);
        assert!(response.is_none());
        assert!(query_rx.try_recv().is_err());
    }

    #[test]
    fn oversized_datagram_is_dropped() {
        let table = AssetTable::new();
        let events = DiscoveryEvents::default();
        let oversized = vec![0u8; MAX_DISCOVERY_DATAGRAM_BYTES + 1];

        let response = process_inbound(&oversized, "node-a", &table, &events, None, 1000);
        assert!(response.is_none());
        assert!(table.is_empty());
    }
}
