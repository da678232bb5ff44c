// [libs/infra/discovery/src/table.rs]
//! The asset record map a node maintains from announces/responses it
//! has heard. Exclusively owned by `DiscoveryNode` — everything else
//! reaches it only through events or read-only snapshots.

use std::collections::HashMap;
use std::sync::RwLock;

use fabric_domain_models::AssetRecord;

#[derive(Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Inserted,
    Updated,
    Stale,
}

#[derive(Default)]
pub struct AssetTable {
    assets: RwLock<HashMap<String, AssetRecord>>,
}

impl AssetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new asset or refreshes an existing one if the
    /// incoming record is not stale. A record with a new id is always
    /// an insert; an existing id with an older `last_seen` is dropped.
    pub fn insert_or_refresh(&self, incoming: AssetRecord) -> RefreshOutcome {
        let mut assets = self.assets.write().expect("asset table lock poisoned");

        match assets.get_mut(&incoming.id) {
            None => {
                assets.insert(incoming.id.clone(), incoming);
                RefreshOutcome::Inserted
            }
            Some(existing) => {
                if existing.refresh_if_newer(&incoming) {
                    RefreshOutcome::Updated
                } else {
                    RefreshOutcome::Stale
                }
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<AssetRecord> {
        self.assets.read().expect("asset table lock poisoned").get(id).cloned()
    }

    pub fn snapshot(&self) -> Vec<AssetRecord> {
        self.assets.read().expect("asset table lock poisoned").values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.assets.read().expect("asset table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns the ids of every asset expired relative to
    /// `now_unix`. Called by the 30s janitor task.
    pub fn evict_expired(&self, now_unix: i64) -> Vec<String> {
        let mut assets = self.assets.write().expect("asset table lock poisoned");
        let expired: Vec<String> = assets
            .values()
            .filter(|asset| asset.is_expired(now_unix))
            .map(|asset| asset.id.clone())
            .collect();

        for id in &expired {
            assets.remove(id);
        }

        expired
    }
}
