// [libs/infra/discovery/src/filter.rs]
//! Query filter semantics: conjunctive across the three dimensions
//! (asset types, capabilities, room), disjunctive within each
//! dimension, with an empty dimension meaning "any". `max_age_secs`
//! additionally bounds whether a responder's own asset is eligible to
//! answer at all, independent of `matches`.

use fabric_domain_models::AssetRecord;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    pub asset_types: Vec<String>,
    pub capabilities: Vec<String>,
    pub room: Option<String>,
    pub max_age_secs: Option<i64>,
}

impl QueryFilter {
    /// Whether `asset` satisfies this filter, ignoring `max_age_secs`
    /// (callers check eligibility against `now - asset.last_seen`
    /// separately via `within_max_age`, since that's a property of
    /// *which* asset is being tested against, not of the filter alone).
    pub fn matches(&self, asset: &AssetRecord) -> bool {
        let type_ok = self.asset_types.is_empty() || self.asset_types.iter().any(|t| t == &asset.asset_type);

        let caps_ok = self
            .capabilities
            .iter()
            .all(|requested| asset.capabilities.iter().any(|has| has == requested));

        let room_ok = self.room.as_deref().map(|r| r == asset.room).unwrap_or(true);

        type_ok && caps_ok && room_ok
    }

    pub fn within_max_age(&self, asset: &AssetRecord, now_unix: i64) -> bool {
        match self.max_age_secs {
            None => true,
            Some(max_age) => now_unix - asset.last_seen <= max_age,
        }
    }

    pub fn is_eligible(&self, asset: &AssetRecord, now_unix: i64) -> bool {
        self.matches(asset) && self.within_max_age(asset, now_unix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_domain_models::AssetStatus;

    fn asset(asset_type: &str, room: &str, caps: &[&str], last_seen: i64) -> AssetRecord {
        AssetRecord {
            id: "a1".into(),
            asset_type: asset_type.into(),
            name: "Test".into(),
            model: "M1".into(),
            manufacturer: "Fabric".into(),
            version: "1.0".into(),
            ip_address: "10.0.0.1".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            hostname: "t1.local".into(),
            room: room.into(),
            zone: "main".into(),
            capabilities: caps.iter().map(|s| s.to_string()).collect(),
            services: vec![],
            status: AssetStatus::Online,
            health: "ok".into(),
            battery_level: None,
            last_seen,
            ttl: 60,
            created_at: None,
        }
    }

    #[test]
    fn empty_filter_matches_anything() {
        let filter = QueryFilter::default();
        assert!(filter.matches(&asset("gateway", "office", &[], 0)));
    }

    #[test]
    fn type_dimension_is_disjunctive() {
        let filter = QueryFilter {
            asset_types: vec!["gateway".into(), "sensor".into()],
            ..Default::default()
        };
        assert!(filter.matches(&asset("sensor", "office", &[], 0)));
        assert!(!filter.matches(&asset("plug", "office", &[], 0)));
    }

    #[test]
    fn capability_dimension_requires_every_requested_capability() {
        let filter = QueryFilter {
            capabilities: vec!["discovery".into(), "energy".into()],
            ..Default::default()
        };
        assert!(filter.matches(&asset("plug", "office", &["discovery", "energy", "extra"], 0)));
        assert!(!filter.matches(&asset("plug", "office", &["discovery"], 0)));
    }

    #[test]
    fn room_dimension_is_exact_match_when_present() {
        let filter = QueryFilter {
            room: Some("kitchen".into()),
            ..Default::default()
        };
        assert!(filter.matches(&asset("plug", "kitchen", &[], 0)));
        assert!(!filter.matches(&asset("plug", "office", &[], 0)));
    }

    #[test]
    fn dimensions_combine_conjunctively() {
        let filter = QueryFilter {
            asset_types: vec!["plug".into()],
            room: Some("kitchen".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&asset("plug", "office", &[], 0)));
        assert!(filter.matches(&asset("plug", "kitchen", &[], 0)));
    }

    #[test]
    fn max_age_bounds_eligibility_separately_from_matches() {
        let filter = QueryFilter {
            max_age_secs: Some(30),
            ..Default::default()
        };
        let stale = asset("gateway", "office", &[], 1000);
        assert!(filter.matches(&stale));
        assert!(filter.within_max_age(&stale, 1020));
        assert!(!filter.within_max_age(&stale, 1100));
        assert!(!filter.is_eligible(&stale, 1100));
    }
}
