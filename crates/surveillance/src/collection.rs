//! The three independently keyed collections that make up durable state.
//!
//! Each collection is one JSON array under one storage key, always written
//! and replaced whole. Adding a collection means a new [`CollectionKey`]
//! variant plus a [`Collection`] impl; the storage layer iterates
//! [`CollectionKey::ALL`] and needs no other change.

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::campaign::Campaign;
use crate::config::{CAMPAIGNS_KEY, REGION_TREE_KEY, WATER_QUALITY_KEY};
use crate::hierarchy::Region;
use crate::seed::seed_regions;
use crate::water_quality::WaterQualityReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    RegionTree,
    WaterQuality,
    Campaigns,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 3] = [
        CollectionKey::RegionTree,
        CollectionKey::WaterQuality,
        CollectionKey::Campaigns,
    ];

    /// Name of the durable record holding this collection.
    pub fn storage_key(self) -> &'static str {
        match self {
            CollectionKey::RegionTree => REGION_TREE_KEY,
            CollectionKey::WaterQuality => WATER_QUALITY_KEY,
            CollectionKey::Campaigns => CAMPAIGNS_KEY,
        }
    }

    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.storage_key() == key)
    }
}

/// A whole collection as persisted.
pub trait Collection: Serialize + DeserializeOwned + Sized {
    const KEY: CollectionKey;

    /// Default contents used when the durable record is absent or unreadable.
    fn seed(seed: u64) -> Self;

    fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    fn decode(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Decode `json`, logging a warning and returning seeded defaults on failure.
///
/// Malformed records are never fatal: the context keeps running on seed data
/// and the next successful mutation overwrites the bad record.
pub fn decode_or_seed<T: Collection>(json: &str, seed: u64) -> T {
    match T::decode(json) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Collection {}: failed to decode {} bytes, falling back to seed data: {}",
                T::KEY.storage_key(),
                json.len(),
                e
            );
            T::seed(seed)
        }
    }
}

// ---------------------------------------------------------------------------
// Collection newtypes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Regions(pub Vec<Region>);

impl Collection for Regions {
    const KEY: CollectionKey = CollectionKey::RegionTree;

    fn seed(seed: u64) -> Self {
        Regions(seed_regions(seed))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaterQualityReports(pub Vec<WaterQualityReport>);

impl Collection for WaterQualityReports {
    const KEY: CollectionKey = CollectionKey::WaterQuality;

    fn seed(_seed: u64) -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Campaigns(pub Vec<Campaign>);

impl Collection for Campaigns {
    const KEY: CollectionKey = CollectionKey::Campaigns;

    fn seed(_seed: u64) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::campaign;
    use crate::water_quality::sample;

    #[test]
    fn test_storage_keys_round_trip() {
        for key in CollectionKey::ALL {
            assert_eq!(CollectionKey::from_storage_key(key.storage_key()), Some(key));
        }
        assert_eq!(CollectionKey::from_storage_key("theme"), None);
    }

    #[test]
    fn test_regions_encode_as_bare_array() {
        let json = Regions::seed(1).encode().unwrap();
        assert!(json.starts_with('['), "got: {}", &json[..20]);
    }

    #[test]
    fn test_all_collections_round_trip() {
        let regions = Regions::seed(11);
        assert_eq!(Regions::decode(&regions.encode().unwrap()).unwrap(), regions);

        let reports = WaterQualityReports(vec![sample("w1", "AR"), sample("w2", "AS")]);
        assert_eq!(
            WaterQualityReports::decode(&reports.encode().unwrap()).unwrap(),
            reports
        );

        let campaigns = Campaigns(vec![campaign("c1", None)]);
        assert_eq!(Campaigns::decode(&campaigns.encode().unwrap()).unwrap(), campaigns);
    }

    #[test]
    fn test_decode_or_seed_falls_back_on_garbage() {
        let regions: Regions = decode_or_seed("{not json", 5);
        assert_eq!(regions, Regions::seed(5));
        let campaigns: Campaigns = decode_or_seed("[{\"id\":1}]", 5);
        assert!(campaigns.0.is_empty());
    }
}
