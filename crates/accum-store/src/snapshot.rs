//! JSON snapshots of a whole store.
//!
//! A snapshot holds the store configuration plus every bag, keyed by its
//! rendered key. Snapshots written before versioning (version 0) may carry
//! `./` fragments in their keys; those are normalized once on load.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use accum_types::{Artifact, PathKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bag::Bag;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    config: StoreConfig,
    bags: BTreeMap<&'a str, &'a Bag>,
}

#[derive(Deserialize)]
struct SnapshotIn {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    config: StoreConfig,
    #[serde(default)]
    bags: BTreeMap<String, Vec<Artifact>>,
}

impl Store {
    /// Encode the store as pretty-printed JSON. Diagnostics are not included.
    pub fn to_json(&self) -> StoreResult<String> {
        let snapshot = SnapshotOut {
            version: SNAPSHOT_VERSION,
            config: self.config(),
            bags: self.bags.iter().map(|(k, b)| (k.as_str(), b)).collect(),
        };
        serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a store from JSON, re-adopting every artifact.
    ///
    /// Keys of the current version must be in strict form. Keys of older
    /// snapshots go through [`PathKey::from_legacy`]. Keys with empty bags
    /// are kept.
    pub fn from_json(json: &str) -> StoreResult<Store> {
        let snapshot: SnapshotIn =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported snapshot version {} (newest known is {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        let legacy = snapshot.version < SNAPSHOT_VERSION;
        if legacy {
            debug!(version = snapshot.version, "normalizing legacy snapshot keys");
        }

        let mut store = Store::with_config(snapshot.config);
        for (raw, artifacts) in snapshot.bags {
            let key = if legacy {
                PathKey::from_legacy(&raw)
            } else {
                PathKey::parse(&raw)?
            };
            store.bag_entry(&key);
            for artifact in artifacts {
                store.adopt(&key, artifact)?;
            }
        }
        Ok(store)
    }

    /// Write a snapshot to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), keys = self.number_of_keys(), "saved snapshot");
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Store> {
        let path = path.as_ref();
        let store = Store::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), keys = store.number_of_keys(), "loaded snapshot");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use accum_types::{Axis, BinStorage, Counter, Graph, Histogram};

    use super::*;

    fn sample() -> Store {
        let mut store = Store::new("HC", "hit clusters");
        let mut h = Histogram::new_1d("charge", "t", BinStorage::Float, Axis::new(4, 0.0, 4.0));
        h.fill(&[1.0], 1.0);
        store.adopt_at("/DIGITS/", h.into()).unwrap();
        let mut g = Graph::new("g", "");
        g.push(1.0, 2.0);
        store.adopt_at("/DIGITS/", g.into()).unwrap();
        store.adopt_at("/COUNT/", Counter::with_value("n", 3.0).into()).unwrap();
        store.adopt_at("/EMPTY/", Counter::new("gone").into()).unwrap();
        store.remove("/EMPTY/gone").unwrap();
        store
    }

    #[test]
    fn json_preserves_keys_and_artifacts() {
        let store = sample();
        let restored = Store::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored.name(), "HC");
        assert_eq!(restored.title(), "hit clusters");
        assert_eq!(restored.sorted_keys(), store.sorted_keys());
        assert_eq!(
            restored.object_names(&PathKey::normalize("/DIGITS/")),
            vec!["charge", "g"]
        );
        assert_eq!(
            restored.lookup_by_full_key("/DIGITS/charge").unwrap(),
            store.lookup_by_full_key("/DIGITS/charge").unwrap()
        );
        assert!(restored.contains_key(&PathKey::normalize("/EMPTY/")));
    }

    #[test]
    fn legacy_keys_are_normalized() {
        let json = r#"{
            "config": { "name": "old" },
            "bags": {
                "./DIGITS/./": [ { "kind": "counter", "name": "n", "value": 1.0, "entries": 1 } ]
            }
        }"#;
        let store = Store::from_json(json).unwrap();
        assert_eq!(store.name(), "old");
        assert!(store.lookup_by_full_key("/DIGITS/n").unwrap().is_some());
    }

    #[test]
    fn current_version_rejects_malformed_keys() {
        let json = r#"{ "version": 1, "bags": { "DIGITS/": [] } }"#;
        assert!(matches!(Store::from_json(json), Err(StoreError::Key(_))));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let json = r#"{ "version": 1, "bags": { "/a/": [
            { "kind": "counter", "name": "n", "value": 1.0, "entries": 1 },
            { "kind": "counter", "name": "n", "value": 2.0, "entries": 1 }
        ] } }"#;
        assert!(matches!(Store::from_json(json), Err(StoreError::Adopt(_))));
    }

    #[test]
    fn truncated_histogram_is_rejected() {
        let json = r#"{ "version": 1, "bags": { "/D/": [ {
            "kind": "histogram", "name": "m", "title": "", "storage": "Double",
            "axes": [ { "nbins": 2, "min": 0.0, "max": 2.0 }, { "nbins": 2, "min": 0.0, "max": 2.0 } ],
            "contents": [], "sumw2": null, "entries": 3.0
        } ] } }"#;
        let err = Store::from_json(json).unwrap_err();
        assert!(matches!(&err, StoreError::Serialization(msg) if msg.contains("contents holds 0 bins")));
    }

    #[test]
    fn future_versions_are_rejected() {
        let json = r#"{ "version": 99 }"#;
        assert!(matches!(
            Store::from_json(json),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = sample();
        store.save(&path).unwrap();
        let loaded = Store::load(&path).unwrap();
        assert_eq!(loaded.number_of_artifacts(), store.number_of_artifacts());

        let missing = Store::load(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(StoreError::Io(_))));
    }
}
