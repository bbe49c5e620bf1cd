//! The path-indexed store.
//!
//! [`Store`] owns a `BTreeMap<PathKey, Bag>`; the map order doubles as the
//! sorted view used for enumeration and printing.
//!
//! # Invariants
//!
//! - Every key present maps to a bag, possibly empty. Removing artifacts
//!   never removes keys; only [`Store::prune`] and [`Store::clear`] do.
//! - Artifact names are unique within a bag.
//! - Only mergeable artifacts are ever adopted.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use accum_types::{Artifact, Histogram, KeyError, MergeError, PathKey, Profile};
use tracing::{debug, error, warn};

use crate::bag::{Bag, DuplicateName};
use crate::config::StoreConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{AdoptError, AttachError, ModifyError};

/// A hierarchical container of mergeable artifacts.
pub struct Store {
    name: String,
    title: String,
    show_empty_objects: bool,
    pub(crate) bags: BTreeMap<PathKey, Bag>,
    /// Lookup misses. Not persisted and not carried over by `clone`.
    messages: RefCell<Diagnostics>,
}

impl Store {
    /// Create an empty store.
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            show_empty_objects: false,
            bags: BTreeMap::new(),
            messages: RefCell::new(Diagnostics::new()),
        }
    }

    /// Create an empty store from a configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        let mut store = Self::new(config.name, config.title);
        store.show_empty_objects = config.show_empty_objects;
        store
    }

    /// The configuration this store would be rebuilt from.
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            name: self.name.clone(),
            title: self.title.clone(),
            show_empty_objects: self.show_empty_objects,
        }
    }

    /// The store name, used in reports and derived artifact names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description shown in the report header.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether reports list artifacts that hold no entries.
    pub fn show_empty_objects(&self) -> bool {
        self.show_empty_objects
    }

    pub fn set_show_empty_objects(&mut self, show: bool) {
        self.show_empty_objects = show;
    }

    // ---------------------------------------------------------------
    // Insertion
    // ---------------------------------------------------------------

    /// Insert `artifact` into the bag at `key`, creating the bag if needed.
    ///
    /// Fails without touching the store if the name is already taken at
    /// `key` or if the artifact cannot be combined.
    pub fn adopt(&mut self, key: &PathKey, artifact: Artifact) -> Result<(), AdoptError> {
        if !artifact.is_mergeable() {
            error!(key = %key, name = artifact.name(), "cannot adopt an object which is not mergeable");
            return Err(AdoptError::NotMergeable {
                key: key.clone(),
                name: artifact.name().to_string(),
                class: artifact.class_tag(),
            });
        }
        let bag = self.bag_entry(key);
        bag.insert(artifact).map_err(|DuplicateName(rejected)| {
            error!(key = %key, name = rejected.name(), "cannot adopt an already existing object");
            AdoptError::Duplicate {
                key: key.clone(),
                name: rejected.name().to_string(),
            }
        })
    }

    /// [`adopt`](Self::adopt) under a raw key, normalized first.
    pub fn adopt_at(&mut self, raw_key: &str, artifact: Artifact) -> Result<(), AdoptError> {
        self.adopt(&PathKey::normalize(raw_key), artifact)
    }

    /// [`adopt`](Self::adopt) at the root key.
    pub fn adopt_top(&mut self, artifact: Artifact) -> Result<(), AdoptError> {
        self.adopt(&PathKey::root(), artifact)
    }

    pub(crate) fn bag_entry(&mut self, key: &PathKey) -> &mut Bag {
        if !self.bags.contains_key(key) {
            debug!(key = %key, "creating bag");
        }
        self.bags.entry(key.clone()).or_default()
    }

    // ---------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------

    /// Find `name` under `key`. A miss is recorded in the diagnostics log.
    pub fn lookup(&self, key: &PathKey, name: &str) -> Option<&Artifact> {
        let Some(bag) = self.bags.get(key) else {
            self.messages
                .borrow_mut()
                .record(format!("Did not find bag for key={key}"));
            return None;
        };
        let found = bag.find(name);
        if found.is_none() {
            self.messages
                .borrow_mut()
                .record(format!("Did not find object={name} in {key}"));
        }
        found
    }

    /// Find an artifact by full identifier `/k1/.../kN/name`.
    pub fn lookup_by_full_key(&self, full_key: &str) -> Result<Option<&Artifact>, KeyError> {
        let (key, name) = PathKey::split_full(full_key)?;
        Ok(self.lookup(&key, &name))
    }

    /// Like [`lookup`](Self::lookup) but without recording misses.
    pub fn find(&self, key: &PathKey, name: &str) -> Option<&Artifact> {
        self.bags.get(key)?.find(name)
    }

    /// Run `f` on the artifact `name` at `key`. See [`Bag::modify`] for the
    /// name and mergeability checks.
    pub fn modify<R>(
        &mut self,
        key: &PathKey,
        name: &str,
        f: impl FnOnce(&mut Artifact) -> R,
    ) -> Option<Result<R, ModifyError>> {
        let result = self.bags.get_mut(key)?.modify(name, f)?;
        if let Err(e) = &result {
            warn!(key = %key, name, error = %e, "rolled back modification");
        }
        Some(result)
    }

    /// Combine `other` into the same-named artifact at `key`. `None` when
    /// there is nothing to combine with.
    pub fn combine_into(
        &mut self,
        key: &PathKey,
        other: &Artifact,
    ) -> Option<Result<(), MergeError>> {
        self.bags.get_mut(key)?.combine_into(other)
    }

    /// The histogram at `full_key`, if that artifact is a histogram.
    pub fn histogram(&self, full_key: &str) -> Result<Option<&Histogram>, KeyError> {
        Ok(self
            .lookup_by_full_key(full_key)?
            .and_then(Artifact::as_histogram))
    }

    /// The histogram at `full_key`, if it is a 2-D histogram.
    pub fn histogram_2d(&self, full_key: &str) -> Result<Option<&Histogram>, KeyError> {
        Ok(self.histogram(full_key)?.filter(|h| h.dimension() == 2))
    }

    /// The profile at `full_key`, if that artifact is a profile.
    pub fn profile(&self, full_key: &str) -> Result<Option<&Profile>, KeyError> {
        Ok(self
            .lookup_by_full_key(full_key)?
            .and_then(Artifact::as_profile))
    }

    /// The bag at `key`, possibly empty.
    pub fn bag(&self, key: &PathKey) -> Option<&Bag> {
        self.bags.get(key)
    }

    /// Whether `key` exists, with or without artifacts.
    pub fn contains_key(&self, key: &PathKey) -> bool {
        self.bags.contains_key(key)
    }

    /// All `(key, bag)` pairs in sorted key order.
    pub fn bags(&self) -> impl Iterator<Item = (&PathKey, &Bag)> + '_ {
        self.bags.iter()
    }

    /// All keys in sorted order.
    pub fn sorted_keys(&self) -> Vec<&PathKey> {
        self.bags.keys().collect()
    }

    /// Distinct segment values found at level `index` across all keys,
    /// sorted. Keys too shallow for `index` are skipped.
    pub fn keys_at_level(&self, index: usize) -> Vec<String> {
        self.bags
            .keys()
            .filter_map(|key| key.segments().nth(index))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Names of the artifacts under `key`, in bag order.
    pub fn object_names(&self, key: &PathKey) -> Vec<String> {
        self.bags
            .get(key)
            .map(|bag| bag.names().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Number of keys, empty bags included.
    pub fn number_of_keys(&self) -> usize {
        self.bags.len()
    }

    /// Total artifact count, by full traversal.
    pub fn number_of_artifacts(&self) -> usize {
        self.iter().count()
    }

    /// Whether the store has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.bags.is_empty()
    }

    // ---------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------

    /// Remove the artifact at `full_key`. The key and its bag stay, even if
    /// the bag becomes empty.
    pub fn remove(&mut self, full_key: &str) -> Result<Option<Artifact>, KeyError> {
        let (key, name) = PathKey::split_full(full_key)?;
        let Some(bag) = self.bags.get_mut(&key) else {
            warn!(key = %key, "could not get bag for key");
            return Ok(None);
        };
        let removed = bag.remove(&name);
        if removed.is_none() {
            warn!(full_key, "could not find object to remove");
        }
        Ok(removed)
    }

    /// Remove every artifact whose class tag equals `tag`.
    pub fn remove_by_variant(&mut self, tag: &str) -> usize {
        self.bags
            .values_mut()
            .map(|bag| bag.remove_where(|a| a.class_tag() == tag))
            .sum()
    }

    /// Remove every key (with its whole bag) whose rendered form starts with
    /// `prefix`. Returns the number of keys removed, not artifacts.
    pub fn prune(&mut self, prefix: &str) -> usize {
        let before = self.bags.len();
        self.bags.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.bags.len();
        debug!(prefix, removed, "pruned keys");
        removed
    }

    /// Remove every artifact reporting [`Artifact::is_empty`]. Keys stay.
    pub fn prune_empty(&mut self) -> usize {
        let mut removed = 0;
        for (key, bag) in self.bags.iter_mut() {
            let n = bag.retain_non_empty();
            if n > 0 {
                debug!(key = %key, removed = n, "removed empty objects");
            }
            removed += n;
        }
        removed
    }

    /// Drop every key and artifact. Diagnostics are kept.
    pub fn clear(&mut self) {
        self.bags.clear();
    }

    // ---------------------------------------------------------------
    // Grafting and projection
    // ---------------------------------------------------------------

    /// Graft every bag of `other` under `at`, taking ownership of them.
    ///
    /// The graft conflicts when `at` or any of the grafted keys already
    /// exists. Without `overwrite` a conflict is an error. With `overwrite`
    /// the whole subtree at `at` is pruned first, and a prune that removes
    /// nothing is an error. On error this store is left unchanged.
    pub fn attach(&mut self, other: Store, at: &PathKey, overwrite: bool) -> Result<(), AttachError> {
        let conflict = self.bags.contains_key(at)
            || other
                .bags
                .keys()
                .any(|key| self.bags.contains_key(&at.join(key)));

        if conflict {
            if !overwrite {
                error!(key = %at, "already exists, will not overwrite it");
                return Err(AttachError::Exists(at.clone()));
            }
            if self.prune(at.as_str()) == 0 {
                error!(key = %at, "could not prune pre-existing key");
                return Err(AttachError::PruneFailed(at.clone()));
            }
        }

        for (key, bag) in other.bags {
            self.bags.insert(at.join(&key), bag);
        }
        Ok(())
    }

    /// A new store holding clones of every artifact under `prefix`, re-keyed
    /// with the prefix stripped.
    pub fn project(&self, prefix: &PathKey) -> Store {
        let mut projected = Store::new(format!("{} {}", self.name, prefix), self.title.clone());
        projected.show_empty_objects = self.show_empty_objects;
        for (key, bag) in &self.bags {
            if bag.is_empty() {
                continue;
            }
            if let Some(relative) = key.strip_prefix(prefix) {
                projected.bags.insert(relative, bag.clone());
            }
        }
        projected
    }

    // ---------------------------------------------------------------
    // Diagnostics
    // ---------------------------------------------------------------

    /// Lookup-miss messages with their occurrence counts.
    pub fn messages(&self) -> Vec<(String, u64)> {
        self.messages.borrow().entries()
    }

    /// Occurrences of one diagnostic message.
    pub fn message_count(&self, message: &str) -> u64 {
        self.messages.borrow().count(message)
    }

    pub fn render_messages(&self, prefix: &str) -> String {
        self.messages.borrow().render(prefix)
    }

    pub fn clear_messages(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl Clone for Store {
    /// Deep copy of keys and artifacts; the diagnostics log starts empty.
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            title: self.title.clone(),
            show_empty_objects: self.show_empty_objects,
            bags: self.bags.clone(),
            messages: RefCell::new(Diagnostics::new()),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("keys", &self.number_of_keys())
            .field("artifacts", &self.number_of_artifacts())
            .finish()
    }
}
