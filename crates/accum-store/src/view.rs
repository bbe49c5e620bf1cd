//! A working view scoped to one key of a store.

use accum_types::{Artifact, MergeError, PathKey};
use tracing::debug;

use crate::bag::Bag;
use crate::error::{AdoptError, ModifyError};
use crate::store::Store;

/// Mutable handle on the bag at one key.
///
/// Adoption through a view goes to the view's key, or to a key relative to
/// it. Lookups are bag-scoped and do not record misses.
#[derive(Debug)]
pub struct View<'a> {
    store: &'a mut Store,
    key: PathKey,
}

impl Store {
    /// Open a view on `key`. With `create_if_needed` an empty bag is created
    /// for a missing key, otherwise a missing key yields `None`.
    pub fn view(&mut self, key: &PathKey, create_if_needed: bool) -> Option<View<'_>> {
        if !self.contains_key(key) {
            if !create_if_needed {
                debug!(key = %key, "no bag to view");
                return None;
            }
            self.bag_entry(key);
        }
        Some(View {
            store: self,
            key: key.clone(),
        })
    }
}

impl View<'_> {
    /// The key this view is scoped to.
    pub fn key(&self) -> &PathKey {
        &self.key
    }

    /// Adopt at the view's key.
    pub fn adopt(&mut self, artifact: Artifact) -> Result<(), AdoptError> {
        self.store.adopt(&self.key, artifact)
    }

    /// Adopt under `relative`, interpreted below the view's key.
    pub fn adopt_at(&mut self, relative: &str, artifact: Artifact) -> Result<(), AdoptError> {
        let key = self.key.join(&PathKey::normalize(relative));
        self.store.adopt(&key, artifact)
    }

    /// The artifact `name` in this view's bag.
    pub fn lookup(&self, name: &str) -> Option<&Artifact> {
        self.store.find(&self.key, name)
    }

    /// Checked in-place update, as [`Store::modify`].
    pub fn modify<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Artifact) -> R,
    ) -> Option<Result<R, ModifyError>> {
        self.store.modify(&self.key, name, f)
    }

    /// Combine `other` into the same-named artifact in this view's bag.
    pub fn combine_into(&mut self, other: &Artifact) -> Option<Result<(), MergeError>> {
        self.store.combine_into(&self.key, other)
    }

    fn bag(&self) -> Option<&Bag> {
        self.store.bag(&self.key)
    }

    /// Artifacts at the view's key, in bag order.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> + '_ {
        self.bag().into_iter().flat_map(Bag::iter)
    }

    /// Names at the view's key, in bag order.
    pub fn names(&self) -> Vec<&str> {
        self.bag().map(Bag::names).unwrap_or_default()
    }
}
