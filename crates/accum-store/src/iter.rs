//! Iteration over a store in key order, then bag order.

use std::collections::btree_map;
use std::slice;

use accum_types::{Artifact, PathKey};

use crate::bag::Bag;
use crate::store::Store;

/// Yields `(key, artifact)` pairs. Empty bags are skipped.
#[derive(Clone)]
pub struct Entries<'a> {
    bags: btree_map::Iter<'a, PathKey, Bag>,
    current: Option<(&'a PathKey, slice::Iter<'a, Artifact>)>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a PathKey, &'a Artifact);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, items)) = self.current.as_mut() {
                if let Some(artifact) = items.next() {
                    return Some((*key, artifact));
                }
            }
            let (key, bag) = self.bags.next()?;
            self.current = Some((key, bag.iter()));
        }
    }
}

/// Yields artifacts only.
#[derive(Clone)]
pub struct Iter<'a> {
    inner: Entries<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Artifact;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, artifact)| artifact)
    }
}

impl Store {
    /// Every artifact with its key.
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            bags: self.bags.iter(),
            current: None,
        }
    }

    /// Every artifact, in key order then bag order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries(),
        }
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = &'a Artifact;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use accum_types::Counter;

    use super::*;

    fn store() -> Store {
        let mut store = Store::default();
        store.adopt_at("/b/", Counter::new("b1").into()).unwrap();
        store.adopt_at("/a/", Counter::new("a1").into()).unwrap();
        store.adopt_at("/a/", Counter::new("a2").into()).unwrap();
        store.adopt_at("/c/", Counter::new("c1").into()).unwrap();
        store.remove("/c/c1").unwrap();
        store
    }

    #[test]
    fn iterates_in_key_then_bag_order() {
        let store = store();
        let seen: Vec<String> = store
            .entries()
            .map(|(key, a)| key.full_identifier(a.name()))
            .collect();
        assert_eq!(seen, vec!["/a/a1", "/a/a2", "/b/b1"]);
    }

    #[test]
    fn iter_is_restartable() {
        let store = store();
        let it = store.iter();
        assert_eq!(it.clone().count(), 3);
        assert_eq!(it.count(), 3);
        assert_eq!((&store).into_iter().count(), 3);
    }

    #[test]
    fn empty_store_yields_nothing() {
        assert_eq!(Store::default().iter().next(), None);
    }
}
