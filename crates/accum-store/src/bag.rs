//! Name-unique, insertion-ordered artifact collections.

use std::collections::HashMap;

use accum_types::{Artifact, MergeError, Mergeable};
use serde::{Serialize, Serializer};

use crate::error::ModifyError;

/// Returned by [`Bag::insert`] when the name is already taken. Carries the
/// rejected artifact back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateName(pub Artifact);

/// The artifacts attached to one key.
///
/// Enumeration follows insertion order; lookup by name goes through a hash
/// index kept in sync with the ordered list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bag {
    items: Vec<Artifact>,
    index: HashMap<String, usize>,
}

impl Bag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the bag holds no artifacts.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an artifact named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Append an artifact. Fails, leaving the bag unchanged, if an artifact
    /// with the same name is already present.
    pub fn insert(&mut self, artifact: Artifact) -> Result<(), DuplicateName> {
        if self.index.contains_key(artifact.name()) {
            return Err(DuplicateName(artifact));
        }
        self.index
            .insert(artifact.name().to_string(), self.items.len());
        self.items.push(artifact);
        Ok(())
    }

    /// The artifact named `name`, if present.
    pub fn find(&self, name: &str) -> Option<&Artifact> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    /// Fold `other` into the artifact carrying the same name. `None` when no
    /// such artifact exists; a failed combine leaves it untouched.
    pub fn combine_into(&mut self, other: &Artifact) -> Option<Result<(), MergeError>> {
        let i = *self.index.get(other.name())?;
        Some(self.items[i].combine(other))
    }

    /// Run `f` on the artifact named `name`.
    ///
    /// The artifact must keep its name and stay mergeable; otherwise it is
    /// restored to its state before `f` ran and an error is returned.
    pub fn modify<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Artifact) -> R,
    ) -> Option<Result<R, ModifyError>> {
        let i = *self.index.get(name)?;
        let before = self.items[i].clone();
        let out = f(&mut self.items[i]);

        let after = &self.items[i];
        let err = if after.name() != name {
            Some(ModifyError::Renamed {
                name: name.to_string(),
                renamed: after.name().to_string(),
            })
        } else if !after.is_mergeable() {
            Some(ModifyError::NotMergeable {
                name: name.to_string(),
                class: after.class_tag(),
            })
        } else {
            None
        };
        match err {
            Some(e) => {
                self.items[i] = before;
                Some(Err(e))
            }
            None => Some(Ok(out)),
        }
    }

    /// Remove an artifact by name, preserving the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Artifact> {
        let i = self.index.remove(name)?;
        let removed = self.items.remove(i);
        self.reindex_from(i);
        Some(removed)
    }

    /// Remove every artifact matching `predicate`; returns how many went.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Artifact) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|a| !predicate(a));
        let removed = before - self.items.len();
        if removed > 0 {
            self.index.clear();
            self.reindex_from(0);
        }
        removed
    }

    /// Drop every artifact reporting [`Artifact::is_empty`].
    pub fn retain_non_empty(&mut self) -> usize {
        self.remove_where(Artifact::is_empty)
    }

    /// Artifacts in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.items.iter()
    }

    /// Artifact names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Artifact::name).collect()
    }

    fn reindex_from(&mut self, start: usize) {
        for (i, artifact) in self.items.iter().enumerate().skip(start) {
            self.index.insert(artifact.name().to_string(), i);
        }
    }
}

impl<'a> IntoIterator for &'a Bag {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Serialized as a plain ordered list of artifacts.
impl Serialize for Bag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accum_types::{Axis, BinStorage, Counter, Histogram, Opaque};

    fn counter(name: &str, value: f64) -> Artifact {
        Counter::with_value(name, value).into()
    }

    fn empty_hist(name: &str) -> Artifact {
        Histogram::new_1d(name, "t", BinStorage::Float, Axis::new(2, 0.0, 2.0)).into()
    }

    #[test]
    fn insert_preserves_order() {
        let mut bag = Bag::new();
        bag.insert(counter("b", 1.0)).unwrap();
        bag.insert(counter("a", 2.0)).unwrap();
        bag.insert(counter("c", 3.0)).unwrap();
        assert_eq!(bag.names(), vec!["b", "a", "c"]);
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn duplicate_insert_is_rejected_and_bag_unchanged() {
        let mut bag = Bag::new();
        bag.insert(counter("h1", 1.0)).unwrap();
        let err = bag.insert(counter("h1", 9.0)).unwrap_err();
        assert_eq!(err.0.name(), "h1");
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.find("h1").unwrap().as_counter().unwrap().value(), 1.0);
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut bag = Bag::new();
        for name in ["a", "b", "c", "d"] {
            bag.insert(counter(name, 0.0)).unwrap();
        }
        let removed = bag.remove("b").unwrap();
        assert_eq!(removed.name(), "b");
        assert!(bag.remove("b").is_none());
        assert_eq!(bag.names(), vec!["a", "c", "d"]);
        assert_eq!(bag.find("d").unwrap().name(), "d");
        assert_eq!(bag.find("c").unwrap().name(), "c");
    }

    #[test]
    fn retain_non_empty_only_drops_empty_histograms() {
        let mut bag = Bag::new();
        bag.insert(empty_hist("empty")).unwrap();
        bag.insert(counter("zero", 0.0)).unwrap();
        let mut filled = Histogram::new_1d("filled", "t", BinStorage::Float, Axis::new(2, 0.0, 2.0));
        filled.fill(&[0.5], 1.0);
        bag.insert(filled.into()).unwrap();

        assert_eq!(bag.retain_non_empty(), 1);
        assert_eq!(bag.names(), vec!["zero", "filled"]);
        assert!(bag.find("filled").is_some());
    }

    #[test]
    fn iteration_is_restartable() {
        let mut bag = Bag::new();
        bag.insert(counter("a", 0.0)).unwrap();
        bag.insert(counter("b", 0.0)).unwrap();
        assert_eq!(bag.iter().count(), 2);
        assert_eq!(bag.iter().count(), 2);
        assert_eq!((&bag).into_iter().next().unwrap().name(), "a");
    }

    #[test]
    fn modify_allows_in_place_update() {
        let mut bag = Bag::new();
        bag.insert(Counter::new("c").into()).unwrap();
        let res = bag.modify("c", |a| {
            if let Artifact::Counter(c) = a {
                c.add(4.0);
            }
        });
        assert!(matches!(res, Some(Ok(()))));
        assert_eq!(bag.find("c").unwrap().as_counter().unwrap().value(), 4.0);
        assert!(bag.modify("missing", |_| ()).is_none());
    }

    #[test]
    fn modify_rolls_back_rename() {
        let mut bag = Bag::new();
        bag.insert(counter("a", 1.0)).unwrap();
        bag.insert(counter("b", 2.0)).unwrap();

        let res = bag.modify("a", |a| *a = counter("b", 9.0));
        assert_eq!(
            res,
            Some(Err(ModifyError::Renamed {
                name: "a".into(),
                renamed: "b".into()
            }))
        );
        assert_eq!(bag.names(), vec!["a", "b"]);
        assert_eq!(bag.find("a").unwrap().as_counter().unwrap().value(), 1.0);
        assert_eq!(bag.find("b").unwrap().as_counter().unwrap().value(), 2.0);
    }

    #[test]
    fn modify_rolls_back_non_mergeable_replacement() {
        let mut bag = Bag::new();
        bag.insert(counter("a", 1.0)).unwrap();
        let res = bag.modify("a", |a| *a = Opaque::new("a", "TBlob", "payload").into());
        assert!(matches!(res, Some(Err(ModifyError::NotMergeable { .. }))));
        assert!(bag.find("a").unwrap().is_mergeable());
    }

    #[test]
    fn combine_into_matches_by_name() {
        let mut bag = Bag::new();
        bag.insert(counter("a", 1.0)).unwrap();
        assert!(matches!(bag.combine_into(&counter("a", 2.0)), Some(Ok(()))));
        assert!(bag.combine_into(&counter("z", 2.0)).is_none());
        assert!(matches!(bag.combine_into(&empty_hist("a")), Some(Err(_))));
        assert_eq!(bag.find("a").unwrap().as_counter().unwrap().value(), 3.0);
    }
}
