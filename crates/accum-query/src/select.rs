//! Pattern selection over every artifact of a store.

use accum_store::Store;
use accum_types::{Artifact, PathKey};

use crate::error::QueryResult;
use crate::pattern::SelectPattern;

/// One matched artifact with the key it lives under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection<'a> {
    pub key: &'a PathKey,
    pub artifact: &'a Artifact,
}

impl Selection<'_> {
    pub fn full_identifier(&self) -> String {
        self.key.full_identifier(self.artifact.name())
    }
}

/// Every artifact matching `pattern`, sorted by key then by name.
pub fn select<'a>(store: &'a Store, pattern: &str) -> QueryResult<Vec<Selection<'a>>> {
    let pattern = SelectPattern::parse(pattern)?;
    Ok(select_compiled(store, &pattern))
}

pub(crate) fn select_compiled<'a>(store: &'a Store, pattern: &SelectPattern) -> Vec<Selection<'a>> {
    let mut out = Vec::new();
    for (key, bag) in store.bags() {
        if !pattern.matches_key(key) {
            continue;
        }
        let start = out.len();
        out.extend(
            bag.iter()
                .filter(|a| pattern.matches_artifact(a))
                .map(|artifact| Selection { key, artifact }),
        );
        out[start..].sort_by(|a, b| a.artifact.name().cmp(b.artifact.name()));
    }
    out
}

/// Keys satisfying the path part of `pattern`, in sorted order.
pub fn matching_keys<'a>(store: &'a Store, pattern: &str) -> QueryResult<Vec<&'a PathKey>> {
    let pattern = SelectPattern::parse(pattern)?;
    Ok(store
        .bags()
        .map(|(key, _)| key)
        .filter(|key| pattern.matches_key(key))
        .collect())
}
