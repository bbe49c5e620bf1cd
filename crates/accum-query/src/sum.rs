//! Summing every artifact that matches an exact alternation pattern.

use accum_store::Store;
use accum_types::{Artifact, Mergeable};
use tracing::debug;

use crate::error::QueryResult;
use crate::pattern::SelectPattern;
use crate::select::select_compiled;

/// Combine every artifact matching the exact alternation `pattern`
/// (`/k1a,k1b/.../n1,n2`) into a clone of the first match.
///
/// Matches are visited in key then name order. Returns `Ok(None)` when
/// nothing matches; a failing combine aborts the reduction.
pub fn get_sum(store: &Store, pattern: &str) -> QueryResult<Option<Artifact>> {
    let compiled = SelectPattern::parse_exact(pattern)?;
    let mut matches = select_compiled(store, &compiled).into_iter();

    let Some(first) = matches.next() else {
        debug!(pattern, "no object matched");
        return Ok(None);
    };
    let mut sum = first.artifact.clone();
    let mut summed = vec![first.full_identifier()];
    for selection in matches {
        sum.combine(selection.artifact)?;
        summed.push(selection.full_identifier());
    }
    debug!(pattern, objects = ?summed, "summed objects");
    Ok(Some(sum))
}
