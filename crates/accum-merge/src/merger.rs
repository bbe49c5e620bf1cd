//! Artifact-level reduction of many stores into one.

use accum_store::Store;
use accum_types::{Artifact, PathKey};
use serde::Serialize;
use tracing::{debug, error, warn};

/// One element of a merge batch.
///
/// Batches may be heterogeneous: anything that is not a store is carried as
/// [`MergeInput::Foreign`] and skipped.
#[derive(Clone, Copy, Debug)]
pub enum MergeInput<'a> {
    Store(&'a Store),
    Foreign(&'a Artifact),
}

impl<'a> From<&'a Store> for MergeInput<'a> {
    fn from(store: &'a Store) -> Self {
        MergeInput::Store(store)
    }
}

impl<'a> From<&'a Artifact> for MergeInput<'a> {
    fn from(artifact: &'a Artifact) -> Self {
        MergeInput::Foreign(artifact)
    }
}

/// An artifact that could not be folded into the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MergeFailure {
    pub key: PathKey,
    pub name: String,
    pub reason: String,
}

/// Outcome of a merge batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Store inputs merged.
    pub merged: usize,
    /// Inputs skipped because they were not stores.
    pub skipped: usize,
    /// Artifacts cloned into the destination because it lacked them.
    pub adopted: usize,
    /// Artifacts combined into an existing destination artifact.
    pub combined: usize,
    pub failures: Vec<MergeFailure>,
}

impl MergeReport {
    /// Returns `true` if every artifact was merged.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Merge every store in `inputs` into `dest`, artifact by artifact.
///
/// Inputs are visited in order, and each store in key then bag order. An
/// artifact missing from `dest` is cloned and adopted at the same key; an
/// existing one is combined with it. A failing combine leaves the
/// destination artifact as it was, is recorded in the report, and the batch
/// continues.
pub fn merge_into(dest: &mut Store, inputs: &[MergeInput<'_>]) -> MergeReport {
    let mut report = MergeReport::default();

    for (index, input) in inputs.iter().enumerate() {
        let source = match input {
            MergeInput::Store(store) => *store,
            MergeInput::Foreign(artifact) => {
                error!(
                    index,
                    name = artifact.name(),
                    class = %artifact.class_tag(),
                    "object is not a store, skipping it"
                );
                report.skipped += 1;
                continue;
            }
        };

        for (key, artifact) in source.entries() {
            merge_artifact(dest, key, artifact, &mut report);
        }
        report.merged += 1;
        debug!(index, source = source.name(), "merged store");
    }

    debug!(
        merged = report.merged,
        skipped = report.skipped,
        adopted = report.adopted,
        combined = report.combined,
        failed = report.failures.len(),
        "merge finished"
    );
    report
}

fn merge_artifact(dest: &mut Store, key: &PathKey, artifact: &Artifact, report: &mut MergeReport) {
    let failure = |reason: String| MergeFailure {
        key: key.clone(),
        name: artifact.name().to_string(),
        reason,
    };

    if let Some(result) = dest.combine_into(key, artifact) {
        match result {
            Ok(()) => report.combined += 1,
            Err(e) => {
                warn!(key = %key, name = artifact.name(), error = %e, "could not combine");
                report.failures.push(failure(e.to_string()));
            }
        }
        return;
    }

    match dest.adopt(key, artifact.clone()) {
        Ok(()) => report.adopted += 1,
        Err(e) => report.failures.push(failure(e.to_string())),
    }
}

/// Merge `inputs` into a fresh store named `name`.
pub fn merge(name: &str, inputs: &[MergeInput<'_>]) -> (Store, MergeReport) {
    let mut dest = Store::new(name, "");
    let report = merge_into(&mut dest, inputs);
    (dest, report)
}

#[cfg(test)]
mod tests {
    use accum_types::{Axis, BinStorage, Counter, Histogram, Opaque};
    use proptest::prelude::*;

    use super::*;

    fn counter_store(name: &str, entries: &[(&str, &str, f64)]) -> Store {
        let mut store = Store::new(name, "");
        for (key, object, value) in entries {
            store
                .adopt_at(key, Counter::with_value(*object, *value).into())
                .unwrap();
        }
        store
    }

    fn value(store: &Store, full_key: &str) -> f64 {
        store
            .lookup_by_full_key(full_key)
            .unwrap()
            .and_then(Artifact::as_counter)
            .map(Counter::value)
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Merging
    // -----------------------------------------------------------------------

    #[test]
    fn counters_with_same_name_are_combined() {
        let mut a = counter_store("a", &[("/DIGITS/", "h1", 3.0)]);
        let b = counter_store("b", &[("/DIGITS/", "h1", 5.0)]);

        let report = merge_into(&mut a, &[MergeInput::Store(&b)]);
        assert_eq!(value(&a, "/DIGITS/h1"), 8.0);
        assert_eq!(report.merged, 1);
        assert_eq!(report.combined, 1);
        assert!(report.is_complete());
        // The source is untouched.
        assert_eq!(value(&b, "/DIGITS/h1"), 5.0);
    }

    #[test]
    fn missing_artifacts_are_cloned_in() {
        let mut a = counter_store("a", &[("/A/", "x", 1.0)]);
        let b = counter_store("b", &[("/B/", "y", 2.0), ("/A/", "z", 4.0)]);
        let report = merge_into(&mut a, &[(&b).into()]);
        assert_eq!(report.adopted, 2);
        assert_eq!(value(&a, "/B/y"), 2.0);
        assert_eq!(value(&a, "/A/z"), 4.0);
        assert_eq!(a.number_of_artifacts(), 3);
    }

    #[test]
    fn foreign_inputs_are_skipped() {
        let mut a = counter_store("a", &[("/A/", "x", 1.0)]);
        let b = counter_store("b", &[("/A/", "x", 1.0)]);
        let stray: Artifact = Opaque::new("stray", "TList", "").into();
        let report = merge_into(&mut a, &[(&stray).into(), (&b).into(), (&b).into()]);
        assert_eq!(report.merged, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(value(&a, "/A/x"), 3.0);
    }

    #[test]
    fn combine_failure_is_recorded_and_batch_continues() {
        let mut a = counter_store("a", &[("/A/", "x", 1.0), ("/B/", "y", 1.0)]);
        let mut b = Store::new("b", "");
        let h = Histogram::new_1d("x", "", BinStorage::Float, Axis::new(1, 0.0, 1.0));
        b.adopt_at("/A/", h.into()).unwrap();
        b.adopt_at("/B/", Counter::with_value("y", 2.0).into()).unwrap();

        let report = merge_into(&mut a, &[(&b).into()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, PathKey::normalize("/A/"));
        assert_eq!(report.failures[0].name, "x");
        assert_eq!(report.combined, 1);
        assert_eq!(value(&a, "/A/x"), 1.0);
        assert_eq!(value(&a, "/B/y"), 3.0);
    }

    #[test]
    fn merge_builds_fresh_store() {
        let a = counter_store("a", &[("/A/", "x", 1.0)]);
        let b = counter_store("b", &[("/A/", "x", 2.0)]);
        let (merged, report) = merge("sum", &[(&a).into(), (&b).into()]);
        assert_eq!(merged.name(), "sum");
        assert_eq!(report.merged, 2);
        assert_eq!(report.adopted, 1);
        assert_eq!(report.combined, 1);
        assert_eq!(value(&merged, "/A/x"), 3.0);
    }

    #[test]
    fn report_serializes() {
        let report = MergeReport {
            merged: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["merged"], 1);
        assert!(json["failures"].as_array().unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn arb_store(name: &'static str) -> impl Strategy<Value = Store> {
        proptest::collection::vec(("/[a-b]/", "[x-z]", -1000i32..1000), 0..8).prop_map(
            move |entries| {
                let mut store = Store::new(name, "");
                for (key, object, value) in entries {
                    let _ = store.adopt_at(&key, Counter::with_value(object, f64::from(value)).into());
                }
                store
            },
        )
    }

    fn values(store: &Store) -> Vec<(String, f64)> {
        store
            .entries()
            .map(|(key, a)| {
                let c = a.as_counter().map(Counter::value).unwrap_or(f64::NAN);
                (key.full_identifier(a.name()), c)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn merging_in_steps_matches_one_pass(
            a in arb_store("a"),
            b in arb_store("b"),
            c in arb_store("c"),
        ) {
            let (ab, _) = merge("ab", &[(&a).into(), (&b).into()]);
            let (stepwise, _) = merge("abc", &[(&ab).into(), (&c).into()]);
            let (one_pass, _) = merge("abc", &[(&a).into(), (&b).into(), (&c).into()]);

            let mut lhs = values(&stepwise);
            let mut rhs = values(&one_pass);
            lhs.sort_by(|x, y| x.0.cmp(&y.0));
            rhs.sort_by(|x, y| x.0.cmp(&y.0));
            prop_assert_eq!(lhs.len(), rhs.len());
            for ((lk, lv), (rk, rv)) in lhs.iter().zip(&rhs) {
                prop_assert_eq!(lk, rk);
                prop_assert!((lv - rv).abs() < 1e-9);
            }
        }
    }
}
