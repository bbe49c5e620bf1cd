//! Merge engine for accum.
//!
//! Reduces a batch of stores into one destination store by artifact-level
//! combination: every `(key, artifact)` of every input is either cloned into
//! the destination or combined with the artifact already there.
//!
//! # Rules
//!
//! 1. Inputs are never modified.
//! 2. Inputs that are not stores are skipped and counted, never fatal.
//! 3. A failing combine only affects that one artifact; the batch continues
//!    and the failure is reported in [`MergeReport::failures`].

pub mod merger;

pub use merger::{merge, merge_into, MergeFailure, MergeInput, MergeReport};
