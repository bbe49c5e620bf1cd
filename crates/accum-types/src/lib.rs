//! Foundation types for accum.
//!
//! This crate provides the key and value types shared by every other accum
//! crate: hierarchical path keys, the closed set of mergeable artifact
//! variants, and the errors they produce.
//!
//! # Key Types
//!
//! - [`PathKey`] -- Normalized slash-delimited key (`/a/b/`) identifying a bag
//! - [`Artifact`] -- A named accumulator (histogram, profile, counter, ...)
//! - [`Mergeable`] -- The `combine` capability implemented per variant
//! - [`KeyError`] / [`MergeError`] -- Structural key and combination errors

pub mod artifact;
pub mod error;
pub mod key;

pub use artifact::{
    Artifact, Axis, BinStorage, Counter, Graph, Histogram, Mergeable, Opaque, Profile,
    SparseHistogram,
};
pub use error::{KeyError, LayoutError, MergeError};
pub use key::{PathKey, LAST, SEPARATOR};
