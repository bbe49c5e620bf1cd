//! Path-indexed storage of mergeable artifacts.
//!
//! A [`Store`] maps normalized [`PathKey`](accum_types::PathKey)s to
//! [`Bag`]s, each a name-unique collection of artifacts. Keys are kept in
//! sorted order, so every enumeration (iteration, printing, snapshots) is
//! deterministic.
//!
//! # Components
//!
//! - [`Store`] -- adopt, lookup, remove, prune, attach, project
//! - [`Bag`] -- insertion-ordered artifacts under one key
//! - [`Entries`] / [`Iter`] -- lazy traversal in key then bag order
//! - [`View`] -- a mutable handle scoped to one key
//! - [`Diagnostics`] -- counted lookup-miss messages
//! - [`StoreConfig`] -- construction settings, also the snapshot header
//!
//! # Rules
//!
//! 1. Keys are only removed by pruning or clearing, never by removing artifacts.
//! 2. Artifact names are unique within a bag; adoption never overwrites.
//! 3. Only mergeable artifacts are adopted.
//! 4. A lookup miss is not an error: it returns `None` and is counted.

pub mod bag;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod iter;
pub mod size;
pub mod snapshot;
pub mod store;
pub mod view;

pub use bag::{Bag, DuplicateName};
pub use config::StoreConfig;
pub use diagnostics::Diagnostics;
pub use error::{AdoptError, AttachError, ModifyError, StoreError, StoreResult};
pub use iter::{Entries, Iter};
pub use size::artifact_size;
pub use snapshot::SNAPSHOT_VERSION;
pub use store::Store;
pub use view::View;
