//! Error types for store operations.

use accum_types::{KeyError, PathKey};
use thiserror::Error;

/// Errors from [`Store::adopt`](crate::Store::adopt).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdoptError {
    /// An artifact with the same name already exists under the key.
    #[error("cannot adopt an already existing object: {key} -> {name}")]
    Duplicate { key: PathKey, name: String },

    /// The artifact's variant has no combine capability.
    #[error("cannot adopt {name} at {key}: class {class} is not mergeable")]
    NotMergeable {
        key: PathKey,
        name: String,
        class: String,
    },
}

/// Errors from [`Store::attach`](crate::Store::attach).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttachError {
    /// The graft target already exists and overwriting was not requested.
    #[error("{0} already exists; will not overwrite it")]
    Exists(PathKey),

    /// Overwriting was requested but pruning the existing subtree removed
    /// nothing.
    #[error("could not prune pre-existing {0}")]
    PruneFailed(PathKey),
}

/// Errors from [`Bag::modify`](crate::Bag::modify). The artifact is rolled
/// back before either is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModifyError {
    #[error("object {name} may not be renamed to {renamed}")]
    Renamed { name: String, renamed: String },

    #[error("object {name} may not become class {class}, which is not mergeable")]
    NotMergeable { name: String, class: String },
}

/// Umbrella error for store operations that take raw strings or touch I/O.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error(transparent)]
    Adopt(#[from] AdoptError),

    #[error(transparent)]
    Attach(#[from] AttachError),

    #[error(transparent)]
    Modify(#[from] ModifyError),

    /// Snapshot encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
