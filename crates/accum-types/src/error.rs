use thiserror::Error;

/// Errors produced when parsing or slicing a [`PathKey`](crate::PathKey).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The key string is malformed (for example, not `/`-prefixed).
    #[error("malformed key {key:?}: {reason}")]
    Format { key: String, reason: String },

    /// A segment index outside `[-1, segment_count)` was requested.
    #[error("segment index {index} out of range for key {key} with {count} segments")]
    Index {
        key: String,
        index: isize,
        count: usize,
    },
}

/// Errors produced by [`Mergeable::combine`](crate::Mergeable::combine).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The two operands have different class tags.
    #[error("cannot combine {actual} into {expected}")]
    TypeMismatch { expected: String, actual: String },

    /// The variant does not support combination at all.
    #[error("artifact of class {class} is not mergeable")]
    NotMergeable { class: String },

    /// Same class, but the binning or dimensionality differs.
    #[error("cannot combine {name}: {reason}")]
    ShapeMismatch { name: String, reason: String },
}

/// A decoded artifact whose stored bins do not fit its axes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// A per-bin column has the wrong length for the declared axes.
    #[error("{name}: {column} holds {actual} bins, the axes require {expected}")]
    BinCount {
        name: String,
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The axes describe an impossible grid (wrong dimension or too many bins).
    #[error("{name}: invalid axes: {reason}")]
    Axes { name: String, reason: String },

    /// A sparse bin has the wrong arity or breaks the coordinate order.
    #[error("{name}: invalid sparse bin at position {position}: {reason}")]
    SparseBin {
        name: String,
        position: usize,
        reason: String,
    },
}
