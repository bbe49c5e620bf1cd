//! Mergeable artifacts.
//!
//! [`Artifact`] is a closed enumeration of the accumulator kinds a store can
//! hold. Every variant implements [`Mergeable`]; combination between two
//! artifacts is only attempted when their class tags are equal.

pub mod axis;
pub mod counter;
pub mod graph;
pub mod histogram;
pub mod opaque;
pub mod profile;
pub mod sparse;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;

pub use axis::{Axis, BinStorage};
pub use counter::Counter;
pub use graph::Graph;
pub use histogram::Histogram;
pub use opaque::Opaque;
pub use profile::Profile;
pub use sparse::{SparseBin, SparseHistogram};

/// The combine capability: fold `other` into `self`.
pub trait Mergeable {
    /// Combine `other` into `self`.
    ///
    /// Implementations must leave `self` untouched when they return an error.
    fn combine(&mut self, other: &Self) -> Result<(), MergeError>;
}

/// A named accumulator held by a bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Counter(Counter),
    Histogram(Histogram),
    Profile(Profile),
    Sparse(SparseHistogram),
    Graph(Graph),
    Opaque(Opaque),
}

impl Artifact {
    /// The name, unique within a bag.
    pub fn name(&self) -> &str {
        match self {
            Artifact::Counter(c) => c.name(),
            Artifact::Histogram(h) => h.name(),
            Artifact::Profile(p) => p.name(),
            Artifact::Sparse(s) => s.name(),
            Artifact::Graph(g) => g.name(),
            Artifact::Opaque(o) => &o.name,
        }
    }

    /// Human-readable title; empty for variants without one.
    pub fn title(&self) -> &str {
        match self {
            Artifact::Histogram(h) => h.title(),
            Artifact::Profile(p) => p.title(),
            Artifact::Sparse(s) => s.title(),
            Artifact::Graph(g) => g.title(),
            Artifact::Counter(_) | Artifact::Opaque(_) => "",
        }
    }

    /// Type identifier used for type checks, class filters and removal.
    pub fn class_tag(&self) -> String {
        match self {
            Artifact::Counter(_) => Counter::CLASS_TAG.to_string(),
            Artifact::Histogram(h) => h.class_tag(),
            Artifact::Profile(_) => Profile::CLASS_TAG.to_string(),
            Artifact::Sparse(s) => s.class_tag(),
            Artifact::Graph(_) => Graph::CLASS_TAG.to_string(),
            Artifact::Opaque(o) => o.class.clone(),
        }
    }

    /// Whether the artifact holds no entries.
    ///
    /// Only meaningful for histogram-like variants; every other variant
    /// reports `false` and is therefore never pruned as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Artifact::Histogram(h) => h.entries() == 0.0,
            Artifact::Profile(p) => p.entries() == 0.0,
            _ => false,
        }
    }

    /// Whether the variant supports [`Mergeable::combine`] at all.
    pub fn is_mergeable(&self) -> bool {
        !matches!(self, Artifact::Opaque(_))
    }

    /// Histogram-like variants are the ones addressable through axis actions.
    pub fn is_histogram_like(&self) -> bool {
        matches!(self, Artifact::Histogram(_) | Artifact::Profile(_))
    }

    /// The inner value if this is a histogram.
    pub fn as_histogram(&self) -> Option<&Histogram> {
        match self {
            Artifact::Histogram(h) => Some(h),
            _ => None,
        }
    }

    /// The inner value if this is a profile.
    pub fn as_profile(&self) -> Option<&Profile> {
        match self {
            Artifact::Profile(p) => Some(p),
            _ => None,
        }
    }

    /// The inner value if this is a counter.
    pub fn as_counter(&self) -> Option<&Counter> {
        match self {
            Artifact::Counter(c) => Some(c),
            _ => None,
        }
    }

    /// The inner value if this is a sparse histogram.
    pub fn as_sparse(&self) -> Option<&SparseHistogram> {
        match self {
            Artifact::Sparse(s) => Some(s),
            _ => None,
        }
    }

    /// The inner value if this is a graph.
    pub fn as_graph(&self) -> Option<&Graph> {
        match self {
            Artifact::Graph(g) => Some(g),
            _ => None,
        }
    }
}

impl Mergeable for Artifact {
    fn combine(&mut self, other: &Self) -> Result<(), MergeError> {
        let (expected, actual) = (self.class_tag(), other.class_tag());
        if expected != actual {
            return Err(MergeError::TypeMismatch { expected, actual });
        }
        match (self, other) {
            (Artifact::Counter(a), Artifact::Counter(b)) => a.combine(b),
            (Artifact::Histogram(a), Artifact::Histogram(b)) => a.combine(b),
            (Artifact::Profile(a), Artifact::Profile(b)) => a.combine(b),
            (Artifact::Sparse(a), Artifact::Sparse(b)) => a.combine(b),
            (Artifact::Graph(a), Artifact::Graph(b)) => a.combine(b),
            (Artifact::Opaque(_), _) | (_, Artifact::Opaque(_)) => {
                Err(MergeError::NotMergeable { class: expected })
            }
            _ => Err(MergeError::TypeMismatch { expected, actual }),
        }
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Artifact {
                fn from(value: $ty) -> Self {
                    Artifact::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant! {
    Counter => Counter,
    Histogram => Histogram,
    Profile => Profile,
    SparseHistogram => Sparse,
    Graph => Graph,
    Opaque => Opaque,
}
