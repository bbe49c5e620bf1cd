use accum_types::{KeyError, MergeError};
use thiserror::Error;

/// Errors produced by selection, summation and identifier resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The pattern could not be parsed or compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// A reduction step failed to combine two matches.
    #[error("merge error: {0}")]
    Merge(#[from] MergeError),
}

pub type QueryResult<T> = Result<T, QueryError>;
