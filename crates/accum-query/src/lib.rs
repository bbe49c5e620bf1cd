//! Queries over an accum [`Store`](accum_store::Store).
//!
//! - [`select`] / [`matching_keys`] -- glob alternation patterns over keys,
//!   names and class tags
//! - [`get_sum`] -- combine all matches of an exact alternation pattern
//! - [`resolve`] -- full identifiers with an optional axis [`Action`]
//! - [`render`] / [`render_messages`] -- text reports
//!
//! Every pattern obeys the depth rule: a pattern with K path segments never
//! matches a key with a different number of segments.

pub mod action;
pub mod error;
pub mod pattern;
pub mod report;
pub mod select;
pub mod sum;

pub use action::{derived_name, resolve, split_action, Action, UnknownAction};
pub use error::{QueryError, QueryResult};
pub use pattern::{Alternation, MatchMode, ObjectPattern, SelectPattern};
pub use report::{render, render_messages, summary_line};
pub use select::{matching_keys, select, Selection};
pub use sum::get_sum;
