use serde::{Deserialize, Serialize};

use crate::artifact::Mergeable;
use crate::error::MergeError;

/// An additive scalar accumulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    name: String,
    value: f64,
    entries: u64,
}

impl Counter {
    pub const CLASS_TAG: &'static str = "Counter";

    /// A counter at zero with no increments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            entries: 0,
        }
    }

    /// A counter that already holds `value` from a single increment.
    pub fn with_value(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            entries: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accumulated total.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of increments folded in.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Add `amount` as one more increment.
    pub fn add(&mut self, amount: f64) {
        self.value += amount;
        self.entries += 1;
    }
}

impl Mergeable for Counter {
    fn combine(&mut self, other: &Self) -> Result<(), MergeError> {
        self.value += other.value;
        self.entries += other.entries;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_additive() {
        let mut a = Counter::with_value("h1", 3.0);
        a.combine(&Counter::with_value("h1", 5.0)).unwrap();
        assert_eq!(a.value(), 8.0);
        assert_eq!(a.entries(), 2);
    }
}
