//! Counted log of lookup misses.

use std::collections::BTreeMap;

/// A multiset of diagnostic messages: repeated messages bump a counter
/// instead of growing the log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    counts: BTreeMap<String, u64>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>) {
        *self.counts.entry(message.into()).or_insert(0) += 1;
    }

    /// Occurrences of `message` so far.
    pub fn count(&self, message: &str) -> u64 {
        self.counts.get(message).copied().unwrap_or(0)
    }

    /// Number of distinct messages.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// `(message, count)` pairs in message order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.counts.iter().map(|(m, c)| (m.clone(), *c)).collect()
    }

    /// One line per message: `{prefix} : message {msg} appeared {count} times`.
    pub fn render(&self, prefix: &str) -> String {
        let mut out = String::new();
        for (message, count) in &self.counts {
            out.push_str(&format!(
                "{prefix} : message {message} appeared {count:5} times\n"
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_messages_are_counted() {
        let mut d = Diagnostics::new();
        d.record("miss a");
        d.record("miss a");
        d.record("miss b");
        assert_eq!(d.len(), 2);
        assert_eq!(d.count("miss a"), 2);
        assert_eq!(d.count("never"), 0);
    }

    #[test]
    fn render_and_clear() {
        let mut d = Diagnostics::new();
        d.record("miss");
        d.record("miss");
        assert_eq!(d.render("HC"), "HC : message miss appeared     2 times\n");
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.render("HC"), "");
    }
}
