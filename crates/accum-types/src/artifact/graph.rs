use serde::{Deserialize, Serialize};

use crate::artifact::Mergeable;
use crate::error::MergeError;

/// A list of (x, y) points. Combining appends the other graph's points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    name: String,
    title: String,
    points: Vec<(f64, f64)>,
}

impl Graph {
    pub const CLASS_TAG: &'static str = "TGraph";

    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append a point.
    pub fn push(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Mean of the y values; NaN for an empty graph.
    pub fn mean_y(&self) -> f64 {
        self.points.iter().map(|(_, y)| y).sum::<f64>() / self.points.len() as f64
    }

    /// Root mean square deviation of the y values; NaN for an empty graph.
    pub fn rms_y(&self) -> f64 {
        let n = self.points.len() as f64;
        let mean = self.mean_y();
        let mean_sq = self.points.iter().map(|(_, y)| y * y).sum::<f64>() / n;
        (mean_sq - mean * mean).max(0.0).sqrt()
    }
}

impl Mergeable for Graph {
    fn combine(&mut self, other: &Self) -> Result<(), MergeError> {
        self.points.extend_from_slice(&other.points);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statistics() {
        let mut g = Graph::new("g", "t");
        g.push(0.0, 1.0);
        g.push(1.0, 3.0);
        assert_eq!(g.mean_y(), 2.0);
        assert_eq!(g.rms_y(), 1.0);
    }

    #[test]
    fn empty_graph_mean_is_not_finite() {
        assert!(!Graph::new("g", "t").mean_y().is_finite());
    }

    #[test]
    fn combine_appends() {
        let mut a = Graph::new("g", "t");
        a.push(0.0, 1.0);
        let mut b = Graph::new("g", "t");
        b.push(1.0, 2.0);
        a.combine(&b).unwrap();
        assert_eq!(a.len(), 2);
    }
}
