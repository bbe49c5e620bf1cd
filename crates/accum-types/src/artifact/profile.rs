use serde::{Deserialize, Serialize};

use crate::artifact::axis::Axis;
use crate::artifact::Mergeable;
use crate::error::{LayoutError, MergeError};

/// A one-dimensional profile: per x bin, the weighted mean of y.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRepr")]
pub struct Profile {
    name: String,
    title: String,
    axis: Axis,
    sum_w: Vec<f64>,
    sum_wy: Vec<f64>,
    sum_wy2: Vec<f64>,
    entries: f64,
}

impl Profile {
    pub const CLASS_TAG: &'static str = "TProfile";

    /// An empty profile over `axis`.
    pub fn new(name: impl Into<String>, title: impl Into<String>, axis: Axis) -> Self {
        let total = axis.total_bins();
        Self {
            name: name.into(),
            title: title.into(),
            axis,
            sum_w: vec![0.0; total],
            sum_wy: vec![0.0; total],
            sum_wy2: vec![0.0; total],
            entries: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Total bins including under/overflow.
    pub fn bin_count(&self) -> usize {
        self.sum_w.len()
    }

    /// Record `y` with `weight` in the bin containing `x`.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) {
        let bin = self.axis.find_bin(x);
        self.accumulate_bin(bin, y, weight);
        self.entries += 1.0;
    }

    pub(crate) fn accumulate_bin(&mut self, bin: usize, y: f64, weight: f64) {
        self.sum_w[bin] += weight;
        self.sum_wy[bin] += weight * y;
        self.sum_wy2[bin] += weight * y * y;
    }

    pub(crate) fn set_entries(&mut self, entries: f64) {
        self.entries = entries;
    }

    /// Weighted mean of y in `bin`, `None` for an empty bin.
    pub fn mean(&self, bin: usize) -> Option<f64> {
        let w = *self.sum_w.get(bin)?;
        (w != 0.0).then(|| self.sum_wy[bin] / w)
    }

    /// Sum of weights over in-range bins.
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_w[1..=self.axis.nbins].iter().sum()
    }
}

#[derive(Deserialize)]
struct ProfileRepr {
    name: String,
    title: String,
    axis: Axis,
    sum_w: Vec<f64>,
    sum_wy: Vec<f64>,
    sum_wy2: Vec<f64>,
    entries: f64,
}

impl TryFrom<ProfileRepr> for Profile {
    type Error = LayoutError;

    fn try_from(raw: ProfileRepr) -> Result<Self, Self::Error> {
        let Some(expected) = raw.axis.nbins.checked_add(2) else {
            return Err(LayoutError::Axes {
                name: raw.name,
                reason: "bin count overflows".into(),
            });
        };
        let columns = [
            ("sum_w", &raw.sum_w),
            ("sum_wy", &raw.sum_wy),
            ("sum_wy2", &raw.sum_wy2),
        ];
        for (column, values) in columns {
            if values.len() != expected {
                return Err(LayoutError::BinCount {
                    name: raw.name,
                    column,
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(Self {
            name: raw.name,
            title: raw.title,
            axis: raw.axis,
            sum_w: raw.sum_w,
            sum_wy: raw.sum_wy,
            sum_wy2: raw.sum_wy2,
            entries: raw.entries,
        })
    }
}

impl Mergeable for Profile {
    fn combine(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.axis != other.axis {
            return Err(MergeError::ShapeMismatch {
                name: self.name.clone(),
                reason: "profile binning differs".into(),
            });
        }
        let columns = [
            (&mut self.sum_w, &other.sum_w),
            (&mut self.sum_wy, &other.sum_wy),
            (&mut self.sum_wy2, &other.sum_wy2),
        ];
        for (dst, src) in columns {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += s;
            }
        }
        self.entries += other.entries;
        Ok(())
    }
}
