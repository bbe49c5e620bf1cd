//! Bin-grid histograms in one to three dimensions.

use serde::{Deserialize, Serialize};

use crate::artifact::axis::{Axis, BinStorage};
use crate::artifact::profile::Profile;
use crate::artifact::Mergeable;
use crate::error::{LayoutError, MergeError};

/// A fixed-binning histogram with under/overflow bins on every axis.
///
/// Decoding checks that `contents` (and `sumw2` when present) cover exactly
/// the grid spanned by the axes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramRepr")]
pub struct Histogram {
    name: String,
    title: String,
    storage: BinStorage,
    axes: Vec<Axis>,
    contents: Vec<f64>,
    /// Per-bin sum of squared weights, present when error tracking is on.
    sumw2: Option<Vec<f64>>,
    entries: f64,
}

impl Histogram {
    /// An empty 1-D histogram.
    pub fn new_1d(
        name: impl Into<String>,
        title: impl Into<String>,
        storage: BinStorage,
        x: Axis,
    ) -> Self {
        Self::with_axes(name.into(), title.into(), storage, vec![x])
    }

    /// An empty 2-D histogram.
    pub fn new_2d(
        name: impl Into<String>,
        title: impl Into<String>,
        storage: BinStorage,
        x: Axis,
        y: Axis,
    ) -> Self {
        Self::with_axes(name.into(), title.into(), storage, vec![x, y])
    }

    /// An empty 3-D histogram.
    pub fn new_3d(
        name: impl Into<String>,
        title: impl Into<String>,
        storage: BinStorage,
        x: Axis,
        y: Axis,
        z: Axis,
    ) -> Self {
        Self::with_axes(name.into(), title.into(), storage, vec![x, y, z])
    }

    fn with_axes(name: String, title: String, storage: BinStorage, axes: Vec<Axis>) -> Self {
        let total = axes.iter().map(Axis::total_bins).product();
        Self {
            name,
            title,
            storage,
            axes,
            contents: vec![0.0; total],
            sumw2: None,
            entries: 0.0,
        }
    }

    /// Turn on per-bin error tracking (sum of squared weights).
    ///
    /// Existing contents are assumed to be unit-weight fills.
    pub fn with_sumw2(mut self) -> Self {
        if self.sumw2.is_none() {
            self.sumw2 = Some(self.contents.clone());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn storage(&self) -> BinStorage {
        self.storage
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Number of axes, one to three.
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// `TH1F`, `TH2D`, ...
    pub fn class_tag(&self) -> String {
        format!("TH{}{}", self.dimension(), self.storage.suffix())
    }

    /// Total number of bins including under/overflow on every axis.
    pub fn bin_count(&self) -> usize {
        self.contents.len()
    }

    pub fn has_sumw2(&self) -> bool {
        self.sumw2.is_some()
    }

    /// Number of fills, summed across combines.
    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Fill at `coords` (one coordinate per axis) with `weight`.
    ///
    /// Returns `false` and leaves the histogram untouched when the number of
    /// coordinates does not match the dimension.
    pub fn fill(&mut self, coords: &[f64], weight: f64) -> bool {
        if coords.len() != self.axes.len() {
            return false;
        }
        let bins: Vec<usize> = self
            .axes
            .iter()
            .zip(coords)
            .map(|(axis, x)| axis.find_bin(*x))
            .collect();
        let global = self.global_bin(&bins);
        self.contents[global] += weight;
        if let Some(sumw2) = self.sumw2.as_mut() {
            sumw2[global] += weight * weight;
        }
        self.entries += 1.0;
        true
    }

    /// Content of the bin addressed by per-axis bin indices.
    pub fn bin_content(&self, bins: &[usize]) -> f64 {
        if bins.len() != self.axes.len()
            || bins.iter().zip(&self.axes).any(|(b, a)| *b >= a.total_bins())
        {
            return 0.0;
        }
        self.contents[self.global_bin(bins)]
    }

    /// Sum of in-range bin contents (under/overflow excluded).
    pub fn sum_of_weights(&self) -> f64 {
        let mut sum = 0.0;
        for (global, value) in self.contents.iter().enumerate() {
            if self.is_in_range(global) {
                sum += value;
            }
        }
        sum
    }

    fn global_bin(&self, bins: &[usize]) -> usize {
        let mut global = 0;
        let mut stride = 1;
        for (bin, axis) in bins.iter().zip(&self.axes) {
            global += bin * stride;
            stride *= axis.total_bins();
        }
        global
    }

    fn is_in_range(&self, mut global: usize) -> bool {
        for axis in &self.axes {
            let bin = global % axis.total_bins();
            if bin == 0 || bin > axis.nbins {
                return false;
            }
            global /= axis.total_bins();
        }
        true
    }

    fn require_2d(&self) -> Option<(&Axis, &Axis)> {
        match self.axes.as_slice() {
            [x, y] => Some((x, y)),
            _ => None,
        }
    }

    /// Project a 2-D histogram onto its x axis, summing over every y bin
    /// (flow bins included). `None` if the histogram is not 2-D.
    pub fn project_x(&self, name: &str) -> Option<Histogram> {
        self.project(name, 0)
    }

    /// Project a 2-D histogram onto its y axis. `None` if not 2-D.
    pub fn project_y(&self, name: &str) -> Option<Histogram> {
        self.project(name, 1)
    }

    fn project(&self, name: &str, keep: usize) -> Option<Histogram> {
        let (x, y) = self.require_2d()?;
        let kept = if keep == 0 { x } else { y };
        let mut out = Histogram::new_1d(name, self.title.clone(), BinStorage::Double, kept.clone());
        if self.sumw2.is_some() {
            out = out.with_sumw2();
        }
        for iy in 0..y.total_bins() {
            for ix in 0..x.total_bins() {
                let global = self.global_bin(&[ix, iy]);
                let target = if keep == 0 { ix } else { iy };
                out.contents[target] += self.contents[global];
                if let (Some(dst), Some(src)) = (out.sumw2.as_mut(), self.sumw2.as_ref()) {
                    dst[target] += src[global];
                }
            }
        }
        out.entries = self.entries;
        Some(out)
    }

    /// Profile of y versus x: for every x bin, the content-weighted mean of
    /// the in-range y bin centers. `None` if not 2-D.
    pub fn profile_x(&self, name: &str) -> Option<Profile> {
        self.profile(name, 0)
    }

    /// Profile of x versus y. `None` if not 2-D.
    pub fn profile_y(&self, name: &str) -> Option<Profile> {
        self.profile(name, 1)
    }

    fn profile(&self, name: &str, along: usize) -> Option<Profile> {
        let (x, y) = self.require_2d()?;
        let (outer, inner) = if along == 0 { (x, y) } else { (y, x) };
        let mut out = Profile::new(name, self.title.clone(), outer.clone());
        for io in 0..outer.total_bins() {
            for ii in 1..=inner.nbins {
                let bins = if along == 0 { [io, ii] } else { [ii, io] };
                let w = self.contents[self.global_bin(&bins)];
                if w != 0.0 {
                    out.accumulate_bin(io, inner.center(ii), w);
                }
            }
        }
        out.set_entries(self.entries);
        Some(out)
    }
}

#[derive(Deserialize)]
struct HistogramRepr {
    name: String,
    title: String,
    storage: BinStorage,
    axes: Vec<Axis>,
    contents: Vec<f64>,
    #[serde(default)]
    sumw2: Option<Vec<f64>>,
    entries: f64,
}

impl TryFrom<HistogramRepr> for Histogram {
    type Error = LayoutError;

    fn try_from(raw: HistogramRepr) -> Result<Self, Self::Error> {
        if !(1..=3).contains(&raw.axes.len()) {
            return Err(LayoutError::Axes {
                name: raw.name,
                reason: format!("{} axes, expected one to three", raw.axes.len()),
            });
        }
        let Some(expected) = Axis::grid_bins(&raw.axes) else {
            return Err(LayoutError::Axes {
                name: raw.name,
                reason: "bin count overflows".into(),
            });
        };
        let columns = [("contents", Some(&raw.contents)), ("sumw2", raw.sumw2.as_ref())];
        for (column, values) in columns {
            if let Some(values) = values.filter(|v| v.len() != expected) {
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
            storage: raw.storage,
            axes: raw.axes,
            contents: raw.contents,
            sumw2: raw.sumw2,
            entries: raw.entries,
        })
    }
}

impl Mergeable for Histogram {
    fn combine(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.storage != other.storage || self.axes.len() != other.axes.len() {
            return Err(MergeError::TypeMismatch {
                expected: self.class_tag(),
                actual: other.class_tag(),
            });
        }
        if self.axes != other.axes {
            return Err(MergeError::ShapeMismatch {
                name: self.name.clone(),
                reason: "axis binning differs".into(),
            });
        }
        if other.sumw2.is_some() && self.sumw2.is_none() {
            self.sumw2 = Some(self.contents.clone());
        }
        if let Some(sumw2) = self.sumw2.as_mut() {
            let addend = other.sumw2.as_ref().unwrap_or(&other.contents);
            for (dst, src) in sumw2.iter_mut().zip(addend) {
                *dst += src;
            }
        }
        for (dst, src) in self.contents.iter_mut().zip(&other.contents) {
            *dst += src;
        }
        self.entries += other.entries;
        Ok(())
    }
}
