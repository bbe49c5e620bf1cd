use serde::{Deserialize, Serialize};

use crate::artifact::axis::{Axis, BinStorage};
use crate::artifact::Mergeable;
use crate::error::{LayoutError, MergeError};

/// One occupied bin of a sparse histogram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseBin {
    pub coords: Vec<usize>,
    pub content: f64,
}

/// An N-dimensional histogram that only stores occupied bins.
///
/// Occupied bins are kept sorted by coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparseRepr")]
pub struct SparseHistogram {
    name: String,
    title: String,
    storage: BinStorage,
    axes: Vec<Axis>,
    bins: Vec<SparseBin>,
    entries: f64,
}

impl SparseHistogram {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        storage: BinStorage,
        axes: Vec<Axis>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            storage,
            axes,
            bins: Vec::new(),
            entries: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// `THnSparseF`, `THnSparseD`, ...
    pub fn class_tag(&self) -> String {
        format!("THnSparse{}", self.storage.suffix())
    }

    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Number of occupied bins.
    pub fn occupied_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn fill(&mut self, coords: &[f64], weight: f64) -> bool {
        if coords.len() != self.axes.len() {
            return false;
        }
        let bin: Vec<usize> = self
            .axes
            .iter()
            .zip(coords)
            .map(|(axis, x)| axis.find_bin(*x))
            .collect();
        self.add_to_bin(bin, weight);
        self.entries += 1.0;
        true
    }

    pub fn bin_content(&self, coords: &[usize]) -> f64 {
        self.bins
            .binary_search_by(|b| b.coords.as_slice().cmp(coords))
            .map(|i| self.bins[i].content)
            .unwrap_or(0.0)
    }

    fn add_to_bin(&mut self, coords: Vec<usize>, weight: f64) {
        match self
            .bins
            .binary_search_by(|b| b.coords.as_slice().cmp(coords.as_slice()))
        {
            Ok(i) => self.bins[i].content += weight,
            Err(i) => self.bins.insert(
                i,
                SparseBin {
                    coords,
                    content: weight,
                },
            ),
        }
    }
}

#[derive(Deserialize)]
struct SparseRepr {
    name: String,
    title: String,
    storage: BinStorage,
    axes: Vec<Axis>,
    bins: Vec<SparseBin>,
    entries: f64,
}

impl TryFrom<SparseRepr> for SparseHistogram {
    type Error = LayoutError;

    fn try_from(raw: SparseRepr) -> Result<Self, Self::Error> {
        let invalid = |position: usize, reason: String| LayoutError::SparseBin {
            name: raw.name.clone(),
            position,
            reason,
        };
        for (position, bin) in raw.bins.iter().enumerate() {
            if bin.coords.len() != raw.axes.len() {
                return Err(invalid(
                    position,
                    format!("{} coordinates for {} axes", bin.coords.len(), raw.axes.len()),
                ));
            }
            if bin.coords.iter().zip(&raw.axes).any(|(c, a)| *c > a.nbins.saturating_add(1)) {
                return Err(invalid(position, "coordinate outside the axis".into()));
            }
            if position > 0 && raw.bins[position - 1].coords >= bin.coords {
                return Err(invalid(position, "bins not in strictly ascending order".into()));
            }
        }
        Ok(Self {
            name: raw.name,
            title: raw.title,
            storage: raw.storage,
            axes: raw.axes,
            bins: raw.bins,
            entries: raw.entries,
        })
    }
}

impl Mergeable for SparseHistogram {
    fn combine(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.axes != other.axes {
            return Err(MergeError::ShapeMismatch {
                name: self.name.clone(),
                reason: format!(
                    "sparse axes differ ({} vs {} dimensions)",
                    self.axes.len(),
                    other.axes.len()
                ),
            });
        }
        for bin in &other.bins {
            self.add_to_bin(bin.coords.clone(), bin.content);
        }
        self.entries += other.entries;
        Ok(())
    }
}
