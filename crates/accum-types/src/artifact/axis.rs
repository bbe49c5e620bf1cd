use serde::{Deserialize, Serialize};

/// Numeric width a producer declared for per-bin storage.
///
/// Contents are always accumulated as `f64`; the declared width drives the
/// class tag (`TH1F`, `TH2D`, ...) and the memory estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinStorage {
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl BinStorage {
    /// Class-name suffix for this storage width.
    pub fn suffix(&self) -> char {
        match self {
            BinStorage::Char => 'C',
            BinStorage::Short => 'S',
            BinStorage::Int => 'I',
            BinStorage::Float => 'F',
            BinStorage::Double => 'D',
        }
    }

    /// Bytes used per bin.
    pub fn bytes_per_bin(&self) -> u64 {
        match self {
            BinStorage::Char => 1,
            BinStorage::Short => 2,
            BinStorage::Int | BinStorage::Float => 4,
            BinStorage::Double => 8,
        }
    }
}

/// A fixed-width binning along one dimension.
///
/// Bin `0` is the underflow bin and bin `nbins + 1` the overflow bin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub nbins: usize,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    pub fn new(nbins: usize, min: f64, max: f64) -> Self {
        Self { nbins, min, max }
    }

    /// Number of bins including underflow and overflow.
    pub fn total_bins(&self) -> usize {
        self.nbins + 2
    }

    /// Bin index for a coordinate, with flow bins at both ends.
    pub fn find_bin(&self, x: f64) -> usize {
        if x.is_nan() || x < self.min {
            return 0;
        }
        if x >= self.max || self.nbins == 0 {
            return self.nbins + 1;
        }
        let width = (self.max - self.min) / self.nbins as f64;
        let bin = ((x - self.min) / width) as usize + 1;
        bin.min(self.nbins)
    }

    /// Total bins of the grid spanned by `axes`, or `None` on overflow.
    pub(crate) fn grid_bins(axes: &[Axis]) -> Option<usize> {
        axes.iter()
            .try_fold(1usize, |acc, axis| acc.checked_mul(axis.nbins.checked_add(2)?))
    }

    /// Center of an in-range bin.
    pub fn center(&self, bin: usize) -> f64 {
        let width = (self.max - self.min) / self.nbins.max(1) as f64;
        self.min + (bin as f64 - 0.5) * width
    }
}
