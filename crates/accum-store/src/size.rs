//! Approximate in-memory size of a store's artifacts.
//!
//! The model counts bin storage plus a fixed
//! per-artifact overhead, and ignores allocator and map bookkeeping.

use accum_types::Artifact;
use tracing::{info, warn};

use crate::store::Store;

/// Fixed per-artifact overhead for bin-based variants, in bytes.
pub const OVERHEAD: u64 = 8;

/// Bytes per stored double, used for error and profile columns.
const DOUBLE: u64 = 8;

/// Bytes per occupied sparse bin.
const SPARSE_BIN: u64 = 4;

/// Estimated size of one artifact, or `None` for variants the model does
/// not cover.
pub fn artifact_size(artifact: &Artifact) -> Option<u64> {
    let labels = (artifact.name().len() + artifact.title().len()) as u64;
    match artifact {
        Artifact::Histogram(h) => {
            let bins = h.bin_count() as u64;
            let mut size = OVERHEAD + bins * h.storage().bytes_per_bin() + labels;
            if h.has_sumw2() {
                size += bins * DOUBLE;
            }
            Some(size)
        }
        Artifact::Profile(p) => {
            let bins = p.bin_count() as u64;
            Some(OVERHEAD + bins * DOUBLE + bins * DOUBLE + labels)
        }
        Artifact::Sparse(s) => Some(s.occupied_bins() as u64 * SPARSE_BIN),
        Artifact::Counter(_) | Artifact::Graph(_) | Artifact::Opaque(_) => None,
    }
}

impl Store {
    /// Sum of [`artifact_size`] over every artifact. Unrecognized variants
    /// count as zero and are reported. With `show`, every artifact's size is
    /// emitted as an `info` event.
    pub fn estimate_size(&self, show: bool) -> u64 {
        let mut total = 0;
        for (key, artifact) in self.entries() {
            let Some(size) = artifact_size(artifact) else {
                warn!(
                    key = %key,
                    name = artifact.name(),
                    class = %artifact.class_tag(),
                    "cannot estimate size of this class"
                );
                continue;
            };
            if show {
                info!(
                    key = %key,
                    name = artifact.name(),
                    class = %artifact.class_tag(),
                    bytes = size,
                    "estimated size"
                );
            }
            total += size;
        }
        total
    }
}
