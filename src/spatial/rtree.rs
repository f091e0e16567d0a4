//! R-tree based broad phase using the rstar crate.
//!
//! Every node's bounding shape is inserted as an axis-aligned box. Candidate
//! pairs are the boxes whose envelopes intersect; the exact shape test runs
//! afterwards on this much smaller set.

use rstar::{AABB, RTree, RTreeObject};

/// A node's axis-aligned bounding box in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    /// Slot of the node in the store.
    pub slot: usize,
    /// Lower corner.
    pub min: [f64; 2],
    /// Upper corner.
    pub max: [f64; 2],
}

impl NodeBox {
    pub fn new(slot: usize, min: [f64; 2], max: [f64; 2]) -> Self {
        Self { slot, min, max }
    }
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Spatial index over node bounding boxes.
///
/// The index is immutable once built; overlap passes rebuild it every
/// iteration because every node may have moved.
pub struct BoxIndex {
    tree: RTree<NodeBox>,
}

impl BoxIndex {
    /// Build the index from a list of boxes.
    ///
    /// Bulk loading produces a better balanced tree than incremental inserts.
    pub fn build(boxes: Vec<NodeBox>) -> Self {
        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// Every pair `(i, j)` with `i < j` whose boxes intersect, sorted.
    ///
    /// The order does not depend on the tree's internal layout, so callers
    /// that accumulate floating-point sums over the pairs stay deterministic.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for node in self.tree.iter() {
            let envelope = node.envelope();
            for other in self.tree.locate_in_envelope_intersecting(&envelope) {
                if node.slot < other.slot {
                    pairs.push((node.slot, other.slot));
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Get the number of boxes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
