//! Degree-based node sizing.
//!
//! Ranks nodes by in- or out-degree and maps the degree linearly onto
//! `[min_size, max_size]`. Runs before the layout because sizes feed the
//! overlap passes.

use tracing::debug;

use crate::config::{SizingConfig, SizingMode};
use crate::graph::{GraphStore, NodeId};

/// Resize nodes according to `config`. Returns whether any size was changed.
pub fn apply_sizing(store: &mut GraphStore, config: &SizingConfig) -> bool {
    let degree: fn(&GraphStore, NodeId) -> usize = match config.mode {
        SizingMode::Keep => return false,
        SizingMode::InDegree => GraphStore::in_degree,
        SizingMode::OutDegree => GraphStore::out_degree,
    };
    if store.is_empty() {
        return false;
    }

    let degrees: Vec<usize> = (0..store.node_count())
        .map(|i| degree(store, NodeId(i as u32)))
        .collect();
    let lo = degrees.iter().copied().min().unwrap_or(0);
    let hi = degrees.iter().copied().max().unwrap_or(0);
    let span = (hi - lo) as f64;

    for (i, &d) in degrees.iter().enumerate() {
        let size = if span == 0.0 {
            config.min_size
        } else {
            config.min_size + (d - lo) as f64 / span * (config.max_size - config.min_size)
        };
        if let Some(node) = store.node_mut(NodeId(i as u32)) {
            node.size = size;
        }
    }

    debug!(mode = ?config.mode, min_degree = lo, max_degree = hi, "node sizes assigned");
    true
}
