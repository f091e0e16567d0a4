//! Spatial indexing for the overlap passes.
//!
//! This module provides an R-tree over node bounding boxes so overlap
//! detection only tests pairs whose envelopes intersect.

mod rtree;

pub use rtree::{BoxIndex, NodeBox};
