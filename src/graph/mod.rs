//! Graph data structures and operations.
//!
//! This module provides the GraphStore, which keeps the topology in petgraph's
//! StableGraph and the node geometry in Structure of Arrays (SoA) buffers so
//! the layout stages can sweep positions without chasing pointers.

mod edge;
mod node;
mod store;

pub use edge::{Edge, EdgeId, EdgeKind};
pub use node::{Node, NodeId};
pub use store::{GraphMeta, GraphStore};
