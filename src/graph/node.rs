//! Node type and related structures.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A dense internal identifier (its slot in the position buffers)
//! - The external identifier it was imported with
//! - An optional label, a size (radius) and a mass
//! - Pinned state (never displaced by the layout stages when true)
//!
//! Positions are not stored here; they live in the store's SoA buffers.

use std::fmt;

/// Dense node identifier.
///
/// Node ids are assigned in insertion order and double as the slot index into
/// the store's position buffers. Nodes are never removed during a pipeline run,
/// so the id space has no holes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Slot index into the position buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Attributes of a node, excluding its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// External identifier, unique within a store.
    pub key: String,
    /// Optional label text, rendered next to the node.
    pub label: Option<String>,
    /// Radius of the node's bounding circle.
    pub size: f64,
    /// Mass used to split overlap corrections (default: 1.0).
    pub mass: f64,
    /// Pinned nodes exert forces but are never moved.
    pub pinned: bool,
}

impl Node {
    /// Default node radius, matching Gephi's default node size.
    pub const DEFAULT_SIZE: f64 = 10.0;

    /// Create a node with default size and unit mass.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            size: Self::DEFAULT_SIZE,
            mass: 1.0,
            pinned: false,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the size (radius).
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Set the mass.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Inverse mass used when distributing corrections.
    ///
    /// Pinned nodes behave as infinitely heavy and return 0.
    #[inline]
    pub fn inverse_mass(&self) -> f64 {
        if self.pinned || self.mass <= 0.0 || !self.mass.is_finite() {
            0.0
        } else {
            1.0 / self.mass
        }
    }
}
