//! Edge type and related structures.
//!
//! Edges are the connections between nodes. Each edge has:
//! - A dense identifier (insertion order)
//! - An optional external identifier carried through import/export
//! - Source and target node IDs
//! - Weight, which scales the attractive force
//! - Kind (directed or undirected)

use std::fmt;

use super::node::NodeId;

/// Dense edge identifier, assigned in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Create a new EdgeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

impl From<u32> for EdgeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<EdgeId> for u32 {
    #[inline]
    fn from(id: EdgeId) -> Self {
        id.0
    }
}

/// Whether the endpoints of an edge are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    #[default]
    Directed,
    Undirected,
    /// GEXF "mutual": directed both ways.
    Mutual,
}

impl EdgeKind {
    /// The GEXF attribute value for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Directed => "directed",
            EdgeKind::Undirected => "undirected",
            EdgeKind::Mutual => "mutual",
        }
    }

    /// Parse a GEXF edge type.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "directed" => Some(EdgeKind::Directed),
            "undirected" => Some(EdgeKind::Undirected),
            "mutual" => Some(EdgeKind::Mutual),
            _ => None,
        }
    }
}

/// A resolved edge, as returned by the store's traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    /// External identifier, if the source file carried one.
    pub key: Option<String>,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
    pub kind: EdgeKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Edge(42)");
    }

    #[test]
    fn test_edge_kind_parse() {
        assert_eq!(EdgeKind::parse("directed"), Some(EdgeKind::Directed));
        assert_eq!(EdgeKind::parse("undirected"), Some(EdgeKind::Undirected));
        assert_eq!(EdgeKind::parse("mutual"), Some(EdgeKind::Mutual));
        assert_eq!(EdgeKind::parse("sideways"), None);
        assert_eq!(EdgeKind::default(), EdgeKind::Directed);
        assert_eq!(EdgeKind::Undirected.as_str(), "undirected");
    }
}
