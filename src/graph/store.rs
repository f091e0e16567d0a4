//! GraphStore - owner of the node/edge data every pipeline stage mutates.
//!
//! The GraphStore stores the graph topology using petgraph's StableGraph and
//! keeps positions in SoA (Structure of Arrays) buffers. Layout stages mutate
//! geometry only; once import has finished the node and edge sets never change.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::edge::{Edge, EdgeId, EdgeKind};
use super::node::{Node, NodeId};
use crate::error::GraphError;

/// Graph-level metadata carried from import to export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphMeta {
    pub creator: Option<String>,
    pub description: Option<String>,
    /// Kind assumed for edges that do not declare one.
    pub default_edge_kind: EdgeKind,
}

/// Per-edge attributes kept alongside the petgraph topology.
#[derive(Debug, Clone)]
struct EdgeRecord {
    key: Option<String>,
    source: NodeId,
    target: NodeId,
    weight: f64,
    kind: EdgeKind,
}

/// The graph store.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Position buffers in SoA layout
/// - Node attributes (label, size, mass, pinned)
/// - ID mapping between external keys and dense ids
///
/// Traversal is always in insertion order, which keeps layout runs and
/// exported files reproducible.
pub struct GraphStore {
    /// The underlying graph structure.
    /// Nodes store their dense NodeId, edges store their EdgeId.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Node attributes, indexed by NodeId
    nodes: Vec<Node>,

    /// Map from external key to NodeId
    key_to_id: HashMap<String, NodeId>,

    /// Edge attributes, indexed by EdgeId
    edges: Vec<EdgeRecord>,

    /// X positions (SoA layout)
    pos_x: Vec<f64>,

    /// Y positions (SoA layout)
    pos_y: Vec<f64>,

    meta: GraphMeta,
}

impl GraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            nodes: Vec::new(),
            key_to_id: HashMap::new(),
            edges: Vec::new(),
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            meta: GraphMeta::default(),
        }
    }

    /// Create a store with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            nodes: Vec::with_capacity(node_capacity),
            key_to_id: HashMap::with_capacity(node_capacity),
            edges: Vec::with_capacity(edge_capacity),
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            meta: GraphMeta::default(),
        }
    }

    /// Graph-level metadata.
    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    /// Mutable graph-level metadata.
    pub fn meta_mut(&mut self) -> &mut GraphMeta {
        &mut self.meta
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    ///
    /// Fails if a node with the same key already exists.
    pub fn add_node(&mut self, node: Node, x: f64, y: f64) -> Result<NodeId, GraphError> {
        if self.key_to_id.contains_key(&node.key) {
            return Err(GraphError::DuplicateNode { id: node.key });
        }

        let id = NodeId(self.nodes.len() as u32);
        let index = self.graph.add_node(id);
        debug_assert_eq!(index.index(), id.index());

        self.key_to_id.insert(node.key.clone(), id);
        self.nodes.push(node);
        self.pos_x.push(x);
        self.pos_y.push(y);

        Ok(id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node's dense id by its external key.
    pub fn node_id(&self, key: &str) -> Option<NodeId> {
        self.key_to_id.get(key).copied()
    }

    /// Get a node's attributes.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a node's attributes mutably.
    ///
    /// The key must not be changed through this reference.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Visit every node in insertion order together with its position.
    pub fn for_each_node<F>(&self, mut f: F)
    where
        F: FnMut(NodeId, &Node, (f64, f64)),
    {
        for (i, node) in self.nodes.iter().enumerate() {
            f(NodeId(i as u32), node, (self.pos_x[i], self.pos_y[i]));
        }
    }

    /// Get a node's position.
    pub fn position(&self, id: NodeId) -> Option<(f64, f64)> {
        let i = id.index();
        if i < self.pos_x.len() {
            Some((self.pos_x[i], self.pos_y[i]))
        } else {
            None
        }
    }

    /// Pin a node (exclude from displacement).
    pub fn pin_node(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.pinned = true;
        }
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge of the graph's default kind between two nodes identified
    /// by their keys.
    ///
    /// Fails with [`GraphError::UnknownEndpoint`] if either key is unknown.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64) -> Result<EdgeId, GraphError> {
        self.add_edge_with(None, source, target, weight, self.meta.default_edge_kind)
    }

    /// Add an edge with an explicit external key and kind.
    pub fn add_edge_with(
        &mut self,
        key: Option<String>,
        source: &str,
        target: &str,
        weight: f64,
        kind: EdgeKind,
    ) -> Result<EdgeId, GraphError> {
        let describe = |key: &Option<String>| match key {
            Some(key) => key.clone(),
            None => format!("{source} -> {target}"),
        };
        let source_id = self.node_id(source).ok_or_else(|| GraphError::UnknownEndpoint {
            edge: describe(&key),
            endpoint: source.to_string(),
        })?;
        let target_id = self.node_id(target).ok_or_else(|| GraphError::UnknownEndpoint {
            edge: describe(&key),
            endpoint: target.to_string(),
        })?;

        Ok(self.insert_edge(key, source_id, target_id, weight, kind))
    }

    /// Add an edge of the graph's default kind between two dense ids.
    pub fn add_edge_by_id(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
    ) -> Result<EdgeId, GraphError> {
        for endpoint in [source, target] {
            if endpoint.index() >= self.nodes.len() {
                return Err(GraphError::UnknownEndpoint {
                    edge: format!("{source} -> {target}"),
                    endpoint: endpoint.to_string(),
                });
            }
        }
        Ok(self.insert_edge(None, source, target, weight, self.meta.default_edge_kind))
    }

    fn insert_edge(
        &mut self,
        key: Option<String>,
        source: NodeId,
        target: NodeId,
        weight: f64,
        kind: EdgeKind,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.graph.add_edge(
            NodeIndex::new(source.index()),
            NodeIndex::new(target.index()),
            id,
        );
        self.edges.push(EdgeRecord {
            key,
            source,
            target,
            weight,
            kind,
        });
        id
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().enumerate().map(|(i, record)| Edge {
            id: EdgeId(i as u32),
            key: record.key.clone(),
            source: record.source,
            target: record.target,
            weight: record.weight,
            kind: record.kind,
        })
    }

    /// Visit every edge in insertion order.
    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(EdgeId, NodeId, NodeId, f64),
    {
        for (i, record) in self.edges.iter().enumerate() {
            f(EdgeId(i as u32), record.source, record.target, record.weight);
        }
    }

    /// Edge endpoints as slot indices with their weight, in insertion order.
    pub fn edge_slots(&self) -> Vec<(usize, usize, f64)> {
        self.edges
            .iter()
            .map(|record| (record.source.index(), record.target.index(), record.weight))
            .collect()
    }

    /// Number of edges ending at this node.
    pub fn in_degree(&self, id: NodeId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// Number of edges starting at this node.
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    fn degree(&self, id: NodeId, direction: Direction) -> usize {
        if id.index() >= self.nodes.len() {
            return 0;
        }
        self.graph
            .edges_directed(NodeIndex::new(id.index()), direction)
            .count()
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f64] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f64] {
        &self.pos_y
    }

    /// Borrow both position buffers mutably.
    pub fn positions_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.pos_x, &mut self.pos_y)
    }

    /// Node attributes in slot order.
    pub fn node_slice(&self) -> &[Node] {
        &self.nodes
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}
