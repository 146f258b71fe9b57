use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::GraphError;

/// Capabilities the search engine needs from a graph.
///
/// Node handles are identities: two handles name the same node iff they
/// compare equal. The engine never mutates the graph; all per-search state is
/// kept in a table owned by the search call.
pub trait SearchGraph {
    type Node: Copy + Eq + Hash + Debug;
    /// Value handed to the heuristic for each node. Opaque to the engine.
    type Dist;

    /// Append the nodes adjacent to `node` to `out`.
    ///
    /// `diagonal` is a hint forwarded from the caller; implementations may
    /// ignore it.
    fn neighbors(&self, node: Self::Node, diagonal: bool, out: &mut Vec<Self::Node>);

    /// Whether `node` is impassable.
    fn is_wall(&self, node: Self::Node) -> bool;

    /// Cost of moving into `node` from any neighbor.
    fn cost(&self, node: Self::Node) -> f64;

    fn dist(&self, node: Self::Node) -> Self::Dist;
}

/// Node identifier for the adjacency-list [`Graph`].
pub type NodeId = u64;

/// Per-node data stored in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeInfo {
    /// Cost of entering this node.
    pub cost: f64,
    /// Precomputed estimate of the remaining cost to the goal. This is the
    /// node's `dist`, so the default [`manhattan`](crate::manhattan)
    /// heuristic returns it unchanged.
    pub estimate: f64,
    pub wall: bool,
}

impl NodeInfo {
    pub fn open(cost: f64, estimate: f64) -> Self {
        Self {
            cost,
            estimate,
            wall: false,
        }
    }

    pub fn wall() -> Self {
        Self {
            cost: 0.0,
            estimate: 0.0,
            wall: true,
        }
    }
}

/// Directed adjacency-list graph with per-node entry costs.
///
/// Edges are stored on their source node only; use [`Graph::connect`] for
/// undirected links. Both endpoints must be registered before an edge is
/// added.
#[derive(Debug, Clone)]
pub struct Graph {
    outgoing: HashMap<NodeId, Vec<NodeId>>,
    nodes: HashMap<NodeId, NodeInfo>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            outgoing: HashMap::new(),
            nodes: HashMap::new(),
        }
    }

    /// Pre-allocate for a known graph size.
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            outgoing: HashMap::with_capacity(node_count.min(edge_count)),
            nodes: HashMap::with_capacity(node_count),
        }
    }

    /// Register a node, or replace the info of an existing one (edges are kept).
    pub fn add_node(&mut self, id: NodeId, info: NodeInfo) -> Result<(), GraphError> {
        if !info.cost.is_finite() || info.cost < 0.0 {
            return Err(GraphError::InvalidCost {
                node: id,
                cost: info.cost,
            });
        }
        if !info.estimate.is_finite() || info.estimate < 0.0 {
            return Err(GraphError::InvalidEstimate {
                node: id,
                estimate: info.estimate,
            });
        }
        self.nodes.insert(id, info);
        Ok(())
    }

    /// Add a directed edge `from → to`.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.require(from)?;
        self.require(to)?;
        self.outgoing.entry(from).or_default().push(to);
        Ok(())
    }

    /// Add edges in both directions between `a` and `b`.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        self.require(a)?;
        self.require(b)?;
        self.outgoing.entry(a).or_default().push(b);
        self.outgoing.entry(b).or_default().push(a);
        Ok(())
    }

    /// Bulk load directed `(from, to)` edges. Stops at the first edge that
    /// names an unknown node; edges before it stay loaded.
    pub fn load_edges<I>(&mut self, edges: I) -> Result<(), GraphError>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        for (from, to) in edges {
            self.add_edge(from, to)?;
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(&id)
    }

    pub fn neighbors_out(&self, id: NodeId) -> &[NodeId] {
        self.outgoing.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(|v| v.len()).sum()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let nodes_mem = self.nodes.len() * (size_of::<NodeId>() + size_of::<NodeInfo>() + 16);
        let edges_mem: usize = self
            .outgoing
            .values()
            .map(|v| size_of::<NodeId>() + v.capacity() * size_of::<NodeId>())
            .sum();

        nodes_mem + edges_mem
    }

    fn require(&self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchGraph for Graph {
    type Node = NodeId;
    type Dist = f64;

    fn neighbors(&self, node: NodeId, _diagonal: bool, out: &mut Vec<NodeId>) {
        out.extend_from_slice(self.neighbors_out(node));
    }

    // Unregistered ids are treated as impassable.
    fn is_wall(&self, node: NodeId) -> bool {
        self.nodes.get(&node).map_or(true, |n| n.wall)
    }

    fn cost(&self, node: NodeId) -> f64 {
        self.nodes.get(&node).map_or(f64::INFINITY, |n| n.cost)
    }

    fn dist(&self, node: NodeId) -> f64 {
        self.nodes.get(&node).map_or(0.0, |n| n.estimate)
    }
}
