//! Schematic hydrologic network graph
//!
//! Nodes carry a diagram layout position and a single downstream link; the
//! upstream-to-downstream parent/child chain is the network's topology.
//! The annotation engine only reads this graph (node lookup and the ordered
//! sequence between two nodes); mutation belongs to the network editor.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::geometry::Point;

/// Per-node hint for where its label is placed relative to the symbol
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelPosition {
    /// No explicit hint; the view decides (defaults to above)
    #[default]
    Auto,
    Above,
    Below,
}

/// One node of the schematic network
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    /// Layout position in diagram paper space
    pub position: Point,
    /// Label placement hint from the network layout
    #[serde(default)]
    pub label_position: LabelPosition,
    /// Symbol diameter in diagram units
    pub symbol_size: f64,
}

impl NetworkNode {
    /// Create a node with default label placement and symbol size
    pub fn new(id: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            label_position: LabelPosition::Auto,
            symbol_size: 6.0,
        }
    }

    /// Set the label placement hint
    pub fn with_label_position(mut self, pos: LabelPosition) -> Self {
        self.label_position = pos;
        self
    }
}

/// The network graph: node storage plus the downstream chain
#[derive(Debug, Default)]
pub struct NetworkGraph {
    nodes: Vec<NetworkNode>,
    index: HashMap<String, usize>,
    /// Downstream link per node, parallel to `nodes`
    downstream: Vec<Option<usize>>,
}

impl NetworkGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node; duplicate ids are rejected
    pub fn add_node(&mut self, node: NetworkNode) -> anyhow::Result<()> {
        if self.index.contains_key(&node.id) {
            return Err(anyhow!("duplicate network node id {}", node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        self.downstream.push(None);
        Ok(())
    }

    /// Link a node to its downstream neighbor
    pub fn set_downstream(&mut self, id: &str, downstream_id: &str) -> anyhow::Result<()> {
        let from = *self
            .index
            .get(id)
            .ok_or_else(|| anyhow!("unknown network node {id}"))?;
        let to = *self
            .index
            .get(downstream_id)
            .ok_or_else(|| anyhow!("unknown network node {downstream_id}"))?;
        self.downstream[from] = Some(to);
        Ok(())
    }

    /// Look up a node by identifier
    pub fn find_node(&self, id: &str) -> Option<&NetworkNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Ordered node sequence connecting two nodes, endpoints included
    ///
    /// Follows the topological downstream chain: first tries walking from
    /// `a` down to `b`; failing that, walks from `b` down to `a` and
    /// reverses so the result always runs from `a` to `b`. Empty when
    /// either id is unknown or the nodes are not on one chain.
    pub fn node_sequence(&self, a: &str, b: &str) -> Vec<&NetworkNode> {
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            return Vec::new();
        };
        if let Some(path) = self.walk_downstream(ia, ib) {
            return path.iter().map(|&i| &self.nodes[i]).collect();
        }
        if let Some(mut path) = self.walk_downstream(ib, ia) {
            path.reverse();
            return path.iter().map(|&i| &self.nodes[i]).collect();
        }
        Vec::new()
    }

    /// Follow downstream links from `from` until `to` is reached
    ///
    /// Bounded by the node count so a malformed chain with a cycle
    /// terminates instead of looping.
    fn walk_downstream(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        let mut path = vec![from];
        let mut current = from;
        for _ in 0..self.nodes.len() {
            if current == to {
                return Some(path);
            }
            current = self.downstream[current]?;
            path.push(current);
        }
        if current == to { Some(path) } else { None }
    }
}
