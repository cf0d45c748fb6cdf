// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Directed graph store used by the rewrite stages.
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use thiserror::Error;

use crate::ident::NodeId;
use crate::loader::GraphNode;
use crate::raw::WidgetValues;

/// Structural errors raised while building or ordering a [`DirectedGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two nodes share an identifier.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),
    /// A node names a predecessor that is not part of the graph.
    #[error("node {node} references missing predecessor {predecessor}")]
    DanglingPredecessor {
        /// Consumer node.
        node: NodeId,
        /// Identifier that has no node.
        predecessor: NodeId,
    },
    /// The graph is not acyclic; `nodes` could not be ordered.
    #[error("cycle detected among nodes {nodes:?}")]
    Cycle {
        /// Nodes left over after topological sorting, ascending.
        nodes: Vec<NodeId>,
    },
}

/// Attributes carried by a graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Node type tag.
    pub ty: String,
    /// Widget values, or `None` when the node has none.
    pub config: Option<WidgetValues>,
}

/// Predecessor/successor store keyed by [`NodeId`].
///
/// Edges form a set: inserting an existing edge is a no-op. Each node's
/// predecessor list keeps the order edges were first inserted in, which is
/// the consumer's input declaration order after [`DirectedGraph::from_nodes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectedGraph {
    nodes: BTreeMap<NodeId, NodeRecord>,
    preds: BTreeMap<NodeId, Vec<NodeId>>,
    succs: BTreeMap<NodeId, Vec<NodeId>>,
}

impl DirectedGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph with one node per [`GraphNode`] and one edge per predecessor relation.
    pub fn from_nodes(nodes: Vec<GraphNode>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        let mut pending = Vec::with_capacity(nodes.len());
        for node in nodes {
            graph.insert_node(
                node.id,
                NodeRecord {
                    ty: node.ty,
                    config: node.config,
                },
            )?;
            pending.push((node.id, node.predecessors));
        }
        for (id, predecessors) in pending {
            for predecessor in predecessors {
                if !graph.contains(predecessor) {
                    return Err(GraphError::DanglingPredecessor {
                        node: id,
                        predecessor,
                    });
                }
                graph.insert_edge(predecessor, id);
            }
        }
        Ok(graph)
    }

    /// Inserts a node without edges.
    pub fn insert_node(&mut self, id: NodeId, record: NodeRecord) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNodeId(id));
        }
        self.nodes.insert(id, record);
        self.preds.insert(id, Vec::new());
        self.succs.insert(id, Vec::new());
        Ok(())
    }

    /// Inserts the edge `from -> to`. Returns false when it already existed.
    ///
    /// Both endpoints must already be nodes; edges to unknown nodes are ignored.
    pub fn insert_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let preds = self.preds.entry(to).or_default();
        if preds.contains(&from) {
            return false;
        }
        preds.push(from);
        self.succs.entry(from).or_default().push(to);
        true
    }

    /// Returns true when `id` is a node of this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node's record when it exists.
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// Iterate over all nodes in ascending id order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> {
        self.nodes.iter().map(|(id, record)| (*id, record))
    }

    /// Predecessors of `id` in insertion order (empty for unknown nodes).
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        self.preds.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Successors of `id` in insertion order (empty for unknown nodes).
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        self.succs.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.preds.values().map(Vec::len).sum()
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<NodeRecord> {
        let record = self.nodes.remove(&id)?;
        for pred in self.preds.remove(&id).unwrap_or_default() {
            if let Some(succs) = self.succs.get_mut(&pred) {
                succs.retain(|s| *s != id);
            }
        }
        for succ in self.succs.remove(&id).unwrap_or_default() {
            if let Some(preds) = self.preds.get_mut(&succ) {
                preds.retain(|p| *p != id);
            }
        }
        Some(record)
    }

    /// Removes `id` after connecting each of its predecessors to each of its successors.
    ///
    /// In every successor's predecessor list the bypassed node is replaced, in
    /// place, by its own predecessors; ones the successor already has are not
    /// repeated.
    pub fn bypass_node(&mut self, id: NodeId) -> Option<NodeRecord> {
        if !self.contains(id) {
            return None;
        }
        let upstream: Vec<NodeId> = self
            .predecessors(id)
            .iter()
            .copied()
            .filter(|p| *p != id)
            .collect();
        let downstream: Vec<NodeId> = self
            .successors(id)
            .iter()
            .copied()
            .filter(|s| *s != id)
            .collect();

        for succ in downstream {
            let current = self.predecessors(succ);
            let Some(pos) = current.iter().position(|p| *p == id) else {
                continue;
            };
            let mut spliced = Vec::with_capacity(current.len() + upstream.len());
            spliced.extend_from_slice(&current[..pos]);
            for pred in &upstream {
                if !current.contains(pred) && !spliced.contains(pred) {
                    spliced.push(*pred);
                }
            }
            spliced.extend_from_slice(&current[pos + 1..]);

            for pred in &upstream {
                let succs = self.succs.entry(*pred).or_default();
                if !succs.contains(&succ) {
                    succs.push(succ);
                }
            }
            self.preds.insert(succ, spliced);
        }
        self.remove_node(id)
    }

    /// Kahn topological order; among ready nodes the smallest id goes first.
    ///
    /// When every producer has a smaller id than its consumers this is plain
    /// ascending id order.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut indegree: BTreeMap<NodeId, usize> = self
            .nodes
            .keys()
            .map(|id| (*id, self.predecessors(*id).len()))
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeId>> = indegree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| Reverse(*id))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            for succ in self.successors(id) {
                if let Some(degree) = indegree.get_mut(succ) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(*succ));
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let nodes = indegree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(id, _)| id)
                .collect();
            return Err(GraphError::Cycle { nodes });
        }
        Ok(order)
    }
}
