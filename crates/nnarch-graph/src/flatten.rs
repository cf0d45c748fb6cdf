// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Group flattening.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::config::CompileConfig;
use crate::graph::{DirectedGraph, GraphError};
use crate::ident::NodeId;
use crate::raw::WidgetValues;

/// A surviving node after contraction and flattening, before or after renumbering.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedEntry {
    /// Node identifier.
    pub id: NodeId,
    /// Flat predecessor list (no groups, no nesting).
    pub from: Vec<NodeId>,
    /// Node type tag.
    pub ty: String,
    /// Widget values carried over from the export.
    pub config: Option<WidgetValues>,
}

/// Replaces every group by the predecessors it re-exposes and emits one entry per other node.
///
/// Nodes are visited in topological order, so a group's substitution is
/// always recorded before any consumer reads it; nested groups therefore
/// resolve to the same flat list however deep they are stacked. Entries come
/// out in that same order. Predecessor lists are not deduplicated.
#[instrument(skip_all, fields(nodes = graph.len()))]
pub fn flatten_groups(
    graph: &DirectedGraph,
    config: &CompileConfig,
) -> Result<Vec<ReducedEntry>, GraphError> {
    let mut substitutions: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
    let mut reduced = Vec::with_capacity(graph.len());

    for id in graph.topological_order()? {
        let Some(record) = graph.node(id) else {
            continue;
        };
        let from = substitute(graph.predecessors(id), &substitutions);

        if config.is_group(&record.ty) {
            debug!(group = id, inputs = ?from, "flattening group");
            substitutions.insert(id, from);
            continue;
        }

        reduced.push(ReducedEntry {
            id,
            from,
            ty: record.ty.clone(),
            config: record.config.clone(),
        });
    }

    debug!(
        groups = substitutions.len(),
        entries = reduced.len(),
        "groups flattened"
    );
    Ok(reduced)
}

/// Expands each predecessor that is a recorded group into that group's flat list.
fn substitute(predecessors: &[NodeId], table: &BTreeMap<NodeId, Vec<NodeId>>) -> Vec<NodeId> {
    let mut flat = Vec::with_capacity(predecessors.len());
    for pred in predecessors {
        match table.get(pred) {
            Some(inputs) => flat.extend_from_slice(inputs),
            None => flat.push(*pred),
        }
    }
    flat
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::loader::GraphNode;

    fn graph(nodes: &[(NodeId, &str, Vec<NodeId>)]) -> DirectedGraph {
        DirectedGraph::from_nodes(
            nodes
                .iter()
                .map(|(id, ty, preds)| GraphNode {
                    id: *id,
                    ty: (*ty).to_owned(),
                    config: None,
                    predecessors: preds.clone(),
                })
                .collect(),
        )
        .unwrap()
    }

    fn from_of(entries: &[ReducedEntry], id: NodeId) -> Vec<NodeId> {
        entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.from.clone())
            .unwrap()
    }

    #[test]
    fn group_exposes_its_inputs() {
        let g = graph(&[
            (1, "NNModule", vec![]),
            (2, "NNModule", vec![]),
            (3, "NNGroup", vec![1, 2]),
            (4, "NNModule", vec![3]),
        ]);
        let entries = flatten_groups(&g, &CompileConfig::default()).unwrap();
        assert_eq!(entries.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2, 4]);
        assert_eq!(from_of(&entries, 4), vec![1, 2]);
    }

    #[test]
    fn group_is_substituted_in_place() {
        let g = graph(&[
            (1, "NNModule", vec![]),
            (2, "NNModule", vec![]),
            (3, "NNModule", vec![]),
            (4, "NNGroup", vec![1, 2]),
            (5, "NNModule", vec![3, 4]),
        ]);
        let entries = flatten_groups(&g, &CompileConfig::default()).unwrap();
        assert_eq!(from_of(&entries, 5), vec![3, 1, 2]);
    }

    #[test]
    fn nested_groups_resolve_flat() {
        let g = graph(&[
            (1, "NNModule", vec![]),
            (2, "NNModule", vec![]),
            (3, "NNModule", vec![]),
            (4, "NNGroup", vec![1, 2]),
            (5, "NNGroup", vec![4, 3]),
            (6, "NNModule", vec![5]),
        ]);
        let entries = flatten_groups(&g, &CompileConfig::default()).unwrap();
        assert_eq!(from_of(&entries, 6), vec![1, 2, 3]);
    }

    #[test]
    fn group_with_larger_id_than_consumer_still_resolves() {
        let g = graph(&[
            (1, "NNModule", vec![]),
            (2, "NNModule", vec![]),
            (3, "NNModule", vec![9]),
            (9, "NNGroup", vec![1, 2]),
        ]);
        let entries = flatten_groups(&g, &CompileConfig::default()).unwrap();
        assert_eq!(from_of(&entries, 3), vec![1, 2]);
    }

    #[test]
    fn cyclic_group_is_an_error() {
        let g = graph(&[(1, "NNGroup", vec![2]), (2, "NNModule", vec![1])]);
        assert!(matches!(
            flatten_groups(&g, &CompileConfig::default()),
            Err(GraphError::Cycle { .. })
        ));
    }
}
