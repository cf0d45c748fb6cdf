// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reroute contraction.

use tracing::{debug, instrument};

use crate::config::CompileConfig;
use crate::graph::{DirectedGraph, GraphError};
use crate::ident::NodeId;

/// Removes every reroute node, wiring each of its predecessors to each of its successors.
///
/// Candidates are collected in topological order before the first edit, so a
/// chain of reroutes collapses onto the first non-reroute producer. Running
/// this on its own output changes nothing.
#[instrument(skip_all, fields(nodes = graph.len()))]
pub fn contract_reroutes(
    mut graph: DirectedGraph,
    config: &CompileConfig,
) -> Result<DirectedGraph, GraphError> {
    let candidates: Vec<NodeId> = graph
        .topological_order()?
        .into_iter()
        .filter(|id| graph.node(*id).is_some_and(|n| config.is_reroute(&n.ty)))
        .collect();

    for &id in &candidates {
        debug!(
            reroute = id,
            predecessors = ?graph.predecessors(id),
            successors = ?graph.successors(id),
            "contracting reroute"
        );
        graph.bypass_node(id);
    }

    debug!(contracted = candidates.len(), remaining = graph.len(), "reroutes contracted");
    Ok(graph)
}
