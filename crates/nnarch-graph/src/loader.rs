// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Export loading: raw nodes → [`GraphNode`]s with resolved predecessors.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::ident::{LinkId, NodeId};
use crate::raw::{RawDocument, RawNode, WidgetValues};

/// Errors raised while reading an export.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The export is not valid JSON or does not match the expected shape.
    #[error("malformed export: {0}")]
    Json(#[from] serde_json::Error),
    /// An input references a link that no output carries.
    #[error("unresolved link {link} on input of node {consumer}")]
    UnresolvedLink {
        /// Link identifier referenced by the consumer.
        link: LinkId,
        /// Node whose input carries the link.
        consumer: NodeId,
    },
}

/// A loaded node with its predecessors resolved from links.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Node identifier (the editor's `order`).
    pub id: NodeId,
    /// Node type tag.
    pub ty: String,
    /// Widget values, or `None` when the node has none.
    pub config: Option<WidgetValues>,
    /// Producer of each linked input, in input declaration order.
    pub predecessors: Vec<NodeId>,
}

/// Link → producer lookup over one export.
///
/// Links are resolved lazily by scanning every node's outputs; each link is
/// scanned for at most once and then served from the cache.
#[derive(Debug)]
pub struct LinkResolver<'a> {
    nodes: &'a [RawNode],
    cache: HashMap<LinkId, NodeId>,
}

impl<'a> LinkResolver<'a> {
    /// Creates an empty resolver over `nodes`.
    pub fn new(nodes: &'a [RawNode]) -> Self {
        Self {
            nodes,
            cache: HashMap::new(),
        }
    }

    /// Returns the node producing `link`, or `None` when no output carries it.
    ///
    /// When several outputs claim the same link the first one in export order wins.
    pub fn resolve(&mut self, link: LinkId) -> Option<NodeId> {
        if let Some(producer) = self.cache.get(&link) {
            return Some(*producer);
        }
        let producer = self.nodes.iter().find(|node| node.produces(link))?.order;
        self.cache.insert(link, producer);
        Some(producer)
    }

    /// Number of links resolved so far.
    pub fn cached_links(&self) -> usize {
        self.cache.len()
    }
}

/// Parses an export document from JSON text.
pub fn parse_document(json: &str) -> Result<RawDocument, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Converts every raw node into a [`GraphNode`], resolving input links.
///
/// Unconnected inputs contribute no predecessor. The resolver lives only for
/// this call.
#[instrument(skip_all, fields(nodes = document.nodes.len()))]
pub fn load_graph(document: &RawDocument) -> Result<Vec<GraphNode>, LoadError> {
    let mut resolver = LinkResolver::new(&document.nodes);
    let mut loaded = Vec::with_capacity(document.nodes.len());

    for node in &document.nodes {
        let mut predecessors = Vec::with_capacity(node.inputs.len());
        for link in node.inputs.iter().filter_map(|input| input.link) {
            let producer = resolver
                .resolve(link)
                .ok_or(LoadError::UnresolvedLink {
                    link,
                    consumer: node.order,
                })?;
            predecessors.push(producer);
        }
        loaded.push(GraphNode {
            id: node.order,
            ty: node.ty.clone(),
            config: node.widgets_values.clone(),
            predecessors,
        });
    }

    debug!(links = resolver.cached_links(), "resolved input links");
    Ok(loaded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::raw::{RawInput, RawOutput};
    use serde_json::json;

    fn node(order: NodeId, ty: &str, inputs: &[Option<LinkId>], outputs: &[&[LinkId]]) -> RawNode {
        RawNode {
            order,
            ty: ty.to_owned(),
            widgets_values: None,
            inputs: inputs
                .iter()
                .map(|link| RawInput {
                    name: None,
                    link: *link,
                })
                .collect(),
            outputs: outputs
                .iter()
                .map(|links| RawOutput {
                    name: None,
                    links: Some(links.to_vec()),
                })
                .collect(),
        }
    }

    #[test]
    fn predecessors_follow_input_declaration_order() {
        let doc = RawDocument {
            nodes: vec![
                node(0, "NNModule", &[], &[&[11]]),
                node(1, "NNModule", &[], &[&[10]]),
                node(2, "NNModule", &[Some(10), None, Some(11)], &[]),
            ],
        };
        let nodes = load_graph(&doc).unwrap();
        assert_eq!(nodes[2].predecessors, vec![1, 0]);
        assert!(nodes[0].predecessors.is_empty());
    }

    #[test]
    fn missing_link_is_fatal() {
        let doc = RawDocument {
            nodes: vec![node(4, "NNModule", &[Some(99)], &[])],
        };
        let err = load_graph(&doc).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnresolvedLink {
                link: 99,
                consumer: 4
            }
        ));
    }

    #[test]
    fn resolver_caches_each_link_once() {
        let nodes = vec![node(3, "NNModule", &[], &[&[7, 8]])];
        let mut resolver = LinkResolver::new(&nodes);
        assert_eq!(resolver.resolve(7), Some(3));
        assert_eq!(resolver.resolve(7), Some(3));
        assert_eq!(resolver.cached_links(), 1);
        assert_eq!(resolver.resolve(8), Some(3));
        assert_eq!(resolver.cached_links(), 2);
        assert_eq!(resolver.resolve(9), None);
        assert_eq!(resolver.cached_links(), 2);
    }

    #[test]
    fn absent_widgets_and_null_links_are_tolerated() {
        let doc = parse_document(
            &json!({
                "last_node_id": 2,
                "nodes": [
                    { "id": 1, "order": 0, "type": "NNModule",
                      "outputs": [{ "name": "output", "type": "Module", "links": null }],
                      "widgets_values": ["Conv", 1, "64", ""] },
                    { "id": 2, "order": 1, "type": "Reroute",
                      "inputs": [{ "name": "", "type": "*", "link": null }] }
                ],
                "links": []
            })
            .to_string(),
        )
        .unwrap();
        let nodes = load_graph(&doc).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[1].config.is_none());
        assert_eq!(nodes[0].config.as_ref().map(Vec::len), Some(4));
    }
}
