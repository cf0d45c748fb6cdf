// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Shared fixtures for nnarch-graph integration tests.

use nnarch_graph::{
    Architecture, CompileConfig, Compiler, LinkId, NodeId, RawDocument, RawInput, RawNode,
    RawOutput,
};
use serde_json::{json, Value};

/// Builds editor-shaped exports from `(producer -> consumer)` wiring.
///
/// Link ids are allocated at [`ExportBuilder::build`], one per input, and
/// attached to the producer's first output the way the editor does.
#[derive(Default)]
pub struct ExportBuilder {
    nodes: Vec<RawNode>,
    wiring: Vec<(NodeId, Vec<Option<NodeId>>)>,
    dangling: Vec<(NodeId, LinkId)>,
}

impl ExportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with explicit type, widget values and producers.
    pub fn node(
        mut self,
        order: NodeId,
        ty: &str,
        widgets: Option<Value>,
        inputs: &[Option<NodeId>],
    ) -> Self {
        self.nodes.push(RawNode {
            order,
            ty: ty.to_owned(),
            widgets_values: widgets.and_then(|w| w.as_array().cloned()),
            inputs: Vec::new(),
            outputs: vec![RawOutput {
                name: Some("output".to_owned()),
                links: None,
            }],
        });
        self.wiring.push((order, inputs.to_vec()));
        self
    }

    /// Adds an `NNModule` node.
    pub fn module(self, order: NodeId, name: &str, args: &str, inputs: &[NodeId]) -> Self {
        let inputs: Vec<Option<NodeId>> = inputs.iter().copied().map(Some).collect();
        self.node(
            order,
            "NNModule",
            Some(json!([name, 1, args, ""])),
            &inputs,
        )
    }

    /// Adds a `Reroute` node fed by `input`.
    pub fn reroute(self, order: NodeId, input: Option<NodeId>) -> Self {
        self.node(order, "Reroute", None, &[input])
    }

    /// Adds an `NNGroup` node fed by `inputs`.
    pub fn group(self, order: NodeId, inputs: &[NodeId]) -> Self {
        let inputs: Vec<Option<NodeId>> = inputs.iter().copied().map(Some).collect();
        self.node(order, "NNGroup", None, &inputs)
    }

    /// Gives `consumer` an extra input carrying a link no output produces.
    pub fn dangling_input(mut self, consumer: NodeId, link: LinkId) -> Self {
        self.dangling.push((consumer, link));
        self
    }

    pub fn build(mut self) -> RawDocument {
        let mut next_link: LinkId = 1;
        for (consumer, producers) in &self.wiring {
            let mut inputs = Vec::with_capacity(producers.len());
            for producer in producers {
                let link = producer.map(|producer| {
                    let link = next_link;
                    next_link += 1;
                    let output = &mut self
                        .nodes
                        .iter_mut()
                        .find(|n| n.order == producer)
                        .expect("producer must be added to the builder")
                        .outputs[0];
                    output.links.get_or_insert_with(Vec::new).push(link);
                    link
                });
                inputs.push(RawInput {
                    name: Some("input".to_owned()),
                    link,
                });
            }
            let node = self
                .nodes
                .iter_mut()
                .find(|n| n.order == *consumer)
                .expect("consumer present");
            node.inputs = inputs;
        }
        for (consumer, link) in &self.dangling {
            let node = self
                .nodes
                .iter_mut()
                .find(|n| n.order == *consumer)
                .expect("consumer present");
            node.inputs.push(RawInput {
                name: Some("input".to_owned()),
                link: Some(*link),
            });
        }
        RawDocument { nodes: self.nodes }
    }
}

/// Compiles with the default config.
pub fn compile(document: &RawDocument) -> Architecture {
    Compiler::new(CompileConfig::default())
        .compile(document)
        .expect("compile")
}

/// `(id, from ids, module)` per line, for compact assertions.
pub fn summary(architecture: &Architecture) -> Vec<(NodeId, Vec<NodeId>, String)> {
    architecture
        .lines()
        .iter()
        .map(|line| (line.id, line.from.ids().to_vec(), line.module.clone()))
        .collect()
}

/// Reads a fixture under `tests/fixtures/`.
pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read fixture {path}: {e}"))
}
