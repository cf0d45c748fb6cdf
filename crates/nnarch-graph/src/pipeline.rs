// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end driver: export → architecture.

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::CompileConfig;
use crate::contract::contract_reroutes;
use crate::emit::Architecture;
use crate::flatten::flatten_groups;
use crate::graph::{DirectedGraph, GraphError};
use crate::loader::{load_graph, parse_document, LoadError};
use crate::module_spec::{ModuleSpec, ModuleSpecError};
use crate::raw::RawDocument;
use crate::squeeze::{squeeze_ids, SqueezeError};

/// Any failure of the compile pipeline. Every variant is fatal.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading the export failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The graph is structurally invalid.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Renumbering met a reference to an unprocessed node.
    #[error(transparent)]
    Squeeze(#[from] SqueezeError),
    /// A surviving node has unusable widget values.
    #[error(transparent)]
    Module(#[from] ModuleSpecError),
}

/// Runs the full pipeline with one [`CompileConfig`].
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompileConfig,
}

impl Compiler {
    /// Creates a compiler using `config`.
    pub fn new(config: CompileConfig) -> Self {
        Self { config }
    }

    /// Options in use.
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compiles an export given as JSON text.
    pub fn compile_str(&self, json: &str) -> Result<Architecture, CompileError> {
        let document = parse_document(json)?;
        self.compile(&document)
    }

    /// Compiles a parsed export.
    ///
    /// Module configurations are validated once, before renumbering, so errors
    /// name the editor's node ids. Renumbering keeps entry order, so each
    /// record stays paired with its entry.
    #[instrument(skip_all, fields(nodes = document.nodes.len()))]
    pub fn compile(&self, document: &RawDocument) -> Result<Architecture, CompileError> {
        let nodes = load_graph(document)?;
        let graph = DirectedGraph::from_nodes(nodes)?;
        let edges = graph.edge_count();
        let graph = contract_reroutes(graph, &self.config)?;
        let reduced = flatten_groups(&graph, &self.config)?;
        let modules = reduced
            .iter()
            .map(|entry| ModuleSpec::from_widget_values(entry.id, entry.config.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;
        let squeezed = squeeze_ids(reduced)?;
        let architecture = Architecture::from_modules(squeezed.into_iter().zip(modules));

        info!(
            nodes = document.nodes.len(),
            edges,
            lines = architecture.len(),
            "architecture compiled"
        );
        Ok(architecture)
    }
}
