// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! nnarch-graph: compiles node-graph editor exports into architecture descriptions.
//!
//! The pipeline runs once per export and every stage consumes the previous
//! stage's output:
//!
//! 1. [`load_graph`] resolves each linked input to the node that produces it.
//! 2. [`DirectedGraph::from_nodes`] builds the predecessor/successor relation.
//! 3. [`contract_reroutes`] removes pass-through nodes.
//! 4. [`flatten_groups`] replaces group nodes by the inputs they re-expose.
//! 5. [`squeeze_ids`] renumbers the survivors to `0..N`.
//! 6. [`Architecture`] renders the `from, module, repeats, [args]` lines.
//!
//! [`Compiler`] wires the stages together.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod config;
mod contract;
mod emit;
mod flatten;
mod graph;
mod ident;
mod loader;
mod module_spec;
mod pipeline;
mod raw;
mod squeeze;

/// Compile options (node-type roles and output layout).
pub use config::{CompileConfig, ConfigError, NodeRole};
/// Reroute contraction.
pub use contract::contract_reroutes;
/// Architecture lines and their text rendering.
pub use emit::{Architecture, ArchitectureLine, Document, FromSpec, NO_PREDECESSOR};
/// Group flattening and the intermediate reduced records.
pub use flatten::{flatten_groups, ReducedEntry};
/// Directed graph store and its structural errors.
pub use graph::{DirectedGraph, GraphError, NodeRecord};
/// Identifier aliases shared by every stage.
pub use ident::{LinkId, NodeId};
/// Export loading and link resolution.
pub use loader::{load_graph, parse_document, GraphNode, LinkResolver, LoadError};
/// Validated module configuration.
pub use module_spec::{ModuleSpec, ModuleSpecError};
/// End-to-end driver.
pub use pipeline::{CompileError, Compiler};
/// Serde model of the editor export.
pub use raw::{RawDocument, RawInput, RawNode, RawOutput, WidgetValues};
/// Dense renumbering.
pub use squeeze::{squeeze_ids, SqueezeError};
