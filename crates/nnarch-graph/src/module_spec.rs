// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Validated view of a module node's widget values.
//!
//! Module nodes carry `[name, repeats, args, notes...]`. Only the first three
//! are emitted; anything after them is kept as `extras`.

use serde_json::Value;
use thiserror::Error;

use crate::ident::NodeId;

/// Minimum number of widget values a module node must carry.
const REQUIRED_FIELDS: usize = 3;

/// Errors raised while reading a module node's widget values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleSpecError {
    /// The node has no widget values at all.
    #[error("node {node} has no module configuration")]
    Missing {
        /// Offending node (original id).
        node: NodeId,
    },
    /// Fewer than three widget values.
    #[error("node {node} has {found} configuration values, expected at least 3 (name, repeats, args)")]
    Arity {
        /// Offending node (original id).
        node: NodeId,
        /// Number of values present.
        found: usize,
    },
    /// A field has the wrong JSON type.
    #[error("node {node}: field `{field}` must be {expected}")]
    FieldType {
        /// Offending node (original id).
        node: NodeId,
        /// Field name.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },
    /// `repeats` is not a non-negative integer.
    #[error("node {node}: repeats must be a non-negative integer, got {value}")]
    Repeats {
        /// Offending node (original id).
        node: NodeId,
        /// Value as written in the export.
        value: String,
    },
}

/// Module name, repeat count and argument string of one architecture entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSpec {
    /// Module name (e.g. `Conv`, `C2f`, `Concat`).
    pub name: String,
    /// How many times the module is stacked.
    pub repeats: u64,
    /// Argument string, emitted verbatim.
    pub args: String,
    /// Trailing widget values (notes etc.); never emitted.
    pub extras: Vec<Value>,
}

impl ModuleSpec {
    /// Validates `values` for `node`.
    pub fn from_widget_values(node: NodeId, values: Option<&[Value]>) -> Result<Self, ModuleSpecError> {
        let values = values.ok_or(ModuleSpecError::Missing { node })?;
        let [name, repeats, args, extras @ ..] = values else {
            return Err(ModuleSpecError::Arity {
                node,
                found: values.len(),
            });
        };

        Ok(Self {
            name: string_field(node, "name", name)?,
            repeats: repeats_field(node, repeats)?,
            args: string_field(node, "args", args)?,
            extras: extras.to_vec(),
        })
    }
}

fn string_field(node: NodeId, field: &'static str, value: &Value) -> Result<String, ModuleSpecError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or(ModuleSpecError::FieldType {
            node,
            field,
            expected: "a string",
        })
}

// Editors store the INT widget as a number, but hand-edited exports sometimes quote it.
fn repeats_field(node: NodeId, value: &Value) -> Result<u64, ModuleSpecError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ModuleSpecError::Repeats {
        node,
        value: value.to_string(),
    })
}
