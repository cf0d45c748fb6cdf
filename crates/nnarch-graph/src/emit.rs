// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Architecture lines and their text form.
//!
//! The document is YAML-compatible:
//!
//! ```text
//! network:
//!  - [             -1,            Conv, 1, [64, 3, 2]]
//!  - [         [1, 0],          Concat, 1, [1]]
//! ```
//!
//! Output is a pure function of the entries and the config, so identical
//! inputs give byte-identical documents.

use std::fmt;
use std::io::{self, Write};

use crate::config::CompileConfig;
use crate::flatten::ReducedEntry;
use crate::ident::NodeId;
use crate::module_spec::{ModuleSpec, ModuleSpecError};

/// `from` value written for entries without predecessors.
pub const NO_PREDECESSOR: i64 = -1;

/// Predecessor column of an architecture line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FromSpec {
    /// No predecessors; rendered as `-1`.
    Input,
    /// Exactly one predecessor; rendered as the bare id.
    Single(NodeId),
    /// Several predecessors; rendered as `[a, b, ...]`.
    Many(Vec<NodeId>),
}

impl FromSpec {
    /// Classifies a flat predecessor list.
    pub fn from_ids(ids: &[NodeId]) -> Self {
        match ids {
            [] => Self::Input,
            [only] => Self::Single(*only),
            many => Self::Many(many.to_vec()),
        }
    }

    /// Predecessor ids in order (empty for [`FromSpec::Input`]).
    pub fn ids(&self) -> &[NodeId] {
        match self {
            Self::Input => &[],
            Self::Single(id) => std::slice::from_ref(id),
            Self::Many(ids) => ids,
        }
    }
}

impl fmt::Display for FromSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render first so width/alignment flags apply to the whole value.
        let text = match self {
            Self::Input => NO_PREDECESSOR.to_string(),
            Self::Single(id) => id.to_string(),
            Self::Many(ids) => {
                let parts: Vec<String> = ids.iter().map(ToString::to_string).collect();
                format!("[{}]", parts.join(", "))
            }
        };
        f.pad(&text)
    }
}

/// One renumbered entry of the architecture description.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchitectureLine {
    /// Dense id of this entry.
    pub id: NodeId,
    /// Predecessor column.
    pub from: FromSpec,
    /// Module name.
    pub module: String,
    /// Repeat count.
    pub repeats: u64,
    /// Argument string, verbatim.
    pub args: String,
}

/// Ordered architecture description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Architecture {
    lines: Vec<ArchitectureLine>,
}

impl Architecture {
    /// Builds lines from renumbered entries, validating each module configuration.
    ///
    /// Lines are ordered by ascending id.
    pub fn from_entries(entries: &[ReducedEntry]) -> Result<Self, ModuleSpecError> {
        let modules = entries
            .iter()
            .map(|entry| {
                let spec = ModuleSpec::from_widget_values(entry.id, entry.config.as_deref())?;
                Ok((entry.clone(), spec))
            })
            .collect::<Result<Vec<_>, ModuleSpecError>>()?;
        Ok(Self::from_modules(modules))
    }

    /// Builds lines from entries paired with their already validated module records.
    ///
    /// Lines are ordered by ascending id.
    pub fn from_modules<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = (ReducedEntry, ModuleSpec)>,
    {
        let mut lines: Vec<ArchitectureLine> = modules
            .into_iter()
            .map(|(entry, spec)| ArchitectureLine {
                id: entry.id,
                from: FromSpec::from_ids(&entry.from),
                module: spec.name,
                repeats: spec.repeats,
                args: spec.args,
            })
            .collect();
        lines.sort_by_key(|line| line.id);
        Self { lines }
    }

    /// Lines in emission order.
    pub fn lines(&self) -> &[ArchitectureLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true when there are no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Renders the document with `config`'s section name and column widths.
    pub fn document<'a>(&'a self, config: &'a CompileConfig) -> Document<'a> {
        Document {
            architecture: self,
            config,
        }
    }

    /// Writes the document: a `<section>:` header, then one newline-terminated line per entry.
    pub fn write_document<W: Write>(&self, out: &mut W, config: &CompileConfig) -> io::Result<()> {
        write!(out, "{}", self.document(config))
    }

    /// The document as a string.
    pub fn to_document(&self, config: &CompileConfig) -> String {
        self.document(config).to_string()
    }
}

/// [`Architecture`] bound to a [`CompileConfig`]; its `Display` form is the document text.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    architecture: &'a Architecture,
    config: &'a CompileConfig,
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.config.section)?;
        for line in &self.architecture.lines {
            writeln!(
                f,
                " - [{:>fw$}, {:>mw$}, {}, [{}]]",
                line.from,
                line.module,
                line.repeats,
                line.args,
                fw = self.config.from_width,
                mw = self.config.module_width,
            )?;
        }
        Ok(())
    }
}
