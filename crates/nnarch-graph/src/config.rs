// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compile options: which node types are rewritten away and how lines are laid out.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading the config file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A node type is listed both as a reroute and as a group.
    #[error("node type {0:?} cannot be both a reroute and a group")]
    ConflictingRole(String),
}

/// How the rewrite stages treat a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Pass-through node, contracted away.
    Reroute,
    /// Sub-assembly node, flattened into its inputs.
    Group,
    /// Anything else; survives into the architecture.
    Module,
}

/// Options shared by every pipeline stage.
///
/// All fields are optional in the JSON form; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Type tags treated as pass-through nodes.
    pub reroute_types: Vec<String>,
    /// Type tags treated as group nodes.
    pub group_types: Vec<String>,
    /// Top-level key of the emitted document.
    pub section: String,
    /// Right-alignment width of the `from` column.
    pub from_width: usize,
    /// Right-alignment width of the `module` column.
    pub module_width: usize,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            reroute_types: vec!["Reroute".to_owned()],
            group_types: vec!["NNGroup".to_owned()],
            section: "network".to_owned(),
            from_width: 15,
            module_width: 15,
        }
    }
}

impl CompileConfig {
    /// Deserializes and validates a config blob. An empty blob yields the defaults.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_slice(&fs::read(path)?)
    }

    /// Pretty JSON form, suitable for writing a starter config.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects type tags claimed by both roles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self
            .reroute_types
            .iter()
            .find(|ty| self.group_types.contains(ty))
        {
            Some(ty) => Err(ConfigError::ConflictingRole(ty.clone())),
            None => Ok(()),
        }
    }

    /// Adds a reroute type tag unless already present.
    pub fn add_reroute_type(&mut self, ty: impl Into<String>) {
        let ty = ty.into();
        if !self.reroute_types.contains(&ty) {
            self.reroute_types.push(ty);
        }
    }

    /// Adds a group type tag unless already present.
    pub fn add_group_type(&mut self, ty: impl Into<String>) {
        let ty = ty.into();
        if !self.group_types.contains(&ty) {
            self.group_types.push(ty);
        }
    }

    /// Role of the given type tag.
    pub fn role_of(&self, ty: &str) -> NodeRole {
        if self.reroute_types.iter().any(|t| t == ty) {
            NodeRole::Reroute
        } else if self.group_types.iter().any(|t| t == ty) {
            NodeRole::Group
        } else {
            NodeRole::Module
        }
    }

    /// Returns true for pass-through type tags.
    pub fn is_reroute(&self, ty: &str) -> bool {
        self.role_of(ty) == NodeRole::Reroute
    }

    /// Returns true for group type tags.
    pub fn is_group(&self, ty: &str) -> bool {
        self.role_of(ty) == NodeRole::Group
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = CompileConfig::from_json_slice(br#"{ "section": "backbone" }"#).unwrap();
        assert_eq!(config.section, "backbone");
        assert_eq!(config.reroute_types, vec!["Reroute"]);
        assert_eq!(config.group_types, vec!["NNGroup"]);
        assert_eq!(config.from_width, 15);
    }

    #[test]
    fn blank_blob_is_default() {
        assert_eq!(
            CompileConfig::from_json_slice(b"  \n").unwrap(),
            CompileConfig::default()
        );
    }

    #[test]
    fn conflicting_roles_are_rejected() {
        let err = CompileConfig::from_json_slice(
            br#"{ "reroute_types": ["Pipe"], "group_types": ["Pipe"] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingRole(ty) if ty == "Pipe"));
    }

    #[test]
    fn roles_follow_type_lists() {
        let mut config = CompileConfig::default();
        config.add_reroute_type("Wire");
        config.add_reroute_type("Wire");
        assert_eq!(config.reroute_types.len(), 2);
        assert_eq!(config.role_of("Wire"), NodeRole::Reroute);
        assert_eq!(config.role_of("NNGroup"), NodeRole::Group);
        assert_eq!(config.role_of("NNModule"), NodeRole::Module);
    }
}
