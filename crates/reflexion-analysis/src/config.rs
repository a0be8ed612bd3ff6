//! Analysis configuration.
//!
//! [`ReflexionConfig`] is passed to the engine explicitly; there is no
//! process-wide policy. It can be read from a JSON file (every field is
//! optional) and adjusted from the environment:
//!
//! - `REFLEXION_ALLOW_PARENT_DEPS`: `true`/`false` (also `1`/`0`,
//!   `yes`/`no`), overrides `allow_dependencies_to_parents`.

use std::path::Path;

use indexmap::IndexMap;
use reflexion_core::Node;
use serde::{Deserialize, Serialize};

use crate::error::ReflexionError;
use crate::type_hierarchy::TypeHierarchy;

/// Environment variable overriding `allow_dependencies_to_parents`.
pub const ALLOW_PARENT_DEPS_ENV: &str = "REFLEXION_ALLOW_PARENT_DEPS";

/// Configuration for the reflexion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexionConfig {
    /// Whether a dependency from a node onto one of its architecture
    /// ancestors is implicitly allowed. Default: true.
    pub allow_dependencies_to_parents: bool,
    /// Edge type -> direct supertype.
    pub edge_type_hierarchy: IndexMap<String, String>,
    /// Node toggles that exclude a node (and its edges) from the analysis.
    pub irrelevant_node_toggles: Vec<String>,
}

impl Default for ReflexionConfig {
    fn default() -> Self {
        ReflexionConfig {
            allow_dependencies_to_parents: true,
            edge_type_hierarchy: IndexMap::new(),
            irrelevant_node_toggles: Vec::new(),
        }
    }
}

impl ReflexionConfig {
    pub fn from_json(json: &str) -> Result<Self, ReflexionError> {
        serde_json::from_str(json).map_err(|e| ReflexionError::Config {
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReflexionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ReflexionError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json(&json)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(mut self) -> Result<Self, ReflexionError> {
        let value = std::env::var(ALLOW_PARENT_DEPS_ENV).ok();
        self.apply_allow_parent_deps(value.as_deref())?;
        Ok(self)
    }

    fn apply_allow_parent_deps(&mut self, value: Option<&str>) -> Result<(), ReflexionError> {
        let Some(value) = value else {
            return Ok(());
        };
        self.allow_dependencies_to_parents = match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => {
                return Err(ReflexionError::Config {
                    reason: format!("{} must be a boolean, got '{}'", ALLOW_PARENT_DEPS_ENV, other),
                })
            }
        };
        Ok(())
    }

    /// Builds the validated edge-type hierarchy.
    pub fn type_hierarchy(&self) -> Result<TypeHierarchy, ReflexionError> {
        TypeHierarchy::new(self.edge_type_hierarchy.clone())
    }

    /// Returns `false` if the node carries one of the irrelevant toggles.
    pub fn is_relevant(&self, node: &Node) -> bool {
        !self
            .irrelevant_node_toggles
            .iter()
            .any(|toggle| node.attributes.has_toggle(toggle))
    }
}
