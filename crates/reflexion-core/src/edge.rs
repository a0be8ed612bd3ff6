//! Graph edges.
//!
//! An [`Edge`] is the weight stored on a petgraph edge: a type string plus an
//! attribute store. Source and target are owned by the graph's adjacency
//! structure, so copying an `Edge` value never copies its endpoints.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// Edge type used when an empty type is given.
pub const UNKNOWN_EDGE_TYPE: &str = "Unknown";

/// A typed, attributed, directed dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    edge_type: String,
    /// Typed attributes of this edge.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Edge {
    /// Creates an edge of the given type. An empty type becomes
    /// [`UNKNOWN_EDGE_TYPE`].
    pub fn new(edge_type: impl Into<String>) -> Self {
        let mut edge_type = edge_type.into();
        if edge_type.is_empty() {
            edge_type = UNKNOWN_EDGE_TYPE.to_string();
        }
        Edge {
            edge_type,
            attributes: Attributes::new(),
        }
    }

    pub fn edge_type(&self) -> &str {
        &self.edge_type
    }

    pub fn has_type(&self, edge_type: &str) -> bool {
        self.edge_type == edge_type
    }
}

/// Builds the human-readable compound key `type#source#target`.
///
/// The key is not guaranteed to be unique: a specified and a propagated
/// architecture dependency between the same pair share it.
pub fn edge_key(edge_type: &str, source: &str, target: &str) -> String {
    format!("{}#{}#{}", edge_type, source, target)
}
