//! Core error types for reflexion-core.
//!
//! Uses `thiserror` for structured, matchable error variants. Every variant
//! except [`CoreError::UnknownAttribute`] signals a structural integrity
//! violation: the caller (usually a loader) handed in a malformed graph, and
//! nothing here tries to repair it.

use thiserror::Error;

use crate::id::{EdgeId, NodeId};

/// Errors produced by the attribute store and the graph model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A required attribute was requested but never set.
    #[error("unknown attribute: '{name}'")]
    UnknownAttribute { name: String },

    /// A node was added without a link name.
    #[error("link name of a node must not be empty")]
    EmptyLinkName,

    /// A node was added whose link name is already taken in the graph.
    #[error("duplicate link name: '{link_name}'")]
    DuplicateLinkName { link_name: String },

    /// The parent/child relation would stop being a forest.
    #[error("hierarchy is not a tree: node '{link_name}' {reason}")]
    HierarchyNotATree { link_name: String, reason: String },

    /// A copy operation referenced a link name that the target graph lacks.
    #[error("target graph has no node with link name '{link_name}'")]
    MissingLinkName { link_name: String },

    /// A node handle was not found in the graph.
    #[error("node not found: NodeId({id})")]
    NodeNotFound { id: NodeId },

    /// An edge handle was not found in the graph.
    #[error("edge not found: EdgeId({id})")]
    EdgeNotFound { id: EdgeId },
}
