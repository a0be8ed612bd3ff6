//! Error types for reflexion-analysis.
//!
//! [`ReflexionError`] wraps the graph model's [`CoreError`] and adds the
//! failure modes of the engine itself: unsupported incremental operations,
//! inconsistent edge states, mapping edits that do not apply, and invalid
//! configuration. None of them are recovered from inside the engine.

use reflexion_core::CoreError;
use thiserror::Error;

/// Errors produced by the reflexion engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflexionError {
    /// A structural error from the graph model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The incremental operation is not implemented; rerun from scratch.
    #[error("operation not supported: {operation}")]
    Unsupported { operation: String },

    /// An edge carries a state or counter the engine cannot have produced.
    #[error("corrupt analysis state: {reason}")]
    CorruptState { reason: String },

    /// The implementation node has no explicit mapping to remove.
    #[error("implementation node '{link_name}' is not explicitly mapped")]
    NotMapped { link_name: String },

    /// The implementation node is already explicitly mapped.
    #[error("implementation node '{link_name}' is already mapped onto '{target}'")]
    AlreadyMapped { link_name: String, target: String },

    /// The architecture edge is a propagated edge, not a specified one.
    #[error("architecture edge {key} is not a specified dependency")]
    NotSpecified { key: String },

    /// A link name does not resolve in the named graph.
    #[error("{graph} graph has no node '{link_name}'")]
    UnknownNode {
        graph: &'static str,
        link_name: String,
    },

    /// The configuration is malformed.
    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

impl ReflexionError {
    pub(crate) fn unsupported(operation: &str) -> Self {
        ReflexionError::Unsupported {
            operation: operation.to_string(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        ReflexionError::CorruptState {
            reason: reason.into(),
        }
    }
}
