//! Storage error types for reflexion-storage.
//!
//! [`StorageError`] covers file access, JSON (de)serialization, dangling
//! references inside a document, and structural errors raised by the graph
//! model while a document is rebuilt into a [`Graph`](reflexion_core::Graph).

use reflexion_core::CoreError;
use thiserror::Error;

/// Errors produced while reading or writing interchange documents.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document describes a graph the model rejects.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A parent or edge endpoint names a node the document does not define.
    #[error("{context} references unknown node '{link_name}'")]
    UnknownNode { context: String, link_name: String },
}
