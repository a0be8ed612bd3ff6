//! JSON interchange storage for reflexion graphs.
//!
//! Loads the implementation and architecture graphs from [`GraphDocument`]s,
//! validates the mapping against them, and writes analyzed graphs back out.
//!
//! # Modules
//!
//! - [`document`]: serde types of the interchange format
//! - [`convert`]: [`Graph`] <-> [`GraphDocument`]
//! - [`mapping`]: lenient loading of the mapping graph
//! - [`error`]: [`StorageError`]

pub mod convert;
pub mod document;
pub mod error;
pub mod mapping;

use std::path::Path;

use reflexion_core::Graph;

pub use convert::{from_document, to_document};
pub use document::{EdgeDocument, GraphDocument, NodeDocument};
pub use error::StorageError;
pub use mapping::load_mapping;

/// Reads a document from a JSON file.
pub fn read_document(path: impl AsRef<Path>) -> Result<GraphDocument, StorageError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    Ok(serde_json::from_str(&json)?)
}

/// Writes a document as pretty-printed JSON.
pub fn write_document(path: impl AsRef<Path>, doc: &GraphDocument) -> Result<(), StorageError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json).map_err(|source| io_error(path, source))
}

/// Loads a graph file and records its path on the graph.
pub fn load_graph(path: impl AsRef<Path>) -> Result<Graph, StorageError> {
    let path = path.as_ref();
    let mut graph = from_document(&read_document(path)?)?;
    graph.set_path(path.display().to_string());
    Ok(graph)
}

/// Loads a mapping file against already loaded graphs.
pub fn load_mapping_file(
    path: impl AsRef<Path>,
    implementation: &Graph,
    architecture: &Graph,
) -> Result<Graph, StorageError> {
    let path = path.as_ref();
    let mut mapping = load_mapping(&read_document(path)?, implementation, architecture)?;
    mapping.set_path(path.display().to_string());
    Ok(mapping)
}

/// Saves a graph to a file.
pub fn save_graph(path: impl AsRef<Path>, graph: &Graph) -> Result<(), StorageError> {
    write_document(path, &to_document(graph)?)
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
