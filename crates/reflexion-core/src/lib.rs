//! Graph model for reflexion analysis.
//!
//! Attribute stores, hierarchical nodes, typed edges, and the [`Graph`]
//! arena that owns them. Implementation, architecture, and mapping graphs
//! are all instances of the same [`Graph`] type.

pub mod attributes;
pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;

// Re-export commonly used types
pub use attributes::Attributes;
pub use edge::{edge_key, Edge, UNKNOWN_EDGE_TYPE};
pub use error::CoreError;
pub use graph::Graph;
pub use id::{EdgeId, NodeId};
pub use node::{Node, SOURCE_NAME_ATTRIBUTE};
