//! Loading the mapping graph.
//!
//! A mapping document lists proxy nodes and `Maps_To` edges. Unlike
//! [`from_document`](crate::convert::from_document), loading a mapping is
//! lenient: an edge that cannot be used by the analysis is dropped with a
//! warning instead of failing the load. An edge is dropped if
//!
//! - its type is not `Maps_To`,
//! - its source is not an implementation node,
//! - its target is not an architecture node, or
//! - its source is already mapped by an earlier edge.
//!
//! Endpoints without a proxy in the document get one copied from the
//! implementation or architecture node.

use indexmap::IndexSet;
use reflexion_analysis::MAPS_TO_EDGE_TYPE;
use reflexion_core::{Edge, Graph, NodeId};
use tracing::{debug, warn};

use crate::convert::node_from_document;
use crate::document::GraphDocument;
use crate::error::StorageError;

/// Builds the mapping graph for the given implementation and architecture.
pub fn load_mapping(
    doc: &GraphDocument,
    implementation: &Graph,
    architecture: &Graph,
) -> Result<Graph, StorageError> {
    let mut mapping = Graph::new(doc.name.clone());
    mapping.attributes = doc.attributes.clone();
    for node_doc in &doc.nodes {
        mapping.add_node(node_from_document(node_doc))?;
    }

    let mut mapped: IndexSet<&str> = IndexSet::new();
    let mut dropped = 0usize;
    for edge_doc in &doc.edges {
        let key = edge_doc.key();
        let Some(impl_node) = implementation.try_get_node(&edge_doc.source) else {
            warn!(edge = %key, "mapping source is not an implementation node; dropped");
            dropped += 1;
            continue;
        };
        let Some(arch_node) = architecture.try_get_node(&edge_doc.target) else {
            warn!(edge = %key, "mapping target is not an architecture node; dropped");
            dropped += 1;
            continue;
        };
        if edge_doc.edge_type != MAPS_TO_EDGE_TYPE {
            warn!(edge = %key, "mapping edge is not of type {}; dropped", MAPS_TO_EDGE_TYPE);
            dropped += 1;
            continue;
        }
        if !mapped.insert(edge_doc.source.as_str()) {
            warn!(edge = %key, "implementation node is already mapped; dropped");
            dropped += 1;
            continue;
        }

        let source = proxy(&mut mapping, implementation, impl_node)?;
        let target = proxy(&mut mapping, architecture, arch_node)?;
        let mut edge = Edge::new(MAPS_TO_EDGE_TYPE);
        edge.attributes = edge_doc.attributes.clone();
        mapping.add_edge(source, target, edge)?;
    }

    debug!(mapped = mapped.len(), dropped, "mapping loaded");
    Ok(mapping)
}

fn proxy(mapping: &mut Graph, origin: &Graph, node: NodeId) -> Result<NodeId, StorageError> {
    let original = origin.get_node(node)?;
    match mapping.try_get_node(original.link_name()) {
        Some(id) => Ok(id),
        None => Ok(mapping.add_node(original.clone())?),
    }
}
