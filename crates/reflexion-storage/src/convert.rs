//! Conversions between [`Graph`] and [`GraphDocument`].
//!
//! [`from_document`] rebuilds a graph: nodes first, then the hierarchy from
//! each node's `parent`, then levels, then edges. [`to_document`] writes
//! nodes in insertion order and edges in edge index order, so a graph
//! survives a save/load cycle with the same node order, hierarchy, and
//! attributes (including the reflexion state and counter of each edge).

use reflexion_core::{Edge, Graph, Node, SOURCE_NAME_ATTRIBUTE};
use tracing::debug;

use crate::document::{EdgeDocument, GraphDocument, NodeDocument};
use crate::error::StorageError;

/// Builds a [`Graph`] from a document.
pub fn from_document(doc: &GraphDocument) -> Result<Graph, StorageError> {
    let mut graph = Graph::new(doc.name.clone());
    graph.attributes = doc.attributes.clone();

    for node_doc in &doc.nodes {
        graph.add_node(node_from_document(node_doc))?;
    }

    for node_doc in &doc.nodes {
        let Some(parent) = &node_doc.parent else {
            continue;
        };
        let parent_id = graph
            .try_get_node(parent)
            .ok_or_else(|| StorageError::UnknownNode {
                context: format!("parent of '{}'", node_doc.link_name),
                link_name: parent.clone(),
            })?;
        let child_id = graph
            .try_get_node(&node_doc.link_name)
            .ok_or_else(|| StorageError::UnknownNode {
                context: "hierarchy".into(),
                link_name: node_doc.link_name.clone(),
            })?;
        graph.add_child(parent_id, child_id)?;
    }
    graph.calculate_levels();

    for edge_doc in &doc.edges {
        let source = endpoint(&graph, edge_doc, &edge_doc.source)?;
        let target = endpoint(&graph, edge_doc, &edge_doc.target)?;
        let mut edge = Edge::new(edge_doc.edge_type.clone());
        edge.attributes = edge_doc.attributes.clone();
        graph.add_edge(source, target, edge)?;
    }

    debug!(
        graph = graph.name(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

pub(crate) fn node_from_document(doc: &NodeDocument) -> Node {
    let mut node = Node::new(doc.link_name.clone(), doc.node_type.clone());
    node.attributes = doc.attributes.clone();
    if let Some(name) = &doc.source_name {
        node.set_source_name(name.clone());
    }
    node
}

fn endpoint(
    graph: &Graph,
    edge_doc: &EdgeDocument,
    link_name: &str,
) -> Result<reflexion_core::NodeId, StorageError> {
    graph
        .try_get_node(link_name)
        .ok_or_else(|| StorageError::UnknownNode {
            context: format!("edge {}", edge_doc.key()),
            link_name: link_name.to_string(),
        })
}

/// Writes a [`Graph`] out as a document.
pub fn to_document(graph: &Graph) -> Result<GraphDocument, StorageError> {
    let mut nodes = Vec::with_capacity(graph.node_count());
    for id in graph.nodes() {
        let node = graph.get_node(id)?;
        let mut attributes = node.attributes.clone();
        let source_name = attributes.remove_string(SOURCE_NAME_ATTRIBUTE);
        let parent = match node.parent() {
            Some(parent) => Some(graph.link_name(parent)?.to_string()),
            None => None,
        };
        nodes.push(NodeDocument {
            link_name: node.link_name().to_string(),
            source_name,
            node_type: node.node_type().to_string(),
            parent,
            attributes,
        });
    }

    let mut edges = Vec::with_capacity(graph.edge_count());
    for id in graph.edges() {
        let edge = graph.get_edge(id)?;
        let (source, target) = graph.get_endpoints(id)?;
        edges.push(EdgeDocument {
            edge_type: edge.edge_type().to_string(),
            source: graph.link_name(source)?.to_string(),
            target: graph.link_name(target)?.to_string(),
            attributes: edge.attributes.clone(),
        });
    }

    Ok(GraphDocument {
        name: graph.name().to_string(),
        attributes: graph.attributes.clone(),
        nodes,
        edges,
    })
}
