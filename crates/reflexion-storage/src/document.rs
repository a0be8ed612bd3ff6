//! JSON interchange documents.
//!
//! A [`GraphDocument`] is the on-disk form of a [`Graph`](reflexion_core::Graph):
//!
//! ```json
//! {
//!   "name": "architecture",
//!   "nodes": [
//!     { "link_name": "A", "type": "Component" },
//!     { "link_name": "A.1", "source_name": "Core", "type": "Component", "parent": "A" }
//!   ],
//!   "edges": [
//!     { "type": "Call", "source": "A.1", "target": "A",
//!       "attributes": { "toggles": ["Architecture.Is_Optional"] } }
//!   ]
//! }
//! ```
//!
//! Every field except `link_name`, `source`, and `target` is optional.

use reflexion_core::Attributes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub link_name: String,
    /// Display name; stored as the `Source.Name` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Link name of the parent node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    #[serde(rename = "type", default)]
    pub edge_type: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

impl EdgeDocument {
    /// The compound key `type#source#target`.
    pub fn key(&self) -> String {
        reflexion_core::edge_key(&self.edge_type, &self.source, &self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_parses() {
        let doc: GraphDocument = serde_json::from_str(
            r#"{"nodes": [{"link_name": "a"}], "edges": [{"source": "a", "target": "a"}]}"#,
        )
        .unwrap();
        assert_eq!(doc.name, "");
        assert_eq!(doc.nodes[0].node_type, "");
        assert_eq!(doc.nodes[0].parent, None);
        assert_eq!(doc.edges[0].edge_type, "");
        assert!(doc.edges[0].attributes.is_empty());
    }

    #[test]
    fn optional_fields_are_omitted() {
        let doc = GraphDocument {
            name: "g".into(),
            nodes: vec![NodeDocument {
                link_name: "a".into(),
                source_name: None,
                node_type: "Class".into(),
                parent: None,
                attributes: Attributes::new(),
            }],
            ..GraphDocument::default()
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"name":"g","nodes":[{"link_name":"a","type":"Class"}],"edges":[]}"#
        );
    }

    #[test]
    fn edge_key_joins_type_and_endpoints() {
        let edge: EdgeDocument =
            serde_json::from_str(r#"{"type": "Maps_To", "source": "a", "target": "A"}"#).unwrap();
        assert_eq!(edge.key(), "Maps_To#a#A");
    }
}
