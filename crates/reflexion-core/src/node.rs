//! Graph nodes.
//!
//! A [`Node`] is identified within its graph by a unique *link name*. It
//! carries a type, an attribute store, and its position in the part-of
//! hierarchy (parent, ordered children, level). The hierarchy fields are
//! maintained by [`Graph`](crate::graph::Graph) and are read-only here.

use std::fmt;

use smallvec::SmallVec;

use crate::attributes::Attributes;
use crate::error::CoreError;
use crate::id::NodeId;

/// String attribute holding the (non-unique) display name of a node.
pub const SOURCE_NAME_ATTRIBUTE: &str = "Source.Name";

/// A hierarchical, typed, attributed graph node.
///
/// Cloning a node copies its link name, type, and attributes only. The clone
/// has no parent, no children, and level 0. Hierarchy handles are never
/// shared between a node and its clone.
#[derive(Debug, PartialEq)]
pub struct Node {
    link_name: String,
    node_type: String,
    /// Typed attributes of this node.
    pub attributes: Attributes,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    level: u32,
}

impl Node {
    /// Creates a detached node with the given link name and type.
    pub fn new(link_name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Node {
            link_name: link_name.into(),
            node_type: node_type.into(),
            attributes: Attributes::new(),
            parent: None,
            children: SmallVec::new(),
            level: 0,
        }
    }

    /// Builder-style setter for the display name.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.set_source_name(name);
        self
    }

    /// The unique identifier of this node within its graph.
    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    pub(crate) fn set_link_name(&mut self, link_name: String) {
        self.link_name = link_name;
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn set_node_type(&mut self, node_type: impl Into<String>) {
        self.node_type = node_type.into();
    }

    /// Returns the display name. Fails if it was never set.
    pub fn source_name(&self) -> Result<&str, CoreError> {
        self.attributes.get_string(SOURCE_NAME_ATTRIBUTE)
    }

    pub fn set_source_name(&mut self, name: impl Into<String>) {
        self.attributes.set_string(SOURCE_NAME_ATTRIBUTE, name);
    }

    /// The display name if set, the link name otherwise.
    pub fn display_name(&self) -> &str {
        self.attributes
            .try_get_string(SOURCE_NAME_ATTRIBUTE)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.link_name)
    }

    // -----------------------------------------------------------------------
    // Hierarchy (read-only; mutated through Graph)
    // -----------------------------------------------------------------------

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn number_of_children(&self) -> usize {
        self.children.len()
    }

    /// Distance from the root of this node's tree (root = 0).
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub(crate) fn children_mut(&mut self) -> &mut SmallVec<[NodeId; 4]> {
        &mut self.children
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Node {
            link_name: self.link_name.clone(),
            node_type: self.node_type.clone(),
            attributes: self.attributes.clone(),
            parent: None,
            children: SmallVec::new(),
            level: 0,
        }
    }
}

impl fmt::Display for Node {
    /// `Component "pkg.Foo" {Source.Name="Foo"}`; the link name is quoted
    /// and escaped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} {}", self.node_type, self.link_name, self.attributes)
    }
}
