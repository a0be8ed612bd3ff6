//! Graph: an arena of uniquely named, hierarchical nodes and typed edges.
//!
//! [`Graph`] wraps a petgraph `StableGraph<Node, Edge>`. Nodes are addressed
//! by stable [`NodeId`] handles and, externally, by their unique link name.
//! Dependencies are ordinary petgraph edges. The part-of hierarchy is kept
//! separately on the nodes (parent + ordered children) and never shows up as
//! an edge.
//!
//! # Invariants
//!
//! - No two nodes share a link name; link names are never empty.
//! - The parent/child relation is a forest. [`Graph::add_child`] rejects a
//!   child that already has a parent and any link that would close a cycle.
//! - Every edge endpoint is a node of this graph.
//!
//! All mutations go through `Graph` methods so that the link-name index and
//! the hierarchy stay consistent. Edge iteration follows edge index order,
//! which keeps test output deterministic.

use std::cmp::Ordering;
use std::fmt::Write as _;

use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use crate::attributes::Attributes;
use crate::edge::{self, Edge};
use crate::error::CoreError;
use crate::id::{EdgeId, NodeId};
use crate::node::Node;

/// A graph of hierarchical, uniquely named nodes and typed dependencies.
#[derive(Debug, Default)]
pub struct Graph {
    /// Node and edge storage.
    graph: StableGraph<Node, Edge, Directed, u32>,
    /// Link name -> node handle, in insertion order.
    by_link_name: IndexMap<String, NodeId>,
    /// Display name of the graph.
    name: String,
    /// Path of the file this graph was loaded from, if any.
    path: String,
    /// Attributes of the graph itself.
    pub attributes: Attributes,
}

impl Graph {
    /// Creates an empty graph with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Graph {
            name: name.into(),
            ..Graph::default()
        }
    }

    /// Name of the graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the graph.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Path the graph was loaded from, empty if none.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Records the path the graph was loaded from.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Adds a node and returns its handle.
    ///
    /// Fails with [`CoreError::EmptyLinkName`] or
    /// [`CoreError::DuplicateLinkName`].
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, CoreError> {
        if node.link_name().is_empty() {
            return Err(CoreError::EmptyLinkName);
        }
        if self.by_link_name.contains_key(node.link_name()) {
            return Err(CoreError::DuplicateLinkName {
                link_name: node.link_name().to_string(),
            });
        }
        let link_name = node.link_name().to_string();
        let id = NodeId::from(self.graph.add_node(node));
        self.by_link_name.insert(link_name, id);
        Ok(id)
    }

    /// Returns `true` if a node with this link name exists.
    pub fn contains(&self, link_name: &str) -> bool {
        self.by_link_name.contains_key(link_name)
    }

    /// Looks a node up by link name.
    pub fn try_get_node(&self, link_name: &str) -> Option<NodeId> {
        self.by_link_name.get(link_name).copied()
    }

    /// The node with the given id, if it exists.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node_weight(id.into())
    }

    /// Mutable access to a node's type and attributes. Link name and
    /// hierarchy can only be changed through `Graph`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.graph.node_weight_mut(id.into())
    }

    /// Like [`node`](Self::node) but fails with [`CoreError::NodeNotFound`].
    pub fn get_node(&self, id: NodeId) -> Result<&Node, CoreError> {
        self.node(id).ok_or(CoreError::NodeNotFound { id })
    }

    /// Link name of a node. Fails if the handle is unknown.
    pub fn link_name(&self, id: NodeId) -> Result<&str, CoreError> {
        self.get_node(id).map(Node::link_name)
    }

    /// Changes the link name of a node, keeping the index consistent.
    pub fn rename_node(&mut self, id: NodeId, link_name: impl Into<String>) -> Result<(), CoreError> {
        let link_name = link_name.into();
        if link_name.is_empty() {
            return Err(CoreError::EmptyLinkName);
        }
        let old = self.link_name(id)?.to_string();
        if old == link_name {
            return Ok(());
        }
        if self.by_link_name.contains_key(&link_name) {
            return Err(CoreError::DuplicateLinkName { link_name });
        }
        self.by_link_name.shift_remove(&old);
        self.by_link_name.insert(link_name.clone(), id);
        if let Some(node) = self.graph.node_weight_mut(id.into()) {
            node.set_link_name(link_name);
        }
        Ok(())
    }

    /// All node handles, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_link_name.values().copied()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Adds a dependency from `source` to `target`. Both must be nodes of
    /// this graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, edge: Edge) -> Result<EdgeId, CoreError> {
        self.get_node(source)?;
        self.get_node(target)?;
        let idx = self.graph.add_edge(source.into(), target.into(), edge);
        Ok(EdgeId::from(idx))
    }

    /// Removes an edge and returns its weight.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, CoreError> {
        self.graph
            .remove_edge(id.into())
            .ok_or(CoreError::EdgeNotFound { id })
    }

    /// The edge with the given id, if it exists.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.graph.edge_weight(id.into())
    }

    /// Mutable access to an edge, if it exists.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.graph.edge_weight_mut(id.into())
    }

    /// Like [`edge`](Self::edge) but fails with [`CoreError::EdgeNotFound`].
    pub fn get_edge(&self, id: EdgeId) -> Result<&Edge, CoreError> {
        self.edge(id).ok_or(CoreError::EdgeNotFound { id })
    }

    /// Source and target of an edge.
    pub fn endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        self.graph
            .edge_endpoints(id.into())
            .map(|(s, t)| (NodeId::from(s), NodeId::from(t)))
    }

    /// Like [`endpoints`](Self::endpoints) but fails with
    /// [`CoreError::EdgeNotFound`].
    pub fn get_endpoints(&self, id: EdgeId) -> Result<(NodeId, NodeId), CoreError> {
        self.endpoints(id).ok_or(CoreError::EdgeNotFound { id })
    }

    /// All edge handles, in edge index order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.graph.edge_indices().map(EdgeId::from)
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The compound key `type#source#target` of an edge.
    pub fn edge_key(&self, id: EdgeId) -> Option<String> {
        let edge = self.edge(id)?;
        let (source, target) = self.endpoints(id)?;
        Some(edge::edge_key(
            edge.edge_type(),
            self.node(source)?.link_name(),
            self.node(target)?.link_name(),
        ))
    }

    /// Outgoing edges of `node`, in edge index order.
    pub fn outgoings(&self, node: NodeId) -> Vec<EdgeId> {
        self.adjacent(node, Direction::Outgoing)
    }

    /// Incoming edges of `node`, in edge index order.
    pub fn incomings(&self, node: NodeId) -> Vec<EdgeId> {
        self.adjacent(node, Direction::Incoming)
    }

    fn adjacent(&self, node: NodeId, direction: Direction) -> Vec<EdgeId> {
        let idx: NodeIndex<u32> = node.into();
        if self.graph.node_weight(idx).is_none() {
            return Vec::new();
        }
        let mut result: Vec<EdgeId> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| EdgeId::from(e.id()))
            .collect();
        result.sort();
        result
    }

    /// All edges from `source` to `target` with exactly the given type.
    pub fn from_to(&self, source: NodeId, target: NodeId, edge_type: &str) -> Vec<EdgeId> {
        let target_idx: NodeIndex<u32> = target.into();
        self.outgoings(source)
            .into_iter()
            .filter(|&id| {
                let idx: EdgeIndex<u32> = id.into();
                self.graph
                    .edge_endpoints(idx)
                    .is_some_and(|(_, t)| t == target_idx)
                    && self.graph[idx].has_type(edge_type)
            })
            .collect()
    }

    /// Edges whose source and target both belong to `selected`.
    pub fn connecting_edges(&self, selected: &[NodeId]) -> Vec<EdgeId> {
        self.edges()
            .filter(|&id| {
                self.endpoints(id)
                    .is_some_and(|(s, t)| selected.contains(&s) && selected.contains(&t))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Makes `child` a child of `parent` and updates the levels of the moved
    /// subtree.
    ///
    /// Fails with [`CoreError::HierarchyNotATree`] if `child` already has a
    /// parent or if `child` is `parent` itself or one of its ancestors.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), CoreError> {
        let parent_level = self.get_node(parent)?.level();
        let child_node = self.get_node(child)?;
        if child_node.parent().is_some() {
            return Err(CoreError::HierarchyNotATree {
                link_name: child_node.link_name().to_string(),
                reason: "already has a parent".into(),
            });
        }
        if self.ascendants(parent).contains(&child) {
            return Err(CoreError::HierarchyNotATree {
                link_name: child_node.link_name().to_string(),
                reason: "would become its own ancestor".into(),
            });
        }

        if let Some(node) = self.graph.node_weight_mut(parent.into()) {
            node.push_child(child);
        }
        if let Some(node) = self.graph.node_weight_mut(child.into()) {
            node.set_parent(Some(parent));
        }
        self.set_level(child, parent_level + 1);
        Ok(())
    }

    /// Parent of `id` in the containment hierarchy, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Children of `id` in their stored order; empty for unknown handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    /// All nodes without a parent, in insertion order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|&id| self.node(id).is_some_and(Node::is_root))
            .collect()
    }

    /// `id` followed by all of its transitive parents, innermost first.
    pub fn ascendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut cursor = self.node(id).map(|_| id);
        while let Some(current) = cursor {
            result.push(current);
            cursor = self.parent(current);
        }
        result
    }

    /// Returns `true` if `ancestor` is a proper ancestor of `descendant`.
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(descendant);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// All descendants of `id` (excluding `id`), in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Number of levels of the subtree rooted at `id` (a leaf has depth 1).
    pub fn depth(&self, id: NodeId) -> usize {
        1 + self
            .children(id)
            .iter()
            .map(|&child| self.depth(child))
            .max()
            .unwrap_or(0)
    }

    /// Maximal depth over all trees; 0 for an empty graph.
    pub fn max_depth(&self) -> usize {
        self.roots()
            .into_iter()
            .map(|root| self.depth(root))
            .max()
            .unwrap_or(0)
    }

    /// Recomputes the level of every node top-down from the roots.
    pub fn calculate_levels(&mut self) {
        for root in self.roots() {
            self.set_level(root, 0);
        }
    }

    fn set_level(&mut self, id: NodeId, level: u32) {
        let mut stack = vec![(id, level)];
        while let Some((current, level)) = stack.pop() {
            let Some(node) = self.graph.node_weight_mut(current.into()) else {
                continue;
            };
            node.set_level(level);
            stack.extend(node.children().iter().map(|&child| (child, level + 1)));
        }
    }

    /// Sorts the children of every node with the given comparison.
    pub fn sort_hierarchy<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Node, &Node) -> Ordering,
    {
        let ids: Vec<NodeId> = self.nodes().collect();
        for id in ids {
            let mut children: Vec<NodeId> = self.children(id).to_vec();
            if children.len() < 2 {
                continue;
            }
            children.sort_by(|&a, &b| compare(&self.graph[NodeIndex::from(a)], &self.graph[NodeIndex::from(b)]));
            if let Some(node) = self.graph.node_weight_mut(id.into()) {
                let slot = node.children_mut();
                slot.clear();
                slot.extend(children);
            }
        }
    }

    /// Sorts children by display name (source name, falling back to link
    /// name).
    pub fn sort_hierarchy_by_name(&mut self) {
        self.sort_hierarchy(|a, b| a.display_name().cmp(b.display_name()));
    }

    /// Renders the hierarchy as indented link names, one per line.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        for root in self.roots() {
            let mut stack = vec![(root, 0usize)];
            while let Some((id, depth)) = stack.pop() {
                if let Some(node) = self.node(id) {
                    let _ = writeln!(out, "{}{}", "-".repeat(depth), node.link_name());
                    stack.extend(node.children().iter().rev().map(|&c| (c, depth + 1)));
                }
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Copying
    // -----------------------------------------------------------------------

    /// Creates an isomorphic copy of this graph.
    ///
    /// Nodes are copied attributes-only, then edges and the hierarchy are
    /// reattached to the new nodes by link-name lookup. A link name that
    /// cannot be resolved in the copy fails with
    /// [`CoreError::MissingLinkName`].
    pub fn try_clone(&self) -> Result<Graph, CoreError> {
        let mut target = Graph::new(self.name.clone());
        target.path = self.path.clone();
        target.attributes = self.attributes.clone();

        for id in self.nodes() {
            target.add_node(self.get_node(id)?.clone())?;
        }

        for id in self.edges() {
            let (source, target_node) = self.get_endpoints(id)?;
            let new_source = target.resolve(self.link_name(source)?)?;
            let new_target = target.resolve(self.link_name(target_node)?)?;
            target.add_edge(new_source, new_target, self.get_edge(id)?.clone())?;
        }

        for root in self.roots() {
            target.resolve(self.link_name(root)?)?;
            let mut stack = vec![root];
            while let Some(from_parent) = stack.pop() {
                let to_parent = target.resolve(self.link_name(from_parent)?)?;
                for &from_child in self.children(from_parent) {
                    let to_child = target.resolve(self.link_name(from_child)?)?;
                    target.add_child(to_parent, to_child)?;
                    stack.push(from_child);
                }
            }
        }
        target.calculate_levels();
        Ok(target)
    }

    fn resolve(&self, link_name: &str) -> Result<NodeId, CoreError> {
        self.try_get_node(link_name)
            .ok_or_else(|| CoreError::MissingLinkName {
                link_name: link_name.to_string(),
            })
    }

    /// Removes all nodes and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.by_link_name.clear();
    }
}
