//! Explicit and implicit mapping tables.
//!
//! The mapping graph holds proxy nodes that carry the link names of
//! implementation and architecture nodes; each `Maps_To` edge maps its source
//! (resolved in the implementation graph) onto its target (resolved in the
//! architecture graph). From these edges the engine keeps two tables keyed by
//! node handle:
//!
//! - the explicit map: implementation node -> architecture node, one entry
//!   per `Maps_To` edge;
//! - the implicit map: every explicit entry pushed down the implementation
//!   hierarchy onto descendants, stopping at explicitly mapped descendants.
//!
//! Every explicit entry is also an implicit entry.

use indexmap::IndexMap;
use reflexion_core::{Graph, NodeId};
use tracing::trace;

use crate::error::ReflexionError;

/// Edge type of mapping edges.
pub const MAPS_TO_EDGE_TYPE: &str = "Maps_To";

/// Implementation node -> architecture node tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTables {
    explicit: IndexMap<NodeId, NodeId>,
    implicit: IndexMap<NodeId, NodeId>,
}

impl MappingTables {
    /// Builds both tables from the `Maps_To` edges of `mapping`. Edges of
    /// other types are ignored.
    ///
    /// Fails with [`ReflexionError::UnknownNode`] if an endpoint does not
    /// resolve and with [`ReflexionError::AlreadyMapped`] if an
    /// implementation node is mapped twice.
    pub fn build(
        implementation: &Graph,
        architecture: &Graph,
        mapping: &Graph,
    ) -> Result<Self, ReflexionError> {
        let mut tables = MappingTables::default();
        for id in mapping.edges() {
            let edge = mapping.get_edge(id)?;
            if !edge.has_type(MAPS_TO_EDGE_TYPE) {
                continue;
            }
            let (source, target) = mapping.get_endpoints(id)?;
            let impl_node = resolve(implementation, "implementation", mapping.link_name(source)?)?;
            let arch_node = resolve(architecture, "architecture", mapping.link_name(target)?)?;
            if let Some(&previous) = tables.explicit.get(&impl_node) {
                return Err(ReflexionError::AlreadyMapped {
                    link_name: implementation.link_name(impl_node)?.to_string(),
                    target: architecture.link_name(previous)?.to_string(),
                });
            }
            tables.explicit.insert(impl_node, arch_node);
        }

        let explicit: Vec<(NodeId, NodeId)> = tables.explicit.iter().map(|(&k, &v)| (k, v)).collect();
        for (impl_node, arch_node) in explicit {
            tables.map_subtree(implementation, impl_node, arch_node);
        }
        Ok(tables)
    }

    pub fn explicit_target(&self, node: NodeId) -> Option<NodeId> {
        self.explicit.get(&node).copied()
    }

    pub fn implicit_target(&self, node: NodeId) -> Option<NodeId> {
        self.implicit.get(&node).copied()
    }

    pub fn is_explicitly_mapped(&self, node: NodeId) -> bool {
        self.explicit.contains_key(&node)
    }

    /// Explicit entries in mapping-edge order.
    pub fn explicit(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.explicit.iter().map(|(&k, &v)| (k, v))
    }

    /// Implicit entries.
    pub fn implicit(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.implicit.iter().map(|(&k, &v)| (k, v))
    }

    pub(crate) fn insert_explicit(&mut self, node: NodeId, target: NodeId) {
        self.explicit.insert(node, target);
    }

    pub(crate) fn remove_explicit(&mut self, node: NodeId) -> Option<NodeId> {
        self.explicit.shift_remove(&node)
    }

    /// `root` plus every descendant that inherits its mapping from `root`:
    /// the walk does not enter explicitly mapped descendants.
    pub fn subtree(&self, implementation: &Graph, root: NodeId) -> Vec<NodeId> {
        let mut result = vec![root];
        let mut stack: Vec<NodeId> = implementation.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.is_explicitly_mapped(node) {
                continue;
            }
            result.push(node);
            stack.extend(implementation.children(node).iter().rev().copied());
        }
        result
    }

    /// Maps `root` and its inheriting descendants onto `target`.
    pub(crate) fn map_subtree(&mut self, implementation: &Graph, root: NodeId, target: NodeId) {
        for node in self.subtree(implementation, root) {
            trace!(node = %node, target = %target, "implicitly mapped");
            self.implicit.insert(node, target);
        }
    }

    /// Removes the implicit entries of `root` and its inheriting descendants.
    pub(crate) fn unmap_subtree(&mut self, implementation: &Graph, root: NodeId) {
        for node in self.subtree(implementation, root) {
            self.implicit.shift_remove(&node);
        }
    }
}

fn resolve(graph: &Graph, role: &'static str, link_name: &str) -> Result<NodeId, ReflexionError> {
    graph
        .try_get_node(link_name)
        .ok_or_else(|| ReflexionError::UnknownNode {
            graph: role,
            link_name: link_name.to_string(),
        })
}
