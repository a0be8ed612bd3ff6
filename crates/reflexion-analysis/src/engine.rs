//! The reflexion engine.
//!
//! [`Reflexion`] owns the implementation, architecture, and mapping graphs.
//! [`Reflexion::run`] builds the mapping tables and classifies every
//! architecture dependency from scratch:
//!
//! 1. Reset: specified edges go to counter 0 (edges without a state become
//!    `specified`); propagated edges left over from an earlier run go to
//!    counter 0 and are marked stale.
//! 2. Propagate and lift every relevant dependency between mapped
//!    implementation nodes. A stale propagated edge that is hit again is
//!    revived in place, so an unchanged input produces no events.
//! 3. Specified edges still at counter 0 become `absent` (or
//!    `allowed_absent` if optional).
//! 4. Stale edges that were not revived are removed.
//!
//! After a run, mapping edits, implementation-dependency edits, and edits of
//! specified architecture dependencies are applied incrementally and leave
//! the graphs in the same state a new run would. Node and hierarchy edits
//! are not supported incrementally.

use indexmap::IndexSet;
use reflexion_core::{CoreError, Edge, EdgeId, Graph, Node, NodeId};
use tracing::{debug, info, trace};

use crate::config::ReflexionConfig;
use crate::error::ReflexionError;
use crate::event::{ChangeEvent, EdgeSnapshot, ObserverId, ObserverRegistry, ReflexionObserver};
use crate::mapping::{MappingTables, MAPS_TO_EDGE_TYPE};
use crate::state::{self, specified_state, State, COUNTER_ATTRIBUTE, OPTIONAL_TOGGLE, STATE_ATTRIBUTE};
use crate::type_hierarchy::TypeHierarchy;

/// A propagated edge and the specified edge it is lifted onto.
#[derive(Debug)]
struct Lifted {
    edge: EdgeId,
    source: NodeId,
    target: NodeId,
    edge_type: String,
    covering: Option<EdgeId>,
}

/// Incremental reflexion analysis over three owned graphs.
#[derive(Debug)]
pub struct Reflexion {
    implementation: Graph,
    architecture: Graph,
    mapping: Graph,
    config: ReflexionConfig,
    types: TypeHierarchy,
    tables: MappingTables,
    observers: ObserverRegistry,
    /// Propagated edges of the previous run not yet revived by this one.
    stale: IndexSet<EdgeId>,
    /// Whether `from_scratch` has completed at least once.
    analyzed: bool,
}

impl Reflexion {
    /// Creates an engine over the given graphs. Nothing is analyzed until
    /// [`run`](Self::run) is called.
    pub fn new(
        implementation: Graph,
        architecture: Graph,
        mapping: Graph,
        config: ReflexionConfig,
    ) -> Result<Self, ReflexionError> {
        let types = config.type_hierarchy()?;
        Ok(Reflexion {
            implementation,
            architecture,
            mapping,
            config,
            types,
            tables: MappingTables::default(),
            observers: ObserverRegistry::new(),
            stale: IndexSet::new(),
            analyzed: false,
        })
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Registers an observer for all subsequent change events.
    pub fn register(&mut self, observer: impl ReflexionObserver + 'static) -> ObserverId {
        self.observers.register(observer)
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: ObserverId) -> bool {
        self.observers.unregister(id)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The implementation graph.
    pub fn implementation(&self) -> &Graph {
        &self.implementation
    }

    /// The architecture graph, including propagated edges.
    pub fn architecture(&self) -> &Graph {
        &self.architecture
    }

    /// The mapping graph.
    pub fn mapping(&self) -> &Graph {
        &self.mapping
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &ReflexionConfig {
        &self.config
    }

    /// Explicit and implicit mapping tables of the last run.
    pub fn tables(&self) -> &MappingTables {
        &self.tables
    }

    /// Gives the graphs back, in (implementation, architecture, mapping)
    /// order.
    pub fn into_graphs(self) -> (Graph, Graph, Graph) {
        (self.implementation, self.architecture, self.mapping)
    }

    /// State of an architecture edge.
    pub fn state(&self, edge: EdgeId) -> Result<State, ReflexionError> {
        state::edge_state(self.architecture.get_edge(edge)?)
    }

    /// Counter of an architecture edge.
    pub fn counter(&self, edge: EdgeId) -> Result<i64, ReflexionError> {
        Ok(state::edge_counter(self.architecture.get_edge(edge)?))
    }

    /// Returns `true` if the implementation node has its own `Maps_To` edge.
    pub fn is_explicitly_mapped(&self, node: NodeId) -> bool {
        self.tables.is_explicitly_mapped(node)
    }

    /// Architecture node the implementation node is explicitly mapped onto.
    pub fn explicit_target(&self, node: NodeId) -> Option<NodeId> {
        self.tables.explicit_target(node)
    }

    /// Architecture node the implementation node is mapped onto, explicitly
    /// or through an ancestor.
    pub fn maps_to(&self, node: NodeId) -> Option<NodeId> {
        self.tables.implicit_target(node)
    }

    /// Propagated edge from `source` to `target` with exactly `edge_type`.
    pub fn propagated_edge(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
    ) -> Result<Option<EdgeId>, ReflexionError> {
        for edge in self.architecture.from_to(source, target, edge_type) {
            if !self.state(edge)?.is_specified() {
                return Ok(Some(edge));
            }
        }
        Ok(None)
    }

    // -----------------------------------------------------------------------
    // Full analysis
    // -----------------------------------------------------------------------

    /// Builds the mapping tables and analyzes from scratch.
    pub fn run(&mut self) -> Result<(), ReflexionError> {
        self.register_nodes();
        self.add_transitive_mapping()?;
        self.from_scratch()
    }

    fn register_nodes(&mut self) {
        self.implementation.calculate_levels();
        self.architecture.calculate_levels();
    }

    fn add_transitive_mapping(&mut self) -> Result<(), ReflexionError> {
        self.tables = MappingTables::build(&self.implementation, &self.architecture, &self.mapping)?;
        debug!(
            explicit = self.tables.explicit().count(),
            implicit = self.tables.implicit().count(),
            "mapping tables built"
        );
        Ok(())
    }

    /// Recomputes every state and counter with the current mapping tables.
    ///
    /// Running it twice without intervening edits emits no events on the
    /// second call.
    pub fn from_scratch(&mut self) -> Result<(), ReflexionError> {
        self.reset_architecture()?;

        let sources: Vec<NodeId> = self
            .implementation
            .nodes()
            .filter(|&node| self.tables.implicit_target(node).is_some())
            .collect();
        for node in sources {
            for edge in self.implementation.outgoings(node) {
                if self.is_relevant(edge)? {
                    self.propagate_and_lift(edge, 1)?;
                }
            }
        }

        self.calculate_absences()?;
        self.remove_stale()?;
        self.analyzed = true;

        info!(
            implementation_edges = self.implementation.edge_count(),
            architecture_edges = self.architecture.edge_count(),
            "reflexion analysis finished"
        );
        Ok(())
    }

    fn reset_architecture(&mut self) -> Result<(), ReflexionError> {
        self.stale.clear();
        let edges: Vec<EdgeId> = self.architecture.edges().collect();
        for edge in edges {
            let state = self.state(edge)?;
            if state == State::Undefined {
                self.write_state(edge, State::Specified)?;
            } else if !state.is_specified() {
                self.stale.insert(edge);
            }
            self.write_counter(edge, 0)?;
        }
        Ok(())
    }

    fn calculate_absences(&mut self) -> Result<(), ReflexionError> {
        let edges: Vec<EdgeId> = self.architecture.edges().collect();
        for edge in edges {
            if self.state(edge)?.is_specified() && self.counter(edge)? == 0 {
                let optional = self.is_optional(edge)?;
                self.transition(edge, specified_state(0, optional))?;
            }
        }
        Ok(())
    }

    fn remove_stale(&mut self) -> Result<(), ReflexionError> {
        let stale: Vec<EdgeId> = self.stale.drain(..).collect();
        for edge in stale {
            self.remove_propagated(edge)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Propagation and lifting
    // -----------------------------------------------------------------------

    /// Adds `amount` occurrences of the implementation dependency `edge` to
    /// the architecture graph (or removes them, for a negative amount).
    fn propagate_and_lift(&mut self, edge: EdgeId, amount: i64) -> Result<(), ReflexionError> {
        let (source, target) = self.implementation.get_endpoints(edge)?;
        let edge_type = self.implementation.get_edge(edge)?.edge_type().to_string();

        let (Some(arch_source), Some(arch_target)) = (
            self.tables.implicit_target(source),
            self.tables.implicit_target(target),
        ) else {
            trace!(edge = %edge, "source or target unmapped");
            return Ok(());
        };

        match self.propagated_edge(arch_source, arch_target, &edge_type)? {
            Some(propagated) => {
                if self.stale.swap_remove(&propagated) {
                    if amount <= 0 {
                        return Err(ReflexionError::corrupt(format!(
                            "stale propagated edge {} decremented",
                            propagated
                        )));
                    }
                    trace!(edge = %propagated, "revived propagated edge");
                    self.write_counter(propagated, amount)?;
                    let state = self.classify(arch_source, arch_target, &edge_type, amount)?;
                    self.transition(propagated, state)?;
                } else {
                    self.change_impl_ref(propagated, amount)?;
                    self.lift(arch_source, arch_target, &edge_type, amount)?;
                }
            }
            None => {
                if amount <= 0 {
                    return Err(ReflexionError::corrupt(format!(
                        "no propagated {} edge to decrement for implementation edge {}",
                        edge_type, edge
                    )));
                }
                self.new_propagated_edge(arch_source, arch_target, &edge_type, amount)?;
            }
        }
        Ok(())
    }

    fn new_propagated_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        counter: i64,
    ) -> Result<EdgeId, ReflexionError> {
        let edge = self.architecture.add_edge(source, target, Edge::new(edge_type))?;
        self.write_counter(edge, counter)?;
        let snapshot = self.snapshot(edge)?;
        debug!(edge = %snapshot.key(), "propagated edge added");
        self.observers
            .notify(&ChangeEvent::PropagatedEdgeAdded { edge: snapshot });

        let state = self.classify(source, target, edge_type, counter)?;
        self.transition(edge, state)?;
        Ok(edge)
    }

    /// Lifts a new or revived propagated dependency and decides its state.
    fn classify(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &str,
        amount: i64,
    ) -> Result<State, ReflexionError> {
        let allowing = self.lift(source, target, edge_type, amount)?;
        Ok(self.decide(source, target, allowing))
    }

    /// State of a propagated edge from `source` to `target`, given the
    /// specified edge it is lifted onto.
    fn decide(&self, source: NodeId, target: NodeId, allowing: Option<EdgeId>) -> State {
        if source == target {
            State::ImplicitlyAllowed
        } else if allowing.is_some() {
            State::Allowed
        } else if self.config.allow_dependencies_to_parents
            && self.architecture.is_descendant_of(source, target)
        {
            State::ImplicitlyAllowed
        } else {
            State::Divergent
        }
    }

    /// Adds `amount` to the counter of a propagated edge. At zero the edge
    /// is removed.
    fn change_impl_ref(&mut self, edge: EdgeId, amount: i64) -> Result<(), ReflexionError> {
        let counter = self.counter(edge)? + amount;
        if counter < 0 {
            return Err(ReflexionError::corrupt(format!(
                "counter of propagated edge {} would drop to {}",
                edge, counter
            )));
        }
        if counter == 0 {
            self.remove_propagated(edge)
        } else {
            self.write_counter(edge, counter)
        }
    }

    fn remove_propagated(&mut self, edge: EdgeId) -> Result<(), ReflexionError> {
        let snapshot = self.snapshot(edge)?;
        debug!(edge = %snapshot.key(), "propagated edge removed");
        self.observers
            .notify(&ChangeEvent::PropagatedEdgeRemoved { edge: snapshot });
        self.architecture.remove_edge(edge)?;
        Ok(())
    }

    /// Adds `amount` to the counter of the specified edge covering a
    /// dependency of `edge_type` from `from` onto `to`, if there is one.
    fn lift(
        &mut self,
        from: NodeId,
        to: NodeId,
        edge_type: &str,
        amount: i64,
    ) -> Result<Option<EdgeId>, ReflexionError> {
        let covering = self.covering_edge(from, to, edge_type)?;
        if let Some(edge) = covering {
            trace!(edge = %edge, amount, "lifted onto specified edge");
            self.change_architecture_dependency(edge, amount)?;
        }
        Ok(covering)
    }

    /// Searches `from` and its ancestors, innermost first, for a specified
    /// edge covering a dependency of `edge_type` onto `to`.
    ///
    /// An edge covers the dependency if its type is `edge_type` or one of
    /// its supertypes and its target is `to` or an ancestor of `to`.
    fn covering_edge(&self, from: NodeId, to: NodeId, edge_type: &str) -> Result<Option<EdgeId>, ReflexionError> {
        let targets = self.architecture.ascendants(to);
        for cursor in self.architecture.ascendants(from) {
            for edge in self.architecture.outgoings(cursor) {
                if !self.state(edge)?.is_specified() {
                    continue;
                }
                let (_, target) = self.architecture.get_endpoints(edge)?;
                if targets.contains(&target)
                    && self
                        .types
                        .is_subtype_of(edge_type, self.architecture.get_edge(edge)?.edge_type())
                {
                    return Ok(Some(edge));
                }
            }
        }
        Ok(None)
    }

    /// Every propagated edge with the specified edge it is lifted onto.
    fn lifted_edges(&self) -> Result<Vec<Lifted>, ReflexionError> {
        let mut lifted = Vec::new();
        for edge in self.architecture.edges() {
            if !self.state(edge)?.is_propagated() {
                continue;
            }
            let (source, target) = self.architecture.get_endpoints(edge)?;
            let edge_type = self.architecture.get_edge(edge)?.edge_type().to_string();
            let covering = self.covering_edge(source, target, &edge_type)?;
            lifted.push(Lifted {
                edge,
                source,
                target,
                edge_type,
                covering,
            });
        }
        Ok(lifted)
    }

    /// Moves the counter of a propagated edge from the specified edge it
    /// was lifted onto to the one that covers it now, and reclassifies it.
    fn relift(&mut self, lifted: &Lifted, covering: Option<EdgeId>) -> Result<(), ReflexionError> {
        let counter = self.counter(lifted.edge)?;
        if let Some(previous) = lifted.covering {
            if self.architecture.edge(previous).is_some() {
                self.change_architecture_dependency(previous, -counter)?;
            }
        }
        if let Some(next) = covering {
            self.change_architecture_dependency(next, counter)?;
        }
        let state = self.decide(lifted.source, lifted.target, covering);
        self.transition(lifted.edge, state)
    }

    fn change_architecture_dependency(&mut self, edge: EdgeId, amount: i64) -> Result<(), ReflexionError> {
        let counter = self.counter(edge)? + amount;
        if counter < 0 {
            return Err(ReflexionError::corrupt(format!(
                "counter of specified edge {} would drop to {}",
                edge, counter
            )));
        }
        self.write_counter(edge, counter)?;
        let optional = self.is_optional(edge)?;
        self.transition(edge, specified_state(counter, optional))
    }

    // -----------------------------------------------------------------------
    // Incremental edits
    // -----------------------------------------------------------------------

    /// Maps the implementation node `impl_link` onto `arch_link` by adding a
    /// `Maps_To` edge, then remaps the affected subtree.
    pub fn add_to_mapping(&mut self, impl_link: &str, arch_link: &str) -> Result<EdgeId, ReflexionError> {
        let impl_node = self.resolve_implementation(impl_link)?;
        let arch_node = self.resolve_architecture(arch_link)?;
        if let Some(existing) = self.mapping_edge_of(impl_link)? {
            let (_, target) = self.mapping.get_endpoints(existing)?;
            return Err(ReflexionError::AlreadyMapped {
                link_name: impl_link.to_string(),
                target: self.mapping.link_name(target)?.to_string(),
            });
        }

        let source = self.proxy(impl_node, true)?;
        let target = self.proxy(arch_node, false)?;
        let edge = self.mapping.add_edge(source, target, Edge::new(MAPS_TO_EDGE_TYPE))?;
        let snapshot = EdgeSnapshot::capture(&self.mapping, edge).ok_or(CoreError::EdgeNotFound { id: edge })?;
        debug!(edge = %snapshot.key(), "mapping added");
        self.observers.notify(&ChangeEvent::MapsToEdgeAdded { edge: snapshot });

        if self.analyzed {
            if self.tables.implicit_target(impl_node) == Some(arch_node) {
                // Already inherited from an ancestor: nothing moves.
                self.tables.insert_explicit(impl_node, arch_node);
                return Ok(edge);
            }
            let affected = self.unpropagate_subtree(impl_node)?;
            self.tables.insert_explicit(impl_node, arch_node);
            self.tables.map_subtree(&self.implementation, impl_node, arch_node);
            self.propagate_all(&affected, 1)?;
        }
        Ok(edge)
    }

    /// Removes the `Maps_To` edge of `impl_link`. Its subtree falls back to
    /// the mapping of the nearest mapped ancestor, or becomes unmapped.
    pub fn delete_from_mapping(&mut self, impl_link: &str) -> Result<(), ReflexionError> {
        let impl_node = self.resolve_implementation(impl_link)?;
        let edge = self
            .mapping_edge_of(impl_link)?
            .ok_or_else(|| ReflexionError::NotMapped {
                link_name: impl_link.to_string(),
            })?;

        let snapshot = EdgeSnapshot::capture(&self.mapping, edge).ok_or(CoreError::EdgeNotFound { id: edge })?;
        self.mapping.remove_edge(edge)?;
        debug!(edge = %snapshot.key(), "mapping removed");
        self.observers.notify(&ChangeEvent::MapsToEdgeRemoved { edge: snapshot });

        if self.analyzed {
            let inherited = self
                .implementation
                .parent(impl_node)
                .and_then(|parent| self.tables.implicit_target(parent));
            if inherited.is_some() && inherited == self.tables.implicit_target(impl_node) {
                self.tables.remove_explicit(impl_node);
                return Ok(());
            }
            let affected = self.unpropagate_subtree(impl_node)?;
            self.tables.remove_explicit(impl_node);
            match inherited {
                Some(target) => self.tables.map_subtree(&self.implementation, impl_node, target),
                None => self.tables.unmap_subtree(&self.implementation, impl_node),
            }
            self.propagate_all(&affected, 1)?;
        }
        Ok(())
    }

    /// Adds an implementation dependency and propagates it.
    pub fn add_to_dependencies(
        &mut self,
        source: &str,
        target: &str,
        edge_type: &str,
    ) -> Result<EdgeId, ReflexionError> {
        let source = self.resolve_implementation(source)?;
        let target = self.resolve_implementation(target)?;
        let edge = self.implementation.add_edge(source, target, Edge::new(edge_type))?;
        let snapshot = EdgeSnapshot::capture(&self.implementation, edge).ok_or(CoreError::EdgeNotFound { id: edge })?;
        debug!(edge = %snapshot.key(), "implementation dependency added");
        self.observers.notify(&ChangeEvent::ImplementationEdgeAdded { edge: snapshot });

        if self.analyzed && self.is_relevant(edge)? {
            self.propagate_and_lift(edge, 1)?;
        }
        Ok(edge)
    }

    /// Removes an implementation dependency and withdraws its propagation.
    pub fn delete_from_dependencies(&mut self, edge: EdgeId) -> Result<(), ReflexionError> {
        let snapshot = EdgeSnapshot::capture(&self.implementation, edge).ok_or(CoreError::EdgeNotFound { id: edge })?;
        debug!(edge = %snapshot.key(), "implementation dependency removed");
        self.observers.notify(&ChangeEvent::ImplementationEdgeRemoved { edge: snapshot });

        if self.analyzed && self.is_relevant(edge)? {
            self.propagate_and_lift(edge, -1)?;
        }
        self.implementation.remove_edge(edge)?;
        Ok(())
    }

    /// Adds a specified dependency to the architecture.
    ///
    /// Propagated edges the new edge covers more closely than their current
    /// specified edge are lifted onto it. It ends up `convergent` if it
    /// covers any, `absent` (or `allowed_absent`) otherwise.
    pub fn add_to_architecture(
        &mut self,
        source: &str,
        target: &str,
        edge_type: &str,
    ) -> Result<EdgeId, ReflexionError> {
        let source = self.resolve_architecture(source)?;
        let target = self.resolve_architecture(target)?;
        let before = if self.analyzed {
            self.lifted_edges()?
        } else {
            Vec::new()
        };

        let edge = self.architecture.add_edge(source, target, Edge::new(edge_type))?;
        let snapshot = self.snapshot(edge)?;
        debug!(edge = %snapshot.key(), "architecture dependency added");
        self.observers.notify(&ChangeEvent::ArchitectureEdgeAdded { edge: snapshot });
        if !self.analyzed {
            return Ok(edge);
        }

        self.write_state(edge, State::Specified)?;
        self.write_counter(edge, 0)?;
        for lifted in &before {
            let covering = self.covering_edge(lifted.source, lifted.target, &lifted.edge_type)?;
            if covering == Some(edge) {
                self.relift(lifted, covering)?;
            }
        }
        if self.counter(edge)? == 0 {
            let optional = self.is_optional(edge)?;
            self.transition(edge, specified_state(0, optional))?;
        }
        Ok(edge)
    }

    /// Removes a specified dependency from the architecture.
    ///
    /// Propagated edges lifted onto it move to the next covering specified
    /// edge, if any, and are reclassified. Fails with
    /// [`ReflexionError::NotSpecified`] for a propagated edge.
    pub fn delete_from_architecture(&mut self, edge: EdgeId) -> Result<(), ReflexionError> {
        let snapshot = self.snapshot(edge)?;
        if self.state(edge)?.is_propagated() {
            return Err(ReflexionError::NotSpecified { key: snapshot.key() });
        }
        let before = if self.analyzed {
            self.lifted_edges()?
        } else {
            Vec::new()
        };

        self.architecture.remove_edge(edge)?;
        debug!(edge = %snapshot.key(), "architecture dependency removed");
        self.observers.notify(&ChangeEvent::ArchitectureEdgeRemoved { edge: snapshot });

        for lifted in before.iter().filter(|l| l.covering == Some(edge)) {
            let covering = self.covering_edge(lifted.source, lifted.target, &lifted.edge_type)?;
            self.relift(lifted, covering)?;
        }
        Ok(())
    }

    /// Not supported incrementally; add the node to the graph and rerun.
    pub fn add_node_to_implementation(&mut self, _node: Node) -> Result<NodeId, ReflexionError> {
        Err(ReflexionError::unsupported("add node to implementation"))
    }

    /// Not supported incrementally.
    pub fn delete_node_from_implementation(&mut self, _link_name: &str) -> Result<(), ReflexionError> {
        Err(ReflexionError::unsupported("delete node from implementation"))
    }

    /// Not supported incrementally.
    pub fn add_node_to_architecture(&mut self, _node: Node) -> Result<NodeId, ReflexionError> {
        Err(ReflexionError::unsupported("add node to architecture"))
    }

    /// Not supported incrementally.
    pub fn delete_node_from_architecture(&mut self, _link_name: &str) -> Result<(), ReflexionError> {
        Err(ReflexionError::unsupported("delete node from architecture"))
    }

    /// Not supported incrementally.
    pub fn add_to_hierarchy(&mut self, _parent: &str, _child: &str) -> Result<(), ReflexionError> {
        Err(ReflexionError::unsupported("add to hierarchy"))
    }

    /// Not supported incrementally.
    pub fn delete_from_hierarchy(&mut self, _child: &str) -> Result<(), ReflexionError> {
        Err(ReflexionError::unsupported("delete from hierarchy"))
    }

    /// Withdraws every relevant dependency touching the subtree that
    /// inherits its mapping from `root`, and returns them for re-propagation.
    fn unpropagate_subtree(&mut self, root: NodeId) -> Result<Vec<EdgeId>, ReflexionError> {
        let subtree = self.tables.subtree(&self.implementation, root);
        let mut touching = IndexSet::new();
        for node in subtree {
            touching.extend(self.implementation.outgoings(node));
            touching.extend(self.implementation.incomings(node));
        }
        let mut affected = Vec::with_capacity(touching.len());
        for edge in touching {
            if self.is_relevant(edge)? {
                affected.push(edge);
            }
        }
        self.propagate_all(&affected, -1)?;
        Ok(affected)
    }

    fn propagate_all(&mut self, edges: &[EdgeId], amount: i64) -> Result<(), ReflexionError> {
        for &edge in edges {
            self.propagate_and_lift(edge, amount)?;
        }
        Ok(())
    }

    fn mapping_edge_of(&self, impl_link: &str) -> Result<Option<EdgeId>, ReflexionError> {
        let Some(proxy) = self.mapping.try_get_node(impl_link) else {
            return Ok(None);
        };
        for edge in self.mapping.outgoings(proxy) {
            if self.mapping.get_edge(edge)?.has_type(MAPS_TO_EDGE_TYPE) {
                return Ok(Some(edge));
            }
        }
        Ok(None)
    }

    /// Mapping-graph proxy of an implementation or architecture node,
    /// created from a detached copy on first use.
    fn proxy(&mut self, node: NodeId, implementation: bool) -> Result<NodeId, ReflexionError> {
        let graph = if implementation {
            &self.implementation
        } else {
            &self.architecture
        };
        let original = graph.get_node(node)?;
        if let Some(proxy) = self.mapping.try_get_node(original.link_name()) {
            return Ok(proxy);
        }
        let copy = original.clone();
        Ok(self.mapping.add_node(copy)?)
    }

    fn resolve_implementation(&self, link_name: &str) -> Result<NodeId, ReflexionError> {
        self.implementation
            .try_get_node(link_name)
            .ok_or_else(|| ReflexionError::UnknownNode {
                graph: "implementation",
                link_name: link_name.to_string(),
            })
    }

    fn resolve_architecture(&self, link_name: &str) -> Result<NodeId, ReflexionError> {
        self.architecture
            .try_get_node(link_name)
            .ok_or_else(|| ReflexionError::UnknownNode {
                graph: "architecture",
                link_name: link_name.to_string(),
            })
    }

    // -----------------------------------------------------------------------
    // Edge attributes
    // -----------------------------------------------------------------------

    /// An implementation edge is relevant iff both endpoints are.
    fn is_relevant(&self, edge: EdgeId) -> Result<bool, ReflexionError> {
        let (source, target) = self.implementation.get_endpoints(edge)?;
        Ok(self.config.is_relevant(self.implementation.get_node(source)?)
            && self.config.is_relevant(self.implementation.get_node(target)?))
    }

    fn is_optional(&self, edge: EdgeId) -> Result<bool, ReflexionError> {
        Ok(self
            .architecture
            .get_edge(edge)?
            .attributes
            .has_toggle(OPTIONAL_TOGGLE))
    }

    /// Commits a state change and reports it. No-op if the state is
    /// unchanged.
    fn transition(&mut self, edge: EdgeId, new: State) -> Result<(), ReflexionError> {
        let old = self.state(edge)?;
        if old == new {
            return Ok(());
        }
        self.write_state(edge, new)?;
        let snapshot = self.snapshot(edge)?;
        trace!(edge = %snapshot.key(), %old, %new, "state changed");
        self.observers.notify(&ChangeEvent::EdgeStateChanged {
            edge: snapshot,
            old,
            new,
        });
        Ok(())
    }

    fn write_state(&mut self, edge: EdgeId, state: State) -> Result<(), ReflexionError> {
        self.architecture_edge_mut(edge)?
            .attributes
            .set_int(STATE_ATTRIBUTE, state.as_int());
        Ok(())
    }

    fn write_counter(&mut self, edge: EdgeId, counter: i64) -> Result<(), ReflexionError> {
        self.architecture_edge_mut(edge)?
            .attributes
            .set_int(COUNTER_ATTRIBUTE, counter);
        Ok(())
    }

    fn architecture_edge_mut(&mut self, edge: EdgeId) -> Result<&mut Edge, ReflexionError> {
        self.architecture
            .edge_mut(edge)
            .ok_or(ReflexionError::Core(CoreError::EdgeNotFound { id: edge }))
    }

    fn snapshot(&self, edge: EdgeId) -> Result<EdgeSnapshot, ReflexionError> {
        EdgeSnapshot::capture(&self.architecture, edge)
            .ok_or(ReflexionError::Core(CoreError::EdgeNotFound { id: edge }))
    }
}
