//! Change notifications emitted by the engine.
//!
//! Every committed state transition, every propagated edge the engine adds
//! or removes, and every edge edit made through the engine's incremental
//! operations is reported as a [`ChangeEvent`]. Delivery is synchronous: [`ObserverRegistry::notify`]
//! calls each registered observer once, in registration order, before the
//! engine continues. Events carry owned snapshots, so observers never borrow
//! the graphs.

use std::fmt;

use reflexion_core::{EdgeId, Graph};
use serde::{Deserialize, Serialize};

use crate::state::State;

/// An edge as it looked when the event was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    /// Handle of the edge in the graph that owns it.
    pub id: EdgeId,
    pub edge_type: String,
    /// Link name of the source node.
    pub source: String,
    /// Link name of the target node.
    pub target: String,
}

impl EdgeSnapshot {
    /// Captures `id` from `graph`. Returns `None` for unknown handles.
    pub fn capture(graph: &Graph, id: EdgeId) -> Option<Self> {
        let edge = graph.edge(id)?;
        let (source, target) = graph.endpoints(id)?;
        Some(EdgeSnapshot {
            id,
            edge_type: edge.edge_type().to_string(),
            source: graph.node(source)?.link_name().to_string(),
            target: graph.node(target)?.link_name().to_string(),
        })
    }

    /// The compound key `type#source#target`.
    pub fn key(&self) -> String {
        reflexion_core::edge_key(&self.edge_type, &self.source, &self.target)
    }
}

/// A change made by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// An architecture edge moved from `old` to `new`.
    EdgeStateChanged {
        edge: EdgeSnapshot,
        old: State,
        new: State,
    },
    /// A propagated edge was added to the architecture graph.
    PropagatedEdgeAdded { edge: EdgeSnapshot },
    /// A propagated edge is about to be removed from the architecture graph.
    PropagatedEdgeRemoved { edge: EdgeSnapshot },
    /// A `Maps_To` edge was added to the mapping graph.
    MapsToEdgeAdded { edge: EdgeSnapshot },
    /// A `Maps_To` edge was removed from the mapping graph.
    MapsToEdgeRemoved { edge: EdgeSnapshot },
    /// A dependency was added to the implementation graph.
    ImplementationEdgeAdded { edge: EdgeSnapshot },
    /// A dependency was removed from the implementation graph.
    ImplementationEdgeRemoved { edge: EdgeSnapshot },
    /// A specified dependency was added to the architecture graph.
    ArchitectureEdgeAdded { edge: EdgeSnapshot },
    /// A specified dependency was removed from the architecture graph.
    ArchitectureEdgeRemoved { edge: EdgeSnapshot },
}

impl ChangeEvent {
    /// The edge the event is about.
    pub fn edge(&self) -> &EdgeSnapshot {
        match self {
            ChangeEvent::EdgeStateChanged { edge, .. }
            | ChangeEvent::PropagatedEdgeAdded { edge }
            | ChangeEvent::PropagatedEdgeRemoved { edge }
            | ChangeEvent::MapsToEdgeAdded { edge }
            | ChangeEvent::MapsToEdgeRemoved { edge }
            | ChangeEvent::ImplementationEdgeAdded { edge }
            | ChangeEvent::ImplementationEdgeRemoved { edge }
            | ChangeEvent::ArchitectureEdgeAdded { edge }
            | ChangeEvent::ArchitectureEdgeRemoved { edge } => edge,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::EdgeStateChanged { edge, old, new } => {
                write!(f, "state changed {} -> {}: {}", old, new, edge.key())
            }
            ChangeEvent::PropagatedEdgeAdded { edge } => write!(f, "propagated edge added: {}", edge.key()),
            ChangeEvent::PropagatedEdgeRemoved { edge } => {
                write!(f, "propagated edge removed: {}", edge.key())
            }
            ChangeEvent::MapsToEdgeAdded { edge } => write!(f, "mapping added: {}", edge.key()),
            ChangeEvent::MapsToEdgeRemoved { edge } => write!(f, "mapping removed: {}", edge.key()),
            ChangeEvent::ImplementationEdgeAdded { edge } => {
                write!(f, "implementation edge added: {}", edge.key())
            }
            ChangeEvent::ImplementationEdgeRemoved { edge } => {
                write!(f, "implementation edge removed: {}", edge.key())
            }
            ChangeEvent::ArchitectureEdgeAdded { edge } => {
                write!(f, "architecture edge added: {}", edge.key())
            }
            ChangeEvent::ArchitectureEdgeRemoved { edge } => {
                write!(f, "architecture edge removed: {}", edge.key())
            }
        }
    }
}

/// Receives change events from the engine.
pub trait ReflexionObserver {
    fn on_change(&mut self, event: &ChangeEvent);
}

impl<F> ReflexionObserver for F
where
    F: FnMut(&ChangeEvent),
{
    fn on_change(&mut self, event: &ChangeEvent) {
        self(event)
    }
}

/// Handle returned by [`ObserverRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered set of observers.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<(ObserverId, Box<dyn ReflexionObserver>)>,
    next_id: u64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer; it receives every event emitted from now on.
    pub fn register(&mut self, observer: impl ReflexionObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != before
    }

    /// Delivers `event` to every observer in registration order.
    pub fn notify(&mut self, event: &ChangeEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_change(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}
