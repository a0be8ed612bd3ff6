//! Result reporting.
//!
//! A [`ReflexionReport`] is a serializable view of the analyzed architecture
//! graph: one [`EdgeReport`] per edge plus per-state totals.

use reflexion_core::{EdgeId, Graph};
use serde::{Deserialize, Serialize};

use crate::engine::Reflexion;
use crate::error::ReflexionError;
use crate::state::{edge_counter, edge_state, State};

/// Number of architecture edges per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflexionSummary {
    pub convergent: usize,
    pub divergent: usize,
    pub absent: usize,
    pub allowed_absent: usize,
    pub allowed: usize,
    pub implicitly_allowed: usize,
    pub specified: usize,
    pub undefined: usize,
}

impl ReflexionSummary {
    pub fn count(&self, state: State) -> usize {
        match state {
            State::Convergent => self.convergent,
            State::Divergent => self.divergent,
            State::Absent => self.absent,
            State::AllowedAbsent => self.allowed_absent,
            State::Allowed => self.allowed,
            State::ImplicitlyAllowed => self.implicitly_allowed,
            State::Specified => self.specified,
            State::Undefined => self.undefined,
        }
    }

    fn add(&mut self, state: State) {
        let slot = match state {
            State::Convergent => &mut self.convergent,
            State::Divergent => &mut self.divergent,
            State::Absent => &mut self.absent,
            State::AllowedAbsent => &mut self.allowed_absent,
            State::Allowed => &mut self.allowed,
            State::ImplicitlyAllowed => &mut self.implicitly_allowed,
            State::Specified => &mut self.specified,
            State::Undefined => &mut self.undefined,
        };
        *slot += 1;
    }

    /// `true` if nothing is divergent or absent.
    pub fn is_consistent(&self) -> bool {
        self.divergent == 0 && self.absent == 0
    }
}

/// One architecture edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeReport {
    pub id: EdgeId,
    /// `type#source#target`.
    pub key: String,
    pub edge_type: String,
    pub source: String,
    pub target: String,
    pub state: State,
    pub counter: i64,
    /// Whether the edge is a specified (as opposed to propagated) edge.
    pub specified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflexionReport {
    pub summary: ReflexionSummary,
    pub edges: Vec<EdgeReport>,
}

impl ReflexionReport {
    /// Builds a report from the state and counter attributes of
    /// `architecture`, in edge index order.
    pub fn from_architecture(architecture: &Graph) -> Result<Self, ReflexionError> {
        let mut summary = ReflexionSummary::default();
        let mut edges = Vec::with_capacity(architecture.edge_count());
        for id in architecture.edges() {
            let edge = architecture.get_edge(id)?;
            let (source, target) = architecture.get_endpoints(id)?;
            let state = edge_state(edge)?;
            summary.add(state);
            edges.push(EdgeReport {
                id,
                key: reflexion_core::edge_key(
                    edge.edge_type(),
                    architecture.link_name(source)?,
                    architecture.link_name(target)?,
                ),
                edge_type: edge.edge_type().to_string(),
                source: architecture.link_name(source)?.to_string(),
                target: architecture.link_name(target)?.to_string(),
                state,
                counter: edge_counter(edge),
                specified: state.is_specified(),
            });
        }
        Ok(ReflexionReport { summary, edges })
    }

    /// Edges in the given state.
    pub fn edges_in(&self, state: State) -> impl Iterator<Item = &EdgeReport> {
        self.edges.iter().filter(move |e| e.state == state)
    }
}

impl Reflexion {
    pub fn report(&self) -> Result<ReflexionReport, ReflexionError> {
        ReflexionReport::from_architecture(self.architecture())
    }

    pub fn summary(&self) -> Result<ReflexionSummary, ReflexionError> {
        Ok(self.report()?.summary)
    }
}
