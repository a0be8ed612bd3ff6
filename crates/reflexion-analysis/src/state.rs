//! Reflexion states of architecture dependencies.
//!
//! The engine stores the state and the counter of every architecture edge as
//! integer attributes ([`STATE_ATTRIBUTE`], [`COUNTER_ATTRIBUTE`]), so an
//! annotated architecture graph can be saved and reloaded like any other
//! graph. An edge without a state attribute is [`State::Undefined`]; an edge
//! without a counter has counter 0.

use std::fmt;

use reflexion_core::Edge;
use serde::{Deserialize, Serialize};

use crate::error::ReflexionError;

/// Integer edge attribute holding the [`State`].
pub const STATE_ATTRIBUTE: &str = "Reflexion.State";

/// Integer edge attribute holding the number of implementation dependencies
/// an architecture edge represents.
pub const COUNTER_ATTRIBUTE: &str = "Reflexion.Counter";

/// Edge toggle marking a specified dependency as optional. An optional edge
/// that is not implemented is `allowed_absent` instead of `absent`.
pub const OPTIONAL_TOGGLE: &str = "Architecture.Is_Optional";

/// State of an architecture dependency.
///
/// Specified edges move between `specified`, `convergent`, `absent`, and
/// `allowed_absent`. Propagated edges are `allowed`, `implicitly_allowed`,
/// or `divergent`. `undefined` is the state of an edge that has not been
/// classified yet, or of a propagated edge about to be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Undefined,
    Allowed,
    Divergent,
    Absent,
    Convergent,
    ImplicitlyAllowed,
    AllowedAbsent,
    Specified,
}

impl State {
    /// All states in attribute-value order.
    pub const ALL: [State; 8] = [
        State::Undefined,
        State::Allowed,
        State::Divergent,
        State::Absent,
        State::Convergent,
        State::ImplicitlyAllowed,
        State::AllowedAbsent,
        State::Specified,
    ];

    /// The value stored in [`STATE_ATTRIBUTE`].
    pub fn as_int(self) -> i64 {
        match self {
            State::Undefined => 0,
            State::Allowed => 1,
            State::Divergent => 2,
            State::Absent => 3,
            State::Convergent => 4,
            State::ImplicitlyAllowed => 5,
            State::AllowedAbsent => 6,
            State::Specified => 7,
        }
    }

    pub fn from_int(value: i64) -> Option<State> {
        usize::try_from(value)
            .ok()
            .and_then(|i| State::ALL.get(i).copied())
    }

    /// Returns `true` for the states of a specified architecture edge.
    pub fn is_specified(self) -> bool {
        matches!(
            self,
            State::Specified | State::Convergent | State::Absent | State::AllowedAbsent
        )
    }

    /// Returns `true` for the states a propagated edge settles in.
    pub fn is_propagated(self) -> bool {
        matches!(
            self,
            State::Allowed | State::ImplicitlyAllowed | State::Divergent
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            State::Undefined => "undefined",
            State::Allowed => "allowed",
            State::Divergent => "divergent",
            State::Absent => "absent",
            State::Convergent => "convergent",
            State::ImplicitlyAllowed => "implicitly_allowed",
            State::AllowedAbsent => "allowed_absent",
            State::Specified => "specified",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reads the state of an edge. A missing attribute is `Undefined`; a value
/// outside the known range is a corrupt state.
pub fn edge_state(edge: &Edge) -> Result<State, ReflexionError> {
    match edge.attributes.try_get_int(STATE_ATTRIBUTE) {
        None => Ok(State::Undefined),
        Some(value) => State::from_int(value).ok_or_else(|| {
            ReflexionError::corrupt(format!(
                "edge of type '{}' has unknown state value {}",
                edge.edge_type(),
                value
            ))
        }),
    }
}

/// Reads the counter of an edge; a missing attribute counts as 0.
pub fn edge_counter(edge: &Edge) -> i64 {
    edge.attributes.try_get_int(COUNTER_ATTRIBUTE).unwrap_or(0)
}

/// State of a specified edge with the given counter: convergent while
/// implemented, absent (or allowed_absent if optional) otherwise.
pub fn specified_state(counter: i64, optional: bool) -> State {
    if counter > 0 {
        State::Convergent
    } else if optional {
        State::AllowedAbsent
    } else {
        State::Absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_values_round_trip() {
        for state in State::ALL {
            assert_eq!(State::from_int(state.as_int()), Some(state));
        }
        assert_eq!(State::from_int(8), None);
        assert_eq!(State::from_int(-1), None);
    }

    #[test]
    fn specified_set_includes_allowed_absent() {
        let specified: Vec<State> = State::ALL.into_iter().filter(|s| s.is_specified()).collect();
        assert_eq!(
            specified,
            vec![
                State::Absent,
                State::Convergent,
                State::AllowedAbsent,
                State::Specified
            ]
        );
        assert!(!State::Undefined.is_specified());
        assert!(!State::Undefined.is_propagated());
    }

    #[test]
    fn specified_state_follows_counter_sign() {
        assert_eq!(specified_state(3, false), State::Convergent);
        assert_eq!(specified_state(1, true), State::Convergent);
        assert_eq!(specified_state(0, false), State::Absent);
        assert_eq!(specified_state(0, true), State::AllowedAbsent);
    }

    #[test]
    fn missing_attributes_read_as_defaults() {
        let mut edge = Edge::new("Call");
        assert_eq!(edge_state(&edge).unwrap(), State::Undefined);
        assert_eq!(edge_counter(&edge), 0);

        edge.attributes.set_int(STATE_ATTRIBUTE, 4);
        edge.attributes.set_int(COUNTER_ATTRIBUTE, 2);
        assert_eq!(edge_state(&edge).unwrap(), State::Convergent);
        assert_eq!(edge_counter(&edge), 2);

        edge.attributes.set_int(STATE_ATTRIBUTE, 42);
        assert!(matches!(
            edge_state(&edge),
            Err(ReflexionError::CorruptState { .. })
        ));
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&State::ImplicitlyAllowed).unwrap();
        assert_eq!(json, "\"implicitly_allowed\"");
        assert_eq!(State::AllowedAbsent.to_string(), "allowed_absent");
    }
}
