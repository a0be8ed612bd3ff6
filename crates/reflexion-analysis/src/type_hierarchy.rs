//! Edge-type hierarchy used by lifting.
//!
//! A specified dependency of type `T` covers an implementation dependency of
//! type `S` if `S` is `T` or a (transitive) subtype of `T`. The hierarchy is
//! declared as a subtype -> supertype map and must be acyclic.

use indexmap::{IndexMap, IndexSet};

use crate::error::ReflexionError;

/// Single-inheritance hierarchy over edge type names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeHierarchy {
    supertypes: IndexMap<String, String>,
}

impl TypeHierarchy {
    /// A hierarchy in which every type is only a subtype of itself.
    pub fn flat() -> Self {
        Self::default()
    }

    /// Builds a hierarchy from subtype -> supertype pairs. Fails with
    /// [`ReflexionError::Config`] if the declared chain contains a cycle.
    pub fn new(supertypes: IndexMap<String, String>) -> Result<Self, ReflexionError> {
        for start in supertypes.keys() {
            let mut seen = IndexSet::new();
            let mut cursor = Some(start.as_str());
            while let Some(current) = cursor {
                if !seen.insert(current) {
                    return Err(ReflexionError::Config {
                        reason: format!("edge type hierarchy has a cycle through '{}'", current),
                    });
                }
                cursor = supertypes.get(current).map(String::as_str);
            }
        }
        Ok(TypeHierarchy { supertypes })
    }

    /// Direct supertype of `edge_type`, if declared.
    pub fn supertype_of(&self, edge_type: &str) -> Option<&str> {
        self.supertypes.get(edge_type).map(String::as_str)
    }

    /// Returns `true` if `subtype` equals `supertype` or inherits from it.
    pub fn is_subtype_of(&self, subtype: &str, supertype: &str) -> bool {
        let mut cursor = Some(subtype);
        while let Some(current) = cursor {
            if current == supertype {
                return true;
            }
            cursor = self.supertype_of(current);
        }
        false
    }
}
