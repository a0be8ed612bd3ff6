//! Typed attribute store shared by nodes, edges, and graphs.
//!
//! An [`Attributes`] value holds four independent namespaces: toggles
//! (presence-only flags), strings, integers, and floats. The same name may
//! appear in several namespaces at once; within one namespace a name has at
//! most one value.
//!
//! Required getters (`get_*`) fail with [`CoreError::UnknownAttribute`] when
//! the attribute is absent. The `try_get_*` forms never fail. Insertion order
//! is preserved so that serialized output is deterministic.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Typed key/value storage attached to a graph element.
///
/// `Clone` is a deep copy: the clone owns its own maps and never aliases
/// the original's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    toggles: IndexSet<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    strings: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    ints: IndexMap<String, i64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    floats: IndexMap<String, f64>,
}

impl Attributes {
    /// Creates an empty attribute store.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Toggles
    // -----------------------------------------------------------------------

    /// Sets the toggle `name`. Setting it twice is a no-op.
    pub fn set_toggle(&mut self, name: impl Into<String>) {
        self.toggles.insert(name.into());
    }

    /// Removes the toggle `name`, returning whether it was set.
    pub fn unset_toggle(&mut self, name: &str) -> bool {
        self.toggles.shift_remove(name)
    }

    /// Returns `true` if the toggle `name` is set.
    pub fn has_toggle(&self, name: &str) -> bool {
        self.toggles.contains(name)
    }

    /// Iterates over all set toggles in insertion order.
    pub fn toggles(&self) -> impl Iterator<Item = &str> {
        self.toggles.iter().map(String::as_str)
    }

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(name.into(), value.into());
    }

    pub fn get_string(&self, name: &str) -> Result<&str, CoreError> {
        self.try_get_string(name).ok_or_else(|| unknown(name))
    }

    pub fn try_get_string(&self, name: &str) -> Option<&str> {
        self.strings.get(name).map(String::as_str)
    }

    /// Removes the string attribute `name`, returning its old value.
    pub fn remove_string(&mut self, name: &str) -> Option<String> {
        self.strings.shift_remove(name)
    }

    pub fn strings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.strings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // -----------------------------------------------------------------------
    // Integers
    // -----------------------------------------------------------------------

    pub fn set_int(&mut self, name: impl Into<String>, value: i64) {
        self.ints.insert(name.into(), value);
    }

    pub fn get_int(&self, name: &str) -> Result<i64, CoreError> {
        self.try_get_int(name).ok_or_else(|| unknown(name))
    }

    pub fn try_get_int(&self, name: &str) -> Option<i64> {
        self.ints.get(name).copied()
    }

    /// Removes the integer attribute `name`, returning its old value.
    pub fn remove_int(&mut self, name: &str) -> Option<i64> {
        self.ints.shift_remove(name)
    }

    pub fn ints(&self) -> impl Iterator<Item = (&str, i64)> {
        self.ints.iter().map(|(k, v)| (k.as_str(), *v))
    }

    // -----------------------------------------------------------------------
    // Floats
    // -----------------------------------------------------------------------

    pub fn set_float(&mut self, name: impl Into<String>, value: f64) {
        self.floats.insert(name.into(), value);
    }

    pub fn get_float(&self, name: &str) -> Result<f64, CoreError> {
        self.try_get_float(name).ok_or_else(|| unknown(name))
    }

    pub fn try_get_float(&self, name: &str) -> Option<f64> {
        self.floats.get(name).copied()
    }

    pub fn floats(&self) -> impl Iterator<Item = (&str, f64)> {
        self.floats.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Looks `name` up as an integer first, then as a float.
    pub fn try_get_numeric(&self, name: &str) -> Option<f64> {
        self.try_get_int(name)
            .map(|v| v as f64)
            .or_else(|| self.try_get_float(name))
    }

    /// Returns `true` if no attribute of any kind is set.
    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
            && self.strings.is_empty()
            && self.ints.is_empty()
            && self.floats.is_empty()
    }
}

fn unknown(name: &str) -> CoreError {
    CoreError::UnknownAttribute {
        name: name.to_string(),
    }
}

impl fmt::Display for Attributes {
    /// Renders `{flag, name="text", count=3, ratio=0.5}`: toggles bare,
    /// strings quoted and escaped, numbers as-is.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toggles = self.toggles.iter().cloned();
        let strings = self.strings.iter().map(|(name, value)| format!("{}={:?}", name, value));
        let ints = self.ints.iter().map(|(name, value)| format!("{}={}", name, value));
        let floats = self.floats.iter().map(|(name, value)| format!("{}={}", name, value));
        let entries: Vec<String> = toggles.chain(strings).chain(ints).chain(floats).collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}
