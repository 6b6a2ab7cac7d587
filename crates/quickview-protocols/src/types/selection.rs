//! Selection state keyed by step role or position.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::step::StepRole;
use crate::error::ProtocolError;

/// Key of a [`SelectionState`] entry.
///
/// Steps with a known role are keyed by role; UNKNOWN steps by their
/// position. Serialized as `count`, `strategy`, `bundle` or `step-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectionKey {
    Role(StepRole),
    Index(usize),
}

impl SelectionKey {
    /// Key for a step at `index` with the given role.
    pub fn for_step(role: StepRole, index: usize) -> Self {
        match role {
            StepRole::Unknown => Self::Index(index),
            role => Self::Role(role),
        }
    }
}

impl From<StepRole> for SelectionKey {
    fn from(role: StepRole) -> Self {
        Self::Role(role)
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(role) => f.write_str(role.as_str()),
            Self::Index(index) => write!(f, "step-{}", index),
        }
    }
}

impl FromStr for SelectionKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Self::Role(StepRole::Count)),
            "strategy" => Ok(Self::Role(StepRole::Strategy)),
            "bundle" => Ok(Self::Role(StepRole::Bundle)),
            other => other
                .strip_prefix("step-")
                .and_then(|n| n.parse().ok())
                .map(Self::Index)
                .ok_or_else(|| ProtocolError::InvalidSelectionKey(other.to_string())),
        }
    }
}

impl Serialize for SelectionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SelectionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Value selected in one step.
///
/// Most steps hold a single value. A BUNDLE selection spanning several
/// controls (mount, finish) keeps every part in DOM order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    Single(String),
    Parts(Vec<String>),
}

impl SelectionValue {
    /// Build a value from its parts; `None` when there are no parts.
    pub fn from_parts(mut parts: Vec<String>) -> Option<Self> {
        match parts.len() {
            0 => None,
            1 => parts.pop().map(Self::Single),
            _ => Some(Self::Parts(parts)),
        }
    }

    /// The first (or only) part.
    pub fn primary(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Parts(parts) => parts.first().map(String::as_str).unwrap_or_default(),
        }
    }

    pub fn parts(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Parts(parts) => parts,
        }
    }
}

impl fmt::Display for SelectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts().join(" / "))
    }
}

impl From<&str> for SelectionValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for SelectionValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<&str>> for SelectionValue {
    fn from(parts: Vec<&str>) -> Self {
        Self::from_parts(parts.into_iter().map(str::to_string).collect())
            .unwrap_or_else(|| Self::Parts(Vec::new()))
    }
}

/// Current selections, one entry per step key.
///
/// Insertion order is irrelevant; keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    entries: BTreeMap<SelectionKey, SelectionValue>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<SelectionKey>, value: impl Into<SelectionValue>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: SelectionKey, value: SelectionValue) -> Option<SelectionValue> {
        self.entries.insert(key, value)
    }

    pub fn remove(&mut self, key: &SelectionKey) -> Option<SelectionValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &SelectionKey) -> Option<&SelectionValue> {
        self.entries.get(key)
    }

    /// Selection for a known role.
    pub fn role(&self, role: StepRole) -> Option<&SelectionValue> {
        self.entries.get(&SelectionKey::Role(role))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SelectionKey, &SelectionValue)> {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
