//! An optional table of display names for state identifiers.
//!
//! Attaching a registry to a machine makes the set of states enumerable, which enables
//! the `UnknownState` check during lookup.

use crate::types::StateId;
use serde::{Deserialize, Serialize};

/// Ordered `StateId -> name` entries. Serialized as an array of `[id, name]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateRegistry {
    entries: Vec<(StateId, String)>,
}

impl StateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a state, or renames it if it is already registered.
    pub fn insert(&mut self, id: impl Into<StateId>, name: impl Into<String>) {
        let id = id.into();
        let name = name.into();

        match self.entries.iter_mut().find(|(key, _)| *key == id) {
            Some(entry) => entry.1 = name,
            None => self.entries.push((id, name)),
        }
    }

    pub fn with(mut self, id: impl Into<StateId>, name: impl Into<String>) -> Self {
        self.insert(id, name);
        self
    }

    /// Removes a state, returning its name if it was registered.
    pub fn remove(&mut self, id: &StateId) -> Option<String> {
        let position = self.entries.iter().position(|(key, _)| key == id)?;
        Some(self.entries.remove(position).1)
    }

    pub fn contains(&self, id: &StateId) -> bool {
        self.entries.iter().any(|(key, _)| key == id)
    }

    pub fn name(&self, id: &StateId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, name)| name.as_str())
    }

    /// Returns the registered name, falling back to the identifier itself.
    pub fn display(&self, id: &StateId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    pub fn ids(&self) -> impl Iterator<Item = &StateId> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a registry where every state is named after its own identifier.
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a StateId>) -> Self {
        let mut registry = Self::new();
        for id in ids {
            registry.insert(id.clone(), id.to_string());
        }
        registry
    }
}
