//! Domain types for the to-do list.
//!
//! A list is an ordered sequence of items. Items are appended by `Add`, flipped
//! by `Toggle` and removed by `Delete`; nothing else changes them.

use composable_todo_macros::Action;
use serde::{Deserialize, Deserializer, Serialize};
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a to-do item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    /// Creates a `TodoId` from its numeric value
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TodoId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier, fixed at creation
    pub id: TodoId,
    /// Label, fixed at creation (may be empty)
    pub name: String,
    /// Whether the item is done
    pub complete: bool,
}

impl TodoItem {
    /// Creates a new, not yet complete, item
    #[must_use]
    pub const fn new(id: TodoId, name: String) -> Self {
        Self {
            id,
            name,
            complete: false,
        }
    }

    /// Flips `complete`
    pub const fn toggle(&mut self) {
        self.complete = !self.complete;
    }
}

/// Ordered list of to-do items, in insertion order
///
/// Ids are unique within a list. Items only enter through the reducer's `Add`
/// transition or through [`TodoList::from_items`] when seeding state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates a list from existing items, dropping any item whose id was
    /// already seen (first occurrence wins)
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = TodoItem>) -> Self {
        let mut list = Self::new();
        for item in items {
            if !list.contains(item.id) {
                list.items.push(item);
            }
        }
        list
    }

    /// Returns the number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.complete).count()
    }

    /// Returns the items in order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Iterates over the items in order
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.items.iter()
    }

    /// Returns an item by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Checks if an item with this id exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn push(&mut self, item: TodoItem) {
        self.items.push(item);
    }

    pub(crate) fn get_mut(&mut self, id: TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Removes the item with this id, returning it
    pub(crate) fn remove(&mut self, id: TodoId) -> Option<TodoItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

impl<'de> Deserialize<'de> for TodoList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<TodoItem>::deserialize(deserializer).map(Self::from_items)
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Everything that can be dispatched to the to-do reducer
///
/// `kind()` strings match the wire format's `type` tag.
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Append a new item named `name`
    #[action(kind = "add-todo")]
    Add {
        /// Name of the new item, taken verbatim
        name: String,
    },

    /// Flip `complete` on the item with this id
    #[action(kind = "toggle-todo")]
    Toggle {
        /// Item to toggle
        id: TodoId,
    },

    /// Remove the item with this id
    #[action(kind = "delete-todo")]
    Delete {
        /// Item to remove
        id: TodoId,
    },

    /// An action kind this reducer does not know; leaves state unchanged
    #[action(fallback)]
    Unknown {
        /// The unrecognized kind, kept for diagnostics
        kind: String,
    },
}
