//! Reducer logic for the to-do list.
//!
//! Every transition is total: unknown ids and unknown action kinds leave the
//! list as it was, and any name (including the empty string) is accepted.

use crate::types::{TodoAction, TodoId, TodoItem, TodoList};
use composable_todo_core::{
    effect::Effect,
    environment::{IdGenerator, SequentialIdGenerator},
    reducer::Reducer,
    SmallVec,
};
use std::sync::Arc;

/// Environment dependencies for the to-do reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new items
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

impl Default for TodoEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SequentialIdGenerator::new()))
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Reducer for the to-do list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws ids until one is not already in the list
    ///
    /// Terminates because an `IdGenerator` never repeats a value and the list
    /// is finite.
    fn fresh_id(state: &TodoList, env: &TodoEnvironment) -> TodoId {
        loop {
            let id = TodoId::new(env.ids.next_id());
            if !state.contains(id) {
                return id;
            }
            tracing::debug!(%id, "Generated id already in list, drawing again");
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoList;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::Add { name } => {
                let id = Self::fresh_id(state, env);
                tracing::debug!(%id, name = %name, "Adding todo");
                state.push(TodoItem::new(id, name));
            },

            TodoAction::Toggle { id } => match state.get_mut(id) {
                Some(todo) => {
                    todo.toggle();
                    tracing::debug!(%id, complete = todo.complete, "Toggled todo");
                },
                None => tracing::debug!(%id, "Toggle ignored: no such todo"),
            },

            TodoAction::Delete { id } => {
                if state.remove(id).is_some() {
                    tracing::debug!(%id, "Deleted todo");
                } else {
                    tracing::debug!(%id, "Delete ignored: no such todo");
                }
            },

            TodoAction::Unknown { kind } => {
                tracing::debug!(kind = %kind, "Ignoring unknown action kind");
            },
        }

        tracing::trace!(len = state.len(), "Todo list updated");

        SmallVec::new()
    }
}
