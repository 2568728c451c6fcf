//! A to-do list driven by a single pure reducer.
//!
//! The whole application state is a [`TodoList`]. It changes only through
//! [`TodoReducer`], which handles three actions (add, toggle, delete) and
//! treats anything else as a no-op. The reducer never emits effects; new ids
//! come from the injected [`TodoEnvironment`].
//!
//! # Quick Start
//!
//! ```no_run
//! use todo::{TodoAction, TodoEnvironment, TodoList, TodoReducer};
//! use composable_todo_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new(TodoList::new(), TodoReducer::new(), TodoEnvironment::default());
//!
//! store.send(TodoAction::Add { name: "buy milk".to_string() }).await?;
//!
//! let id = store.state(|list| list.items()[0].id).await;
//! store.send(TodoAction::Toggle { id }).await?;
//!
//! let completed = store.state(TodoList::completed_count).await;
//! assert_eq!(completed, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod reducer;
pub mod shell;
pub mod types;
pub mod wire;

use composable_todo_runtime::Store;

pub use config::{Config, ConfigError, IdStrategy, InputFormat};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{TodoAction, TodoId, TodoItem, TodoList};
pub use wire::{decode_action, encode_action, encode_list, WireError};

/// Store type used by the shell and the binary
pub type TodoStore = Store<TodoList, TodoAction, TodoEnvironment, TodoReducer>;
