//! # Composable Todo Testing
//!
//! Testing utilities and helpers for the Composable Todo reducer architecture.
//!
//! This crate provides:
//! - Deterministic stand-ins for the environment traits
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use composable_todo_testing::{assertions, ReducerTest, ScriptedIdGenerator};
//!
//! ReducerTest::new(TodoReducer::new())
//!     .with_env(TodoEnvironment::new(Arc::new(ScriptedIdGenerator::new([7]))))
//!     .given_state(TodoList::new())
//!     .when_action(TodoAction::Add { name: "buy milk".into() })
//!     .then_state(|list| assert_eq!(list.len(), 1))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use composable_todo_core::environment::{Clock, IdGenerator};


pub use reducer_test::{ReducerTest, assertions};

/// Deterministic environment implementations
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock stopped at one instant
    ///
    /// # Example
    ///
    /// ```
    /// use composable_todo_testing::mocks::FixedClock;
    /// use composable_todo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Clock that always reports `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock stopped at 2025-01-01 00:00:00 UTC
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }

    /// Id source that replays a fixed script, then counts upward
    ///
    /// The script may contain duplicates or ids already present in a seeded
    /// state, which is how tests exercise collision handling in reducers.
    /// Once the script is exhausted, ids continue from one past the largest
    /// scripted value.
    ///
    /// ```
    /// use composable_todo_testing::mocks::ScriptedIdGenerator;
    /// use composable_todo_core::environment::IdGenerator;
    ///
    /// let ids = ScriptedIdGenerator::new([5, 5]);
    /// assert_eq!(ids.next_id(), 5);
    /// assert_eq!(ids.next_id(), 5);
    /// assert_eq!(ids.next_id(), 6);
    /// ```
    #[derive(Debug)]
    pub struct ScriptedIdGenerator {
        script: Mutex<VecDeque<u64>>,
        after: AtomicU64,
    }

    impl ScriptedIdGenerator {
        /// Create a generator that hands out `script` first
        #[must_use]
        pub fn new(script: impl IntoIterator<Item = u64>) -> Self {
            let script: VecDeque<u64> = script.into_iter().collect();
            let after = script.iter().max().map_or(1, |max| max.saturating_add(1));
            Self {
                script: Mutex::new(script),
                after: AtomicU64::new(after),
            }
        }
    }

    impl IdGenerator for ScriptedIdGenerator {
        fn next_id(&self) -> u64 {
            let scripted = self
                .script
                .lock()
                .ok()
                .and_then(|mut script| script.pop_front());
            scripted.unwrap_or_else(|| self.after.fetch_add(1, Ordering::SeqCst))
        }
    }
}

/// Property-based testing utilities using proptest
pub mod properties {
    use proptest::collection::hash_set;
    use proptest::prelude::*;

    /// Arbitrary item names, including the empty string and non-ASCII text
    pub fn arb_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            "[a-z ]{1,12}",
            "\\PC{0,16}",
        ]
    }

    /// Between `0` and `max_len` distinct ids in arbitrary order
    pub fn arb_distinct_ids(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
        hash_set(1..10_000_u64, 0..=max_len).prop_map(|ids| ids.into_iter().collect())
    }
}

pub use mocks::{FixedClock, ScriptedIdGenerator, test_clock};
