//! # Composable Todo Core
//!
//! Building blocks shared by every crate in the workspace.
//!
//! A [`reducer::Reducer`] maps `(state, action, environment)` to a new state
//! plus a list of [`effect::Effect`] values. It does no I/O itself: anything
//! that touches the outside world is either an effect the runtime executes or
//! a dependency from [`environment`] (clock, id source) passed in by the caller.
//!
//! ## Example
//!
//! ```
//! use composable_todo_core::{effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct Tally {
//!     count: u32,
//! }
//!
//! enum TallyAction {
//!     Bump,
//! }
//!
//! struct TallyReducer;
//!
//! impl Reducer for TallyReducer {
//!     type State = Tally;
//!     type Action = TallyAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Tally,
//!         action: TallyAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<TallyAction>; 4]> {
//!         match action {
//!             TallyAction::Bump => state.count += 1,
//!         }
//!         SmallVec::new()
//!     }
//! }
//!
//! let before = Tally::default();
//! let (after, _effects) = TallyReducer.transition(&before, TallyAction::Bump, &());
//! assert_eq!(before.count, 0);
//! assert_eq!(after.count, 1);
//! ```

pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// The reducer trait
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// All the logic for one kind of state
    ///
    /// Given the same state, action and environment a reducer must always
    /// produce the same result.
    pub trait Reducer {
        /// What the reducer changes
        type State;

        /// Inputs it accepts
        type Action;

        /// Dependencies injected by the caller
        type Environment;

        /// Apply `action` to `state`
        ///
        /// Updates `state` in place and returns effect descriptions for the
        /// runtime to execute. Must not perform I/O or panic.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;

        /// Pure form of [`Reducer::reduce`]
        ///
        /// Produces the next state as a new value and leaves `state` untouched,
        /// so any caller still holding the previous state keeps seeing it.
        fn transition(
            &self,
            state: &Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> (Self::State, SmallVec<[Effect<Self::Action>; 4]>)
        where
            Self::State: Clone,
        {
            let mut next = state.clone();
            let effects = self.reduce(&mut next, action, env);
            (next, effects)
        }
    }
}

/// Work a reducer asks the runtime to do
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// A description of work; nothing runs until the store executes it
    pub enum Effect<Action> {
        /// Nothing to do
        None,

        /// Several effects, started together
        Parallel(Vec<Effect<Action>>),

        /// Async work whose `Some(action)` result is sent back to the store
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::None => f.write_str("None"),
                Self::Parallel(effects) => f.debug_tuple("Parallel").field(effects).finish(),
                Self::Future(_) => f.write_str("Future(..)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Start all of `effects` together
        #[must_use]
        pub const fn merge(effects: Vec<Self>) -> Self {
            Self::Parallel(effects)
        }

        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Injected dependencies
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Source of the current time
    pub trait Clock: Send + Sync {
        /// Current time in UTC
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh numeric identifiers
    ///
    /// Implementations must never hand out the same value twice. Reducers may
    /// still see a value that collides with state seeded from elsewhere and are
    /// expected to draw again in that case.
    pub trait IdGenerator: Send + Sync {
        /// Return the next identifier
        fn next_id(&self) -> u64;
    }

    /// Monotonic counter, the default id source
    ///
    /// # Example
    ///
    /// ```
    /// use composable_todo_core::environment::{IdGenerator, SequentialIdGenerator};
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), 1);
    /// assert_eq!(ids.next_id(), 2);
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Counter starting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Counter starting at `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.next.fetch_add(1, Ordering::SeqCst)
        }
    }

    /// Millisecond timestamps from a [`Clock`], kept strictly increasing
    ///
    /// Two ids requested within the same millisecond (or after the clock moved
    /// backwards) get `last + 1` instead of a repeated timestamp.
    #[derive(Debug)]
    pub struct ClockIdGenerator<C> {
        clock: C,
        last: AtomicU64,
    }

    impl<C: Clock> ClockIdGenerator<C> {
        /// Create a generator reading time from `clock`
        #[must_use]
        pub const fn new(clock: C) -> Self {
            Self {
                clock,
                last: AtomicU64::new(0),
            }
        }
    }

    impl<C: Clock> IdGenerator for ClockIdGenerator<C> {
        fn next_id(&self) -> u64 {
            let now = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
            let previous = match self.last.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            }) {
                Ok(previous) | Err(previous) => previous,
            };
            now.max(previous.saturating_add(1))
        }
    }
}
