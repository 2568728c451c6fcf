//! # Composable Todo Runtime
//!
//! The [`Store`] owns a reducer's state and is the only way to change it.
//!
//! - `send` reduces one action at a time under a write lock
//! - every reduced action is broadcast to subscribers in reduction order
//! - effects run on spawned tasks and feed their actions back through `send`
//! - `shutdown` stops accepting actions and waits for running effects
//!
//! ## Example
//!
//! ```ignore
//! use composable_todo_runtime::Store;
//!
//! let store = Store::new(TodoList::new(), TodoReducer::new(), TodoEnvironment::default());
//! store.send(TodoAction::Add { name: "buy milk".into() }).await?;
//! let len = store.state(TodoList::len).await;
//! ```

/// Store errors
pub mod error {
    use thiserror::Error;

    /// Why a store operation failed
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// `send` was called after `shutdown` started
        #[error("Store is shutting down; action rejected")]
        ShutdownInProgress,

        /// `shutdown` gave up while effects were still running
        #[error("Shutdown timed out; {0} effect(s) still running")]
        ShutdownTimeout(usize),
    }
}

/// The store runtime
pub mod store {
    use crate::error::StoreError;
    use composable_todo_core::{effect::Effect, reducer::Reducer};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{RwLock, broadcast};

    /// Action broadcast capacity used by [`Store::new`]
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

    /// How often `shutdown` re-checks the running effect count
    const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Counts one running effect task for as long as it lives, including
    /// when the task panics
    struct InflightGuard(Arc<AtomicUsize>);

    impl InflightGuard {
        fn enter(inflight: &Arc<AtomicUsize>) -> Self {
            inflight.fetch_add(1, Ordering::SeqCst);
            Self(Arc::clone(inflight))
        }
    }

    impl Drop for InflightGuard {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Owns reducer state and serializes every change to it
    ///
    /// Clones share state, environment, subscribers and shutdown status.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        closing: Arc<AtomicBool>,
        inflight: Arc<AtomicUsize>,
        /// Reduced actions, in reduction order
        reduced: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Store with [`DEFAULT_BROADCAST_CAPACITY`]
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(
                initial_state,
                reducer,
                environment,
                DEFAULT_BROADCAST_CAPACITY,
            )
        }

        /// Store whose subscribers may fall up to `capacity` actions behind
        /// before they start skipping
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (reduced, _) = broadcast::channel(capacity.max(1));
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                closing: Arc::new(AtomicBool::new(false)),
                inflight: Arc::new(AtomicUsize::new(0)),
                reduced,
            }
        }

        /// Reduce `action` against the current state
        ///
        /// Returns once the state has been updated and the action broadcast.
        /// Effects are started but not awaited. Concurrent callers are
        /// reduced one after another, never interleaved.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] once shutdown has started.
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            self.send_and_inspect(action, |_| ()).await
        }

        /// Like [`Store::send`], and runs `inspect` against the state this
        /// action produced before any later action is reduced
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] once shutdown has started.
        #[tracing::instrument(skip_all, name = "store_send")]
        pub async fn send_and_inspect<F, T>(&self, action: A, inspect: F) -> Result<T, StoreError>
        where
            F: FnOnce(&S) -> T,
        {
            if self.is_shutting_down() {
                tracing::warn!("Action rejected during shutdown");
                metrics::counter!("store.actions.rejected").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let (effects, observed) = {
                let mut state = self.state.write().await;
                let _reducing = tracing::debug_span!("reduce").entered();

                let effects = self
                    .reducer
                    .reduce(&mut *state, action.clone(), &self.environment);
                metrics::counter!("store.actions.total").increment(1);
                tracing::trace!(effects = effects.len(), "Action reduced");

                let observed = inspect(&*state);
                // Still under the lock: subscribers observe reduction order.
                let _ = self.reduced.send(action);
                (effects, observed)
            };

            for effect in effects {
                self.spawn_effect(effect);
            }
            Ok(observed)
        }

        /// Run `f` against a read-locked view of the state
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&*self.state.read().await)
        }

        /// Receive every action reduced after this call
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.reduced.subscribe()
        }

        /// Effect tasks still running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.inflight.load(Ordering::SeqCst)
        }

        /// Whether [`Store::shutdown`] has been called on this store or a clone
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.closing.load(Ordering::Acquire)
        }

        /// Stop accepting actions and wait for running effects
        ///
        /// Actions fed back by effects that finish during the wait are
        /// rejected like any other.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] with the number of effects
        /// still running if `timeout` elapses first.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            self.closing.store(true, Ordering::Release);
            metrics::counter!("store.shutdown.initiated").increment(1);
            tracing::info!(pending = self.pending_effects(), "Shutting down store");

            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    metrics::counter!("store.shutdown.completed").increment(1);
                    tracing::info!("Store shut down cleanly");
                    return Ok(());
                }

                if tokio::time::Instant::now() >= deadline {
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    tracing::error!(pending, "Store shutdown timed out");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(pending, "Waiting for effects before shutdown");
                tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
            }
        }

        fn spawn_effect(&self, effect: Effect<A>) {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) => {
                    for effect in effects {
                        self.spawn_effect(effect);
                    }
                },
                Effect::Future(future) => {
                    metrics::counter!("store.effects.executed").increment(1);
                    let guard = InflightGuard::enter(&self.inflight);
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let Some(action) = future.await else {
                            return;
                        };
                        if let Err(error) = store.send(action).await {
                            tracing::warn!(%error, "Dropped action fed back by effect");
                        }
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                closing: Arc::clone(&self.closing),
                inflight: Arc::clone(&self.inflight),
                reduced: self.reduced.clone(),
            }
        }
    }
}

pub use error::StoreError;
pub use store::Store;
