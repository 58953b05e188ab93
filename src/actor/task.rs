//! A concrete `ActorHandle` wrapping a user actor's run loop as a
//! `tokio::task`, used by both the static loader and tests. This is the
//! crate's reference implementation of the capability set in `handle.rs` —
//! real dynamically loaded actors need not use it, but nothing stops them
//! from doing so.

// Layer 1: Standard library imports
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// Layer 3: Internal module imports
use crate::actor::handle::ActorHandle;
use crate::error::HandleError;

/// Handed to a running actor's loop so it can observe the cooperative stop
/// request (spec §4.4's "sets an internal stop signal the actor's loop
/// observes").
#[derive(Clone)]
pub struct StopToken(watch::Receiver<bool>);

impl StopToken {
    /// True once `stop()` has been called on the owning handle.
    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once `stop()` has been called. Actor loops `select!` this
    /// against their own work.
    pub async fn cancelled(&mut self) {
        // A stop-then-drop handle still leaves the watch at `true`, so a
        // late subscriber observes it immediately rather than hanging.
        if *self.0.borrow() {
            return;
        }
        let _ = self.0.changed().await;
    }
}

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type RunFn = Box<dyn FnOnce(StopToken) -> BoxFuture + Send>;

/// Wraps a `FnOnce(StopToken) -> impl Future<Output = ()>` actor loop as an
/// `ActorHandle`. Constructed not-yet-started, matching the Loader
/// contract (spec §4.3): the task is only spawned on `start()`.
pub struct TaskActorHandle {
    run: Option<RunFn>,
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
    join_handle: Option<JoinHandle<()>>,
}

impl TaskActorHandle {
    /// Build a handle around `run`, not yet started.
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: FnOnce(StopToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            run: Some(Box::new(move |token| Box::pin(run(token)))),
            stop_tx,
            stop_rx,
            join_handle: None,
        }
    }

    /// Build and immediately start a handle — a convenience for tests and
    /// demo actors that don't need the loader's two-phase construction.
    pub fn spawn<F, Fut>(run: F) -> Self
    where
        F: FnOnce(StopToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut handle = Self::new(run);
        handle.start_now();
        handle
    }

    fn start_now(&mut self) {
        if self.join_handle.is_some() {
            return;
        }
        if let Some(run) = self.run.take() {
            let token = StopToken(self.stop_rx.clone());
            self.join_handle = Some(tokio::task::spawn(run(token)));
        }
    }
}

#[async_trait]
impl ActorHandle for TaskActorHandle {
    async fn start(&mut self) {
        self.start_now();
    }

    async fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
    }

    async fn join(&mut self, timeout: Duration) -> bool {
        let Some(handle) = self.join_handle.as_mut() else {
            return true;
        };
        matches!(tokio::time::timeout(timeout, handle).await, Ok(Ok(())))
    }

    async fn kill(&mut self, timeout: Duration) -> Result<(), HandleError> {
        let Some(mut handle) = self.join_handle.take() else {
            return Ok(());
        };
        handle.abort();
        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(_) => Ok(()),
            Err(_) => {
                self.join_handle = Some(handle);
                Err(HandleError::Timeout)
            }
        }
    }

    fn is_running(&self) -> bool {
        match &self.join_handle {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }
}
