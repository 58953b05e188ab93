//! The capability set the host requires of every actor (spec §4.4).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::error::HandleError;

/// Five operations the host consumes from any running actor. The host
/// never inspects an actor's internals beyond this trait — whether the
/// concrete implementation is a task, a thread, or an out-of-process
/// handle is invisible here.
#[async_trait]
pub trait ActorHandle: Send + Sync {
    /// Begin executing. Non-blocking; idempotent after the first call.
    async fn start(&mut self);

    /// Request cooperative shutdown. Non-blocking; sets an internal stop
    /// signal the actor's own loop observes.
    async fn stop(&mut self);

    /// Wait up to `timeout` for the actor to finish. Returns whether it
    /// finished within the deadline.
    async fn join(&mut self, timeout: Duration) -> bool;

    /// Force termination, best-effort, bounded by `timeout`.
    async fn kill(&mut self, timeout: Duration) -> Result<(), HandleError>;

    /// Liveness query: true while the actor's main execution unit is live.
    fn is_running(&self) -> bool;
}
