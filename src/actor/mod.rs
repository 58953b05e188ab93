//! Actor Handle and Actor Loader: the host's narrow, opaque view of a
//! running actor (spec §4.3, §4.4, §9 "per-actor concurrency").
//!
//! Actors are opaque to the host; it interacts with them only through the
//! five capability methods on [`ActorHandle`]. Whether an actor is backed
//! by a task, a thread, or a dynamically loaded object is the actor's own
//! concern.

pub mod handle;
pub mod loader;
pub mod task;

pub use handle::ActorHandle;
pub use loader::{ActorLoader, DynamicLoader, StaticLoader};
pub use task::TaskActorHandle;
