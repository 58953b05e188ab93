//! # actor-host — per-machine daemon for a distributed actor cluster
//!
//! The Actor Host receives operational requests from the cluster
//! controller over a local ops endpoint, dynamically loads actor code from
//! a configured directory, supervises every running actor, and orchestrates
//! an orderly shutdown driven by a signalled stop event.
//!
//! HostManager placement policy, the Directory service, the CLI front end,
//! and actor business logic are external collaborators — this crate only
//! implements the host daemon itself.
//!
//! # Module Organization
//!
//! - [`util`] — `ActorUid`, `Realm`, `Category` identifiers
//! - [`config`] — host configuration loading and validation
//! - [`clock`] — injectable time source for deterministic tests
//! - [`logging`] — structured logging setup
//! - [`error`] — per-subsystem error types
//! - [`message`] — wire envelope documents
//! - [`socket`] — framed request/reply transport
//! - [`registry`] — the actor UID → handle map
//! - [`actor`] — the `ActorHandle` capability set and the `ActorLoader` strategies
//! - [`dispatcher`] — the ops request/reply loop
//! - [`supervisor`] — the dead-actor culling loop
//! - [`host`] — lifecycle orchestration
//!
//! # Concurrency model
//!
//! Single `tokio` multi-threaded runtime; the dispatcher and supervisor are
//! each their own task; the registry is a lock-free concurrent map; the
//! stop event is a `tokio::sync::watch` channel observed at the head of
//! every loop iteration.

pub mod actor;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod logging;
pub mod message;
pub mod registry;
pub mod socket;
pub mod supervisor;
pub mod util;

pub use actor::{ActorHandle, ActorLoader, DynamicLoader, StaticLoader, TaskActorHandle};
pub use config::HostConfig;
pub use dispatcher::Dispatcher;
pub use host::Host;
pub use registry::Registry;
pub use supervisor::SupervisorLoop;
pub use util::{ActorUid, Category, Realm};
