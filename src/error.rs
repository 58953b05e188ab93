//! Error types for every fallible subsystem.
//!
//! Internal errors never cross the wire directly — the dispatcher converts
//! them to the reason strings from spec §7 at the boundary.

// Layer 1: Standard library imports
use std::io;

// Layer 2: Third-party crate imports
use thiserror::Error;

/// Failures while loading or parsing the host configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("invalid instance id: {0}")]
    InvalidInstanceId(String),
}

/// Failures on the Message Socket.
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("socket I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("request timed out")]
    Timeout,

    #[error("peer closed the connection")]
    Closed,

    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Failures while resolving and instantiating actor code.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no actor code found at {0}")]
    NotFound(String),

    #[error("failed to load actor library: {0}")]
    LibraryLoad(String),

    #[error("actor symbol {0} not found in library")]
    SymbolMissing(String),

    #[error("actor constructor failed: {0}")]
    ConstructorFailed(String),
}

impl LoadError {
    /// Render a diagnostic trace string suitable for the `data.st` reply
    /// field (spec §7's `exception` reason).
    pub fn trace(&self) -> String {
        self.to_string()
    }
}

/// Failures mutating the Actor Registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("actor uid already present in registry")]
    AlreadyExists,

    #[error("actor uid not found in registry")]
    NotFound,

    #[error("host is shutting down; no new actors accepted")]
    ShuttingDown,
}

/// Failures operating an Actor Handle.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("actor task join failed: {0}")]
    JoinFailed(String),

    #[error("actor did not stop within the deadline")]
    Timeout,
}

/// Top-level error for host startup failures (fatal, pre-socket-bind).
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Socket(#[from] SocketError),

    #[error("failed to change working directory: {0}")]
    ChangeDir(#[source] io::Error),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
}
