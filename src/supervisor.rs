//! Periodically culls dead actors and notifies the host ops plane
//! (spec §4.6).

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::sync::watch;
use tracing::warn;

// Layer 3: Internal module imports
use crate::clock::{system_clock, SharedClock};
use crate::message::RemoveActorNotification;
use crate::registry::Registry;
use crate::socket::MessageSocket;

/// Supervisor tick interval (spec §4.6, §5).
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);
/// Timeout for the `remove_actor` notification to the HostManager.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Scans a snapshot of the registry every tick, removes dead actors, and
/// reports each removal to the HostManager.
pub struct SupervisorLoop {
    registry: Registry,
    stop_rx: watch::Receiver<bool>,
    tick_interval: Duration,
    clock: SharedClock,
}

impl SupervisorLoop {
    pub fn new(registry: Registry, stop_rx: watch::Receiver<bool>) -> Self {
        Self {
            registry,
            stop_rx,
            tick_interval: TICK_INTERVAL,
            clock: system_clock(),
        }
    }

    /// Override the tick interval — used by tests so they don't wait 30s.
    #[cfg(test)]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Inject a [`Clock`](crate::clock::Clock), used by tests that also want
    /// to control the sleep itself rather than merely shortening it.
    #[cfg(test)]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Run until the stop event fires, connecting to the HostManager at
    /// `host_manager_addr` for each `remove_actor` notification.
    pub async fn run(&mut self, host_manager_addr: &str) {
        loop {
            let slept = tokio::select! {
                biased;
                _ = self.stop_rx.changed() => return,
                _ = self.clock.sleep(self.tick_interval) => true,
            };
            if !slept || *self.stop_rx.borrow() {
                return;
            }
            self.tick(host_manager_addr).await;
        }
    }

    /// One scan-and-cull pass, exposed directly so tests don't need to wait
    /// out a real tick interval.
    pub async fn tick(&self, host_manager_addr: &str) {
        // Snapshot first: the registry must never be mutated under its own
        // iterator (spec §4.6, §9). Liveness is checked through `is_running`,
        // which never removes the entry — a live actor stays in the registry
        // for the whole tick, so a `kill_actor` racing this scan always finds
        // it (spec §5's interleaving guarantee, P2).
        for uid in self.registry.snapshot() {
            match self.registry.is_running(&uid) {
                Some(true) | None => continue,
                Some(false) => {}
            }

            // Dead: remove it now. `remove` re-checks presence at removal
            // time, so if the dispatcher already removed (or replaced) this
            // uid between the liveness check and here, this is a no-op
            // rather than a wrongful double-notify (spec §4.6's reuse edge
            // case).
            if self.registry.remove(&uid).is_none() {
                continue;
            }

            if let Err(err) = Self::notify_removed(host_manager_addr, uid.as_str()).await {
                warn!(uid = %uid, error = %err, "failed to notify host manager of actor removal");
            }
        }
    }

    async fn notify_removed(host_manager_addr: &str, uid: &str) -> Result<(), crate::error::SocketError> {
        let mut socket = MessageSocket::connect_tcp(host_manager_addr).await?;
        let notification = RemoveActorNotification::new(uid);
        let _reply: serde_json::Value = socket.request(&notification, NOTIFY_TIMEOUT).await?;
        Ok(())
    }
}
