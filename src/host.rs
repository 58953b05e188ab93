//! Host Lifecycle: parses configuration, installs signal handlers, spins
//! up the dispatcher and supervisor, coordinates orderly shutdown
//! (spec §4.7).

// Layer 1: Standard library imports
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info, warn};

// Layer 3: Internal module imports
use crate::actor::{ActorLoader, DynamicLoader};
use crate::config::HostConfig;
use crate::dispatcher::Dispatcher;
use crate::error::HostError;
use crate::registry::Registry;
use crate::socket::UnixOpsListener;
use crate::supervisor::SupervisorLoop;

/// Wall-clock budget for draining the registry on shutdown (spec §4.7).
const SHUTDOWN_BUDGET: Duration = Duration::from_secs(30);

/// The running Actor Host: owns the registry, the bound ops socket, and the
/// background dispatcher/supervisor tasks.
pub struct Host {
    registry: Registry,
    stop_tx: watch::Sender<bool>,
    config: HostConfig,
    instance_id: u32,
}

impl Host {
    /// Read config, chdir into its directory, and build the host — does
    /// not yet bind sockets or install signal handlers (spec §4.7's first
    /// two steps, split out so tests can inspect the config without
    /// touching the filesystem-wide process state).
    pub fn from_config_file(config_path: &Path, instance_id: u32) -> Result<Self, HostError> {
        let config = HostConfig::load(config_path)?;
        config.validate().map_err(|msg| HostError::Config(crate::error::ConfigError::InvalidInstanceId(msg)))?;

        let config_dir = HostConfig::config_dir(config_path);
        std::env::set_current_dir(&config_dir).map_err(HostError::ChangeDir)?;

        Ok(Self {
            registry: Registry::new(),
            stop_tx: watch::channel(false).0,
            config,
            instance_id,
        })
    }

    /// Install INT/QUIT/TERM handlers that set the stop event (spec §6:
    /// "SIGTERM, if received, is treated identically" to SIGINT/SIGQUIT).
    fn install_signal_handlers(&self) -> Result<(), HostError> {
        let stop_tx = self.stop_tx.clone();
        let mut sigint = signal(SignalKind::interrupt()).map_err(HostError::Signal)?;
        let mut sigquit = signal(SignalKind::quit()).map_err(HostError::Signal)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(HostError::Signal)?;

        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => info!("received SIGINT"),
                _ = sigquit.recv() => info!("received SIGQUIT"),
                _ = sigterm.recv() => info!("received SIGTERM"),
            }
            let _ = stop_tx.send(true);
        });

        Ok(())
    }

    /// Run the host to completion: bind sockets, spawn the dispatcher and
    /// supervisor, block until the stop event fires, then drain the
    /// registry within the shutdown budget.
    pub async fn run(self) -> Result<(), HostError> {
        self.install_signal_handlers()?;

        let listener = UnixOpsListener::bind(self.instance_id)?;
        let host_manager_addr = format!("127.0.0.1:{}", self.config.ops_port);

        let loader: Arc<dyn ActorLoader> =
            Arc::new(DynamicLoader::new(self.config.resolved_code_directory().to_path_buf()));

        let mut dispatcher = Dispatcher::new(self.registry.clone(), loader, self.stop_tx.subscribe());
        let dispatcher_task = tokio::spawn(async move {
            dispatcher.serve(&listener).await;
        });

        let mut supervisor = SupervisorLoop::new(self.registry.clone(), self.stop_tx.subscribe());
        let supervisor_addr = host_manager_addr.clone();
        let supervisor_task = tokio::spawn(async move {
            supervisor.run(&supervisor_addr).await;
        });

        let mut stop_rx = self.stop_tx.subscribe();
        if !*stop_rx.borrow() {
            let _ = stop_rx.changed().await;
        }

        info!("stop event observed, beginning shutdown");
        self.registry.begin_shutdown();
        self.drain_registry().await;

        if let Err(err) = dispatcher_task.await {
            error!(error = %err, "dispatcher task panicked");
        }
        if let Err(err) = supervisor_task.await {
            error!(error = %err, "supervisor task panicked");
        }

        Ok(())
    }

    async fn drain_registry(&self) {
        let deadline = tokio::time::Instant::now() + SHUTDOWN_BUDGET;

        let uids = self.registry.snapshot();
        let mut entries = Vec::with_capacity(uids.len());
        for uid in uids {
            if let Some(entry) = self.registry.remove(&uid) {
                entries.push((uid, entry));
            }
        }

        for (_uid, entry) in entries.iter_mut() {
            entry.handle.stop().await;
        }

        for (uid, entry) in entries.iter_mut() {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if entry.handle.join(remaining).await {
                continue;
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if let Err(err) = entry.handle.kill(remaining).await {
                warn!(uid = %uid, error = %err, "actor did not terminate within the shutdown budget");
            }
        }
    }
}
