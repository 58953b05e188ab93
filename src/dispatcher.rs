//! Serves the local ops endpoint: decodes requests, routes to the
//! registry/loader, replies exactly once (spec §4.5).

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

// Layer 3: Internal module imports
use crate::actor::loader::ActorContext;
use crate::actor::{ActorHandle, ActorLoader};
use crate::error::SocketError;
use crate::message::{Reply, Request};
use crate::registry::{ActorEntry, Registry};
use crate::socket::{MessageSocket, UnixOpsListener};
use crate::util::{ActorUid, Realm};

use std::time::Duration;

/// Timeout budget for `kill_actor`'s join phase (spec §4.5).
const KILL_ACTOR_JOIN_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout budget for `kill_actor`'s force-kill phase (spec §4.5).
const KILL_ACTOR_KILL_TIMEOUT: Duration = Duration::from_secs(10);

/// Serves one accepted connection to completion — one request, one reply,
/// then loops until the peer disconnects or the stop event fires.
pub struct Dispatcher {
    registry: Registry,
    loader: Arc<dyn ActorLoader>,
    stop_rx: watch::Receiver<bool>,
}

impl Dispatcher {
    pub fn new(registry: Registry, loader: Arc<dyn ActorLoader>, stop_rx: watch::Receiver<bool>) -> Self {
        Self {
            registry,
            loader,
            stop_rx,
        }
    }

    /// Accept connections on `listener` until the stop event fires. Never
    /// processes two requests concurrently on the same socket (spec §4.5).
    pub async fn serve(&mut self, listener: &UnixOpsListener) {
        loop {
            if *self.stop_rx.borrow() {
                return;
            }
            let accepted = tokio::select! {
                biased;
                _ = self.stop_rx.changed() => return,
                accepted = listener.accept() => accepted,
            };
            match accepted {
                Ok(mut socket) => self.serve_connection(&mut socket).await,
                Err(err) => warn!(error = %err, "failed to accept ops connection"),
            }
        }
    }

    async fn serve_connection(&mut self, socket: &mut MessageSocket) {
        loop {
            if *self.stop_rx.borrow() {
                return;
            }
            // Race the blocking recv against the stop event itself — an
            // idle connection with no traffic must not keep this loop (and
            // so `serve`, and so the dispatcher task) alive past the tick
            // the stop event fires in (spec §5, P4).
            let raw: Result<serde_json::Value, SocketError> = tokio::select! {
                biased;
                _ = self.stop_rx.changed() => return,
                raw = socket.recv() => raw,
            };
            let reply = match raw {
                Ok(value) => self.dispatch(value).await,
                Err(SocketError::Malformed(_)) => {
                    tracing::error!("malformed ops request frame");
                    Reply::error("invalid request", None)
                }
                Err(_) => {
                    // Transport-level EOF or I/O failure: the peer is gone,
                    // not merely confused — nothing to reply to.
                    return;
                }
            };
            if socket.send(&reply).await.is_err() {
                return;
            }
        }
    }

    async fn dispatch(&mut self, raw: serde_json::Value) -> Reply {
        let request = match serde_json::from_value::<Request>(raw) {
            Ok(request) => request,
            Err(_) => {
                tracing::error!("malformed ops request frame");
                return Reply::error("invalid request", None);
            }
        };

        info!(req = %request.req, "accepted ops request");

        match request.req.as_str() {
            "keepalive" => Reply::ok(None),
            "start_actor" => self.start_actor(request).await,
            "kill_actor" => self.kill_actor(request).await,
            other => Reply::error("unknown request", Some(json!({ "req": other }))),
        }
    }

    async fn start_actor(&mut self, request: Request) -> Reply {
        let (Some(actor_name), Some(port), Some(uid)) =
            (request.actor_name.clone(), request.port, request.uid.clone())
        else {
            return Reply::error("missing information to start actor", None);
        };

        let realm = Realm::from_request(request.realm.as_deref());
        let uid = ActorUid::new(uid);

        let ctx = ActorContext {
            realm: realm.clone(),
            actor_name: actor_name.clone(),
            port,
            uid: uid.clone(),
        };

        let handle = match self.loader.instantiate(ctx).await {
            Ok(handle) => handle,
            Err(err) => {
                return Reply::error("exception", Some(json!({ "st": err.trace() })));
            }
        };

        let entry = ActorEntry {
            handle,
            realm: realm.as_str().to_string(),
            actor_name,
            port,
        };

        // Insert before starting: a handle that never enters the registry
        // is never started, so a rejected insert (duplicate uid, or the
        // registry shutting down) leaks no execution unit (spec §3 I5, P3).
        match self.registry.insert(uid.clone(), entry) {
            Ok(()) => {
                if let Some(mut guard) = self.registry.get_mut(&uid) {
                    guard.handle.start().await;
                }
                Reply::ok(None)
            }
            Err((_, mut rejected)) => {
                rejected.handle.stop().await;
                let _ = rejected.handle.kill(KILL_ACTOR_KILL_TIMEOUT).await;
                Reply::error("exception", Some(json!({ "st": "registry rejected insertion" })))
            }
        }
    }

    async fn kill_actor(&mut self, request: Request) -> Reply {
        let Some(uid) = request.uid.clone() else {
            return Reply::error("missing information to stop actor", None);
        };
        let uid = ActorUid::new(uid);

        let Some(mut entry) = self.registry.remove(&uid) else {
            return Reply::error("actor not found", None);
        };

        entry.handle.stop().await;
        if entry.handle.join(KILL_ACTOR_JOIN_TIMEOUT).await {
            return Reply::ok(None);
        }

        match entry.handle.kill(KILL_ACTOR_KILL_TIMEOUT).await {
            Ok(()) => Reply::ok(Some(json!({ "error": "timeout" }))),
            Err(_) => Reply::ok(Some(json!({ "error": "timeout" }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{StaticLoader, TaskActorHandle};
    use serde_json::json;
    use std::sync::Arc;

    fn dispatcher_with_loader() -> (Dispatcher, watch::Sender<bool>, Registry) {
        let registry = Registry::new();
        let loader: Arc<dyn ActorLoader> = Arc::new(StaticLoader::new());
        let (stop_tx, stop_rx) = watch::channel(false);
        (
            Dispatcher::new(registry.clone(), loader, stop_rx),
            stop_tx,
            registry,
        )
    }

    #[tokio::test]
    async fn keepalive_replies_ok() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher.dispatch(json!({"req": "keepalive"})).await;
        assert_eq!(reply.status, crate::message::Status::Ok);
    }

    #[tokio::test]
    async fn unknown_request_echoes_the_action() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher.dispatch(json!({"req": "whatever"})).await;
        assert_eq!(reply.error.as_deref(), Some("unknown request"));
        assert_eq!(reply.data.unwrap()["req"], "whatever");
    }

    #[tokio::test]
    async fn malformed_frame_is_invalid_request() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher.dispatch(json!({"not_a_req_field": true})).await;
        assert_eq!(reply.error.as_deref(), Some("invalid request"));
    }

    #[tokio::test]
    async fn start_actor_missing_fields_is_rejected() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher
            .dispatch(json!({"req": "start_actor", "actor_name": "Echo"}))
            .await;
        assert_eq!(reply.error.as_deref(), Some("missing information to start actor"));
    }

    #[tokio::test]
    async fn start_actor_load_failure_reports_exception() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher
            .dispatch(json!({"req": "start_actor", "actor_name": "Missing", "port": 9102, "uid": "b1"}))
            .await;
        assert_eq!(reply.error.as_deref(), Some("exception"));
        assert!(reply.data.unwrap()["st"].as_str().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn happy_path_start_then_kill() {
        let registry = Registry::new();
        let static_loader = StaticLoader::new();
        static_loader.register(
            "global",
            "Echo",
            Arc::new(|_ctx| Box::new(TaskActorHandle::new(|mut stop| async move {
                stop.cancelled().await;
            })) as Box<dyn ActorHandle>),
        );
        let loader: Arc<dyn ActorLoader> = Arc::new(static_loader);
        let (_stop_tx, stop_rx) = watch::channel(false);
        let mut dispatcher = Dispatcher::new(registry.clone(), loader, stop_rx);

        let start_reply = dispatcher
            .dispatch(json!({"req": "start_actor", "actor_name": "Echo", "port": 9101, "uid": "a1", "realm": "global"}))
            .await;
        assert_eq!(start_reply.status, crate::message::Status::Ok);
        assert!(registry.contains(&ActorUid::new("a1")));

        let kill_reply = dispatcher.dispatch(json!({"req": "kill_actor", "uid": "a1"})).await;
        assert_eq!(kill_reply.status, crate::message::Status::Ok);
        assert!(!registry.contains(&ActorUid::new("a1")));
    }

    #[tokio::test]
    async fn kill_actor_missing_uid_is_not_found() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher.dispatch(json!({"req": "kill_actor", "uid": "nonexistent"})).await;
        assert_eq!(reply.error.as_deref(), Some("actor not found"));
    }

    #[tokio::test]
    async fn kill_actor_without_uid_field_is_rejected() {
        let (mut dispatcher, _stop_tx, _registry) = dispatcher_with_loader();
        let reply = dispatcher.dispatch(json!({"req": "kill_actor"})).await;
        assert_eq!(reply.error.as_deref(), Some("missing information to stop actor"));
    }

    #[tokio::test]
    async fn start_actor_with_a_duplicate_uid_stops_the_rejected_handle() {
        // Regression test: a `start_actor` whose insert is rejected must not
        // leak the handle it just loaded (spec P3) — the handle it was
        // about to discard must be stopped, not merely dropped.
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc as StdArc;

        let registry = Registry::new();
        let static_loader = StaticLoader::new();

        static_loader.register(
            "global",
            "First",
            Arc::new(|_ctx| {
                Box::new(TaskActorHandle::new(|mut stop| async move {
                    stop.cancelled().await;
                })) as Box<dyn ActorHandle>
            }),
        );

        let second_stopped = StdArc::new(AtomicBool::new(false));
        let second_stopped_clone = second_stopped.clone();
        static_loader.register(
            "global",
            "Second",
            Arc::new(move |_ctx| {
                let flag = second_stopped_clone.clone();
                Box::new(TaskActorHandle::new(move |mut stop| async move {
                    stop.cancelled().await;
                    flag.store(true, Ordering::SeqCst);
                })) as Box<dyn ActorHandle>
            }),
        );

        let loader: Arc<dyn ActorLoader> = Arc::new(static_loader);
        let (_stop_tx, stop_rx) = watch::channel(false);
        let mut dispatcher = Dispatcher::new(registry.clone(), loader, stop_rx);

        let first_reply = dispatcher
            .dispatch(json!({"req": "start_actor", "actor_name": "First", "port": 9101, "uid": "dup", "realm": "global"}))
            .await;
        assert_eq!(first_reply.status, crate::message::Status::Ok);

        let second_reply = dispatcher
            .dispatch(json!({"req": "start_actor", "actor_name": "Second", "port": 9102, "uid": "dup", "realm": "global"}))
            .await;
        assert_eq!(second_reply.error.as_deref(), Some("exception"));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(second_stopped.load(Ordering::SeqCst), "rejected handle was never stopped");
        assert!(registry.contains(&ActorUid::new("dup")));
    }
}
