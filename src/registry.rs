//! In-memory UID → Actor Handle mapping (spec §4.2).

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;

// Layer 3: Internal module imports
use crate::actor::ActorHandle;
use crate::error::RegistryError;
use crate::util::ActorUid;

/// A registered actor: its handle plus the metadata the supervisor and
/// dispatcher need without consulting the handle itself.
pub struct ActorEntry {
    pub handle: Box<dyn ActorHandle>,
    pub realm: String,
    pub actor_name: String,
    pub port: u32,
}

// Manual impl: `ActorHandle` itself carries no `Debug` bound, so `#[derive]`
// can't reach through the `Box<dyn ActorHandle>` field. Needed so
// `Result<(), (RegistryError, ActorEntry)>` satisfies `.expect()`/`.unwrap_err()`'s
// `E: Debug` bound in callers and tests.
impl std::fmt::Debug for ActorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorEntry")
            .field("realm", &self.realm)
            .field("actor_name", &self.actor_name)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// The Actor Registry. Cheaply `Clone`-able; clones share the same backing
/// map (teacher's `ActorRegistry` pattern — `Arc<DashMap<...>>`).
#[derive(Clone)]
pub struct Registry {
    entries: Arc<DashMap<ActorUid, ActorEntry>>,
    stopping: Arc<AtomicBool>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the registry as shutting down. After this, `insert` always
    /// fails (invariant I3).
    pub fn begin_shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Insert a new entry. Fails if the uid already exists or the registry
    /// is shutting down (invariants I2, I3). On failure the entry is handed
    /// back to the caller instead of being silently dropped, so a rejected
    /// actor can still be torn down rather than leaking its execution unit.
    pub fn insert(&self, uid: ActorUid, entry: ActorEntry) -> Result<(), (RegistryError, ActorEntry)> {
        if self.stopping.load(Ordering::SeqCst) {
            return Err((RegistryError::ShuttingDown, entry));
        }
        if self.entries.contains_key(&uid) {
            return Err((RegistryError::AlreadyExists, entry));
        }
        self.entries.insert(uid, entry);
        Ok(())
    }

    /// Remove and return an entry, or `None` if absent — removal is a
    /// no-op when the uid is not present (spec §4.6's reuse edge case).
    pub fn remove(&self, uid: &ActorUid) -> Option<ActorEntry> {
        self.entries.remove(uid).map(|(_, entry)| entry)
    }

    pub fn contains(&self, uid: &ActorUid) -> bool {
        self.entries.contains_key(uid)
    }

    /// Spec §4.2's `get(uid)`: mutable, non-removing access to an entry
    /// still in the map. Used to call `start()` on a handle already
    /// inserted under the registry's lock, and by anything else that needs
    /// to act on a live entry without the remove-then-reinsert race of
    /// evicting it first.
    pub fn get_mut(&self, uid: &ActorUid) -> Option<RefMut<'_, ActorUid, ActorEntry>> {
        self.entries.get_mut(uid)
    }

    /// Liveness of the entry at `uid` without removing it — `None` if the
    /// uid is absent. Lets the supervisor tell dead actors from live ones
    /// without evicting live ones from the registry first (spec §4.6, §5).
    pub fn is_running(&self, uid: &ActorUid) -> Option<bool> {
        self.entries.get(uid).map(|entry| entry.handle.is_running())
    }

    /// A point-in-time list of uids, safe to iterate without holding the
    /// map lock (spec §4.2, §4.6 — "iteration MUST NOT mutate the registry
    /// under its own iterator").
    pub fn snapshot(&self) -> Vec<ActorUid> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::task::TaskActorHandle;

    fn entry() -> ActorEntry {
        ActorEntry {
            handle: Box::new(TaskActorHandle::spawn(|_stop| async move {})),
            realm: "global".to_string(),
            actor_name: "Echo".to_string(),
            port: 9101,
        }
    }

    #[test]
    fn insert_rejects_duplicate_uid() {
        let registry = Registry::new();
        let uid = ActorUid::new("a1");
        registry.insert(uid.clone(), entry()).expect("first insert");
        let (err, _rejected) = registry.insert(uid, entry()).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyExists);
    }

    #[test]
    fn insert_after_shutdown_is_rejected() {
        let registry = Registry::new();
        registry.begin_shutdown();
        let (err, _rejected) = registry.insert(ActorUid::new("a1"), entry()).unwrap_err();
        assert_eq!(err, RegistryError::ShuttingDown);
    }

    #[test]
    fn insert_failure_hands_the_entry_back() {
        let registry = Registry::new();
        let uid = ActorUid::new("a1");
        registry.insert(uid.clone(), entry()).expect("first insert");
        let (_err, rejected) = registry.insert(uid, entry()).unwrap_err();
        assert_eq!(rejected.actor_name, "Echo");
    }

    #[test]
    fn is_running_reports_liveness_without_removing() {
        let registry = Registry::new();
        let uid = ActorUid::new("a1");
        registry.insert(uid.clone(), entry()).expect("insert");
        assert_eq!(registry.is_running(&uid), Some(true));
        assert!(registry.contains(&uid));
    }

    #[test]
    fn is_running_is_none_for_absent_uid() {
        let registry = Registry::new();
        assert_eq!(registry.is_running(&ActorUid::new("missing")), None);
    }

    #[test]
    fn get_mut_allows_mutation_without_removing() {
        let registry = Registry::new();
        let uid = ActorUid::new("a1");
        registry.insert(uid.clone(), entry()).expect("insert");
        {
            let mut guard = registry.get_mut(&uid).expect("present");
            guard.port = 9999;
        }
        assert!(registry.contains(&uid));
    }

    #[test]
    fn remove_of_absent_uid_is_noop() {
        let registry = Registry::new();
        assert!(registry.remove(&ActorUid::new("missing")).is_none());
    }

    #[test]
    fn snapshot_reflects_current_membership() {
        let registry = Registry::new();
        registry.insert(ActorUid::new("a1"), entry()).expect("insert a1");
        registry.insert(ActorUid::new("a2"), entry()).expect("insert a2");
        let mut snapshot = registry.snapshot();
        snapshot.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(snapshot, vec![ActorUid::new("a1"), ActorUid::new("a2")]);
    }

    #[test]
    fn clones_share_the_same_backing_map() {
        let registry = Registry::new();
        let clone = registry.clone();
        registry.insert(ActorUid::new("a1"), entry()).expect("insert");
        assert!(clone.contains(&ActorUid::new("a1")));
    }
}
