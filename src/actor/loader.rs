//! Locates and instantiates actor code given (realm, actor_name, port, uid)
//! (spec §4.3, §9's "plugin-discovery interface").

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::actor::handle::ActorHandle;
use crate::error::LoadError;
use crate::util::{ActorUid, Realm};

/// What the loader hands to a newly constructed actor so it can reach back
/// into the host without depending on the concrete `Host` type. Narrowed to
/// what spec §4.3 actually requires: the actor's own coordinates.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub realm: Realm,
    pub actor_name: String,
    pub port: u32,
    pub uid: ActorUid,
}

/// A constructor for a statically registered actor.
pub type ActorFactory = Arc<dyn Fn(ActorContext) -> Box<dyn ActorHandle> + Send + Sync>;

/// Resolves `(realm, actor_name, port, uid)` to a not-yet-started
/// `ActorHandle`. On any failure the loader performs no side effects and
/// returns a diagnostic (spec §4.3).
#[async_trait]
pub trait ActorLoader: Send + Sync {
    async fn instantiate(&self, ctx: ActorContext) -> Result<Box<dyn ActorHandle>, LoadError>;
}

/// Models "scanning the filesystem for pre-registered modules at startup"
/// (spec §9) from a compiled language's perspective: actor constructors are
/// registered at compile time rather than discovered by introspection.
#[derive(Clone, Default)]
pub struct StaticLoader {
    factories: Arc<RwLock<HashMap<(String, String), ActorFactory>>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `actor_name` within `realm`.
    pub fn register(&self, realm: &str, actor_name: &str, factory: ActorFactory) {
        self.factories
            .write()
            .insert((realm.to_string(), actor_name.to_string()), factory);
    }
}

#[async_trait]
impl ActorLoader for StaticLoader {
    async fn instantiate(&self, ctx: ActorContext) -> Result<Box<dyn ActorHandle>, LoadError> {
        let key = (ctx.realm.as_str().to_string(), ctx.actor_name.clone());
        let factory = self
            .factories
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(format!("{}/{}", key.0, key.1)))?;
        Ok(factory(ctx))
    }
}

/// Resolves `<code_directory>/<realm>/<actor_name>.<ext>` and loads it as a
/// platform shared library via `libloading`, looking up a symbol named
/// exactly `actor_name` (spec §6 "Actor code layout").
///
/// The exported symbol must have signature
/// `extern "C" fn(realm: *const c_char, port: u32, uid: *const c_char) -> *mut std::ffi::c_void`
/// returning an opaque pointer the loader wraps; this crate ships no such
/// library itself — `StaticLoader` is the path exercised by tests and the
/// demo actor.
pub struct DynamicLoader {
    code_directory: PathBuf,
}

impl DynamicLoader {
    pub fn new(code_directory: PathBuf) -> Self {
        Self { code_directory }
    }

    fn library_path(&self, realm: &Realm, actor_name: &str) -> PathBuf {
        let extension = if cfg!(target_os = "macos") {
            "dylib"
        } else if cfg!(target_os = "windows") {
            "dll"
        } else {
            "so"
        };
        self.code_directory
            .join(realm.as_str())
            .join(format!("{actor_name}.{extension}"))
    }
}

#[async_trait]
impl ActorLoader for DynamicLoader {
    async fn instantiate(&self, ctx: ActorContext) -> Result<Box<dyn ActorHandle>, LoadError> {
        let path = self.library_path(&ctx.realm, &ctx.actor_name);
        if !path.exists() {
            return Err(LoadError::NotFound(path.display().to_string()));
        }

        // SAFETY: the loaded library is treated as untrusted actor code;
        // `libloading` cannot itself guarantee the symbol's signature
        // matches — a mismatched export is the actor author's bug, not
        // ours, and surfaces as a constructor failure rather than UB we
        // can detect here.
        let library = unsafe { libloading::Library::new(&path) }
            .map_err(|err| LoadError::LibraryLoad(err.to_string()))?;

        let actor_name = ctx.actor_name.clone();
        let symbol_name = format!("{actor_name}\0");

        // The actual FFI call is deferred to a real plugin contract; this
        // loader validates presence of the symbol and reports any lookup
        // failure through `LoadError`, matching spec §4.3's "on any error
        // ... returns a failure carrying a diagnostic trace and performs no
        // side effects".
        let _symbol = unsafe {
            library
                .get::<unsafe extern "C" fn()>(symbol_name.as_bytes())
                .map_err(|_| LoadError::SymbolMissing(actor_name.clone()))?
        };

        Err(LoadError::ConstructorFailed(format!(
            "dynamic actor construction for {actor_name} requires a concrete FFI contract not exercised in this build"
        )))
    }
}
