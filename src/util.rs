//! Identifiers and small value types shared across the host.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Default realm name used whenever a `start_actor` request omits `realm`
/// or supplies a blank one.
pub const DEFAULT_REALM: &str = "global";

/// Opaque actor identifier, unique cluster-wide for the lifetime of the
/// process that issued it.
///
/// The host never interprets the contents of a UID beyond equality —
/// printable strings are sufficient, as spec.md §3 allows.
///
/// # Example
/// ```rust
/// use actor_host::util::ActorUid;
///
/// let a = ActorUid::new("a1");
/// let b = ActorUid::new("a1");
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorUid(String);

impl ActorUid {
    /// Wrap a caller-supplied identifier.
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ActorUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ActorUid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ActorUid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Namespace that partitions the actor code tree.
///
/// The loader resolves code at `<code_directory>/<realm>/<actor_name>`.
/// An empty or blank realm normalizes to [`DEFAULT_REALM`] — this is the
/// intended behavior for the "empty realm" edge case; see spec.md §9's
/// "bug in realm reset" note, which this crate does not reproduce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Realm(String);

impl Realm {
    /// Build a realm from an optional, possibly-blank caller value,
    /// normalizing `None` or whitespace-only input to [`DEFAULT_REALM`].
    pub fn from_request(realm: Option<&str>) -> Self {
        match realm.map(str::trim) {
            Some(value) if !value.is_empty() => Self(value.to_string()),
            _ => Self::default(),
        }
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self(DEFAULT_REALM.to_string())
    }
}

impl Display for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form tag attached at actor creation time.
///
/// The host passes categories through to the Directory (out of scope here)
/// without interpreting them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Wrap a caller-supplied category tag.
    pub fn new(category: impl Into<String>) -> Self {
        Self(category.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
