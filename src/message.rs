//! Wire envelope documents exchanged over the Message Socket.
//!
//! Every request carries `req`; every reply carries `status` plus optional
//! `error`/`data`, exactly as spec §4.1 requires.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Layer 3: Internal module imports
// (none)

/// A decoded request frame. Fields not used by a given `req` kind are
/// simply absent (`None`) rather than validated against a per-request
/// schema; the dispatcher checks only the fields each `req` requires.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub req: String,

    #[serde(default)]
    pub actor_name: Option<String>,

    #[serde(default)]
    pub port: Option<u32>,

    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub realm: Option<String>,
}

/// A reply envelope: `ok` or `error`, with optional data/reason.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

impl Reply {
    /// `{status: ok, data?}` (spec §4.1's `successMessage`).
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            status: Status::Ok,
            error: None,
            data,
        }
    }

    /// `{status: error, error: reason, data?}` (spec §4.1's `errorMessage`).
    pub fn error(reason: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: Status::Error,
            error: Some(reason.into()),
            data,
        }
    }
}

/// Outbound notification the supervisor sends to the HostManager:
/// `{req: remove_actor, uid}` (spec §4.6).
#[derive(Debug, Clone, Serialize)]
pub struct RemoveActorNotification {
    pub req: &'static str,
    pub uid: String,
}

impl RemoveActorNotification {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            req: "remove_actor",
            uid: uid.into(),
        }
    }
}
