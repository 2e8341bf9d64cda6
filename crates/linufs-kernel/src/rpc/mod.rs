//! Admin RPC channel seam.
//!
//! The remote backend talks to the admin service through [`AdminChannel`].
//! A call names a target (always [`ADMIN_TARGET`](crate::constants::ADMIN_TARGET)),
//! a method, and ASCII key/value parameters whose text values are already
//! escaped. The reply carries the service status and the raw packed record.
//!
//! Session and transport mechanics belong to the channel implementation.
//! [`LoopbackAdmin`] serves the contract in-process.

mod loopback;

use async_trait::async_trait;

pub use loopback::{LoopbackAdmin, status};

/// Admin method names.
pub mod method {
    pub const CREATE: &str = "create";
    pub const REMOVE: &str = "remove";
    pub const LOOKUP: &str = "lookup";
    pub const LIST: &str = "list";
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
}

/// Admin parameter names.
pub mod param {
    pub const PARENT: &str = "parent";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const INODE: &str = "inode";
    pub const CONTENT: &str = "content";
}

/// One outgoing admin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCall {
    /// Access token recorded by `initialize`.
    pub token: String,
    /// Service target.
    pub target: &'static str,
    /// Method name.
    pub method: &'static str,
    /// Parameters in call order.
    pub params: Vec<(&'static str, String)>,
    /// Size of the record the caller expects back.
    pub response_len: usize,
}

impl RpcCall {
    /// Value of a parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Reply to an admin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    /// Service status; 0 is success.
    pub status: i64,
    /// Packed reply record (empty on failure).
    pub body: Vec<u8>,
}

impl RpcReply {
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: 0, body }
    }

    pub fn failed(status: i64) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

/// Transport-level failure, before any service status is known.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

impl ChannelError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// A blocking-from-the-caller's-view round trip to the admin service.
#[async_trait]
pub trait AdminChannel: Send + Sync {
    /// Perform one call.
    async fn call(&self, call: RpcCall) -> Result<RpcReply, ChannelError>;
}
