//! In-process admin service.
//!
//! Serves the admin wire contract on top of a [`LocalStore`]: parameters
//! are un-escaped, the operation runs against the table, and the reply is
//! the exact packed record the remote backend expects.

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{AdminChannel, ChannelError, RpcCall, RpcReply, method, param};
use crate::config::LocalConfig;
use crate::constants::{
    ADMIN_TARGET, LIST_MAX_ENTRIES, REMOTE_CONTENT_CAPACITY, REMOTE_ROOT,
};
use crate::store::{Ino, LocalStore, NodeKind, NodeStore, StoreError, StoreResult};
use crate::wire::{
    CreateResponse, ListEntry, ListResponse, LookupResponse, ReadResponse, RemoveResponse,
    WireRecord, WriteResponse, unescape, unescape_str,
};

/// Non-zero statuses reported by the loopback service.
pub mod status {
    pub const NOT_FOUND: i64 = 1;
    pub const NOT_A_DIRECTORY: i64 = 2;
    pub const EXISTS: i64 = 3;
    pub const NOT_EMPTY: i64 = 4;
    pub const NO_SPACE: i64 = 5;
    pub const BAD_REQUEST: i64 = 6;
    pub const IS_A_DIRECTORY: i64 = 7;
}

/// Failure inside the loopback service, reported as a status code.
struct Rejected(i64);

impl From<StoreError> for Rejected {
    fn from(e: StoreError) -> Self {
        Rejected(match e {
            StoreError::NotFound(_) => status::NOT_FOUND,
            StoreError::NotADirectory(_) => status::NOT_A_DIRECTORY,
            StoreError::IsADirectory(_) => status::IS_A_DIRECTORY,
            StoreError::AlreadyExists(_) => status::EXISTS,
            StoreError::DirectoryNotEmpty(_) => status::NOT_EMPTY,
            StoreError::Exhausted => status::NO_SPACE,
            _ => status::BAD_REQUEST,
        })
    }
}

impl From<crate::wire::WireError> for Rejected {
    fn from(_: crate::wire::WireError) -> Self {
        Rejected(status::BAD_REQUEST)
    }
}

type Served = Result<Vec<u8>, Rejected>;

/// Admin service running in the current process.
#[derive(Debug)]
pub struct LoopbackAdmin {
    store: LocalStore,
}

impl Default for LoopbackAdmin {
    fn default() -> Self {
        Self {
            store: LocalStore::build_unchecked(&Self::store_config(REMOTE_ROOT)),
        }
    }
}

impl LoopbackAdmin {
    /// Create a service whose root directory is `root`.
    pub fn new(root: u32) -> StoreResult<Self> {
        Ok(Self {
            store: LocalStore::with_config(&Self::store_config(root))?,
        })
    }

    fn store_config(root: u32) -> LocalConfig {
        LocalConfig {
            root,
            content_capacity: REMOTE_CONTENT_CAPACITY,
            seed_demo: false,
            ..LocalConfig::default()
        }
    }

    /// The table behind the service.
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    fn ino(call: &RpcCall, key: &str) -> Result<Ino, Rejected> {
        call.param(key)
            .and_then(|v| v.parse::<u32>().ok())
            .map(Ino::new)
            .ok_or(Rejected(status::BAD_REQUEST))
    }

    fn name(call: &RpcCall) -> Result<String, Rejected> {
        let escaped = call.param(param::NAME).ok_or(Rejected(status::BAD_REQUEST))?;
        Ok(unescape_str(escaped)?)
    }

    fn kind(call: &RpcCall) -> Result<NodeKind, Rejected> {
        call.param(param::TYPE)
            .and_then(|v| v.parse::<u8>().ok())
            .and_then(NodeKind::from_wire)
            .ok_or(Rejected(status::BAD_REQUEST))
    }

    async fn serve(&self, call: &RpcCall) -> Served {
        match call.method {
            method::CREATE => {
                let parent = Self::ino(call, param::PARENT)?;
                let name = Self::name(call)?;
                let kind = Self::kind(call)?;
                let ino = self.store.create(parent, &name, kind).await?;
                Ok(CreateResponse { ino }.encode()?)
            }
            method::REMOVE => {
                let parent = Self::ino(call, param::PARENT)?;
                let name = Self::name(call)?;
                self.store.remove(parent, &name).await?;
                Ok(RemoveResponse.encode()?)
            }
            method::LOOKUP => {
                let parent = Self::ino(call, param::PARENT)?;
                let name = Self::name(call)?;
                let node = self
                    .store
                    .lookup(parent, &name)
                    .await?
                    .ok_or(Rejected(status::NOT_FOUND))?;
                Ok(LookupResponse {
                    ino: node.number,
                    kind: node.kind,
                }
                .encode()?)
            }
            method::LIST => {
                let directory = Self::ino(call, param::INODE)?;
                let batch = self.store.list(directory).await?;
                if batch.len() > LIST_MAX_ENTRIES {
                    return Err(Rejected(status::BAD_REQUEST));
                }
                let entries = batch
                    .into_iter()
                    .map(|n| ListEntry::new(n.name, n.number, n.kind))
                    .collect();
                Ok(ListResponse { entries }.encode()?)
            }
            method::READ => {
                let ino = Self::ino(call, param::INODE)?;
                let content = self.store.read_all(ino).await?;
                Ok(ReadResponse::new(content).encode()?)
            }
            method::WRITE => {
                let ino = Self::ino(call, param::INODE)?;
                let escaped = call
                    .param(param::CONTENT)
                    .ok_or(Rejected(status::BAD_REQUEST))?;
                let content = unescape(escaped)?;
                if content.len() > REMOTE_CONTENT_CAPACITY {
                    return Err(Rejected(status::BAD_REQUEST));
                }
                self.store.replace_content(ino, &content)?;
                Ok(WriteResponse.encode()?)
            }
            _ => Err(Rejected(status::BAD_REQUEST)),
        }
    }
}

#[async_trait]
impl AdminChannel for LoopbackAdmin {
    async fn call(&self, call: RpcCall) -> Result<RpcReply, ChannelError> {
        trace!(method = call.method, params = ?call.params, "loopback call");
        if call.target != ADMIN_TARGET {
            return Err(ChannelError::new(format!("unknown target {}", call.target)));
        }

        match self.serve(&call).await {
            Ok(body) => Ok(RpcReply::ok(body)),
            Err(Rejected(code)) => {
                debug!(method = call.method, code, "loopback call rejected");
                Ok(RpcReply::failed(code))
            }
        }
    }
}
