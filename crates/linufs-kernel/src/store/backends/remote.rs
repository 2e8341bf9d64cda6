//! Admin-service node store.
//!
//! Every operation is one (or, for `write`, two) round trips to the admin
//! service through an [`AdminChannel`]. Names and content travel escaped;
//! replies are packed records decoded by the wire codec.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::constants::{ADMIN_TARGET, REMOTE_CONTENT_CAPACITY};
use crate::rpc::{AdminChannel, RpcCall, method, param};
use crate::store::content::ContentBuffer;
use crate::store::error::{StoreError, StoreResult};
use crate::store::ops::NodeStore;
use crate::store::types::{Ino, Node, NodeBatch, NodeKind, validate_name};
use crate::wire::{
    CreateResponse, ListResponse, LookupResponse, ReadResponse, RemoveResponse, WireRecord,
    WriteResponse, escape,
};

/// Node store proxied to the admin service.
///
/// Failed calls are never retried here; any retry policy belongs to the
/// caller.
pub struct RemoteStore {
    root: Ino,
    timeout: Duration,
    channel: Arc<dyn AdminChannel>,
    token: RwLock<String>,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("root", &self.root)
            .field("timeout", &self.timeout)
            .field("channel", &"<dyn AdminChannel>")
            .finish()
    }
}

impl RemoteStore {
    /// Create a store with default settings over `channel`.
    pub fn new(channel: Arc<dyn AdminChannel>) -> Self {
        let config = RemoteConfig::default();
        Self {
            root: Ino::new(config.root),
            timeout: config.timeout(),
            channel,
            token: RwLock::new(String::new()),
        }
    }

    /// Create a store from explicit settings over `channel`.
    pub fn with_channel(config: &RemoteConfig, channel: Arc<dyn AdminChannel>) -> StoreResult<Self> {
        config
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self {
            root: Ino::new(config.root),
            timeout: config.timeout(),
            channel,
            token: RwLock::new(String::new()),
        })
    }

    /// Bound on one admin round trip.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one admin call and decode its reply as `R`.
    async fn call<R: WireRecord>(
        &self,
        method: &'static str,
        params: Vec<(&'static str, String)>,
    ) -> StoreResult<R> {
        let call = RpcCall {
            token: self.token.read().clone(),
            target: ADMIN_TARGET,
            method,
            params,
            response_len: R::SIZE,
        };

        let reply = tokio::time::timeout(self.timeout, self.channel.call(call))
            .await
            .map_err(|_| {
                warn!(method, timeout = ?self.timeout, "admin call timed out");
                StoreError::Timeout(method)
            })?
            .map_err(|e| {
                warn!(method, error = %e, "admin call failed in transport");
                StoreError::transport(e.to_string())
            })?;

        if !reply.is_ok() {
            return Err(StoreError::Rpc {
                method,
                code: reply.status,
            });
        }

        R::decode(&reply.body).map_err(|e| {
            warn!(method, error = %e, "admin reply did not decode");
            StoreError::from(e)
        })
    }

    /// Fetch the whole content of `ino`.
    async fn fetch(&self, ino: Ino) -> StoreResult<ReadResponse> {
        let response: ReadResponse = self
            .call(method::READ, vec![(param::INODE, ino.to_string())])
            .await?;
        if response.is_truncated() {
            warn!(
                %ino,
                reported = response.size,
                copied = response.content.len(),
                "read reply truncated to the content field"
            );
        }
        Ok(response)
    }
}

#[async_trait]
impl NodeStore for RemoteStore {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn initialize(&self, token: &str) -> StoreResult<()> {
        *self.token.write() = token.to_string();
        info!(root = %self.root, "remote store initialized");
        Ok(())
    }

    fn root_number(&self) -> Ino {
        self.root
    }

    #[tracing::instrument(skip(self), name = "remote.create")]
    async fn create(&self, parent: Ino, name: &str, kind: NodeKind) -> StoreResult<Ino> {
        validate_name(name)?;
        let response: CreateResponse = self
            .call(
                method::CREATE,
                vec![
                    (param::PARENT, parent.to_string()),
                    (param::NAME, escape(name)),
                    (param::TYPE, kind.to_wire().to_string()),
                ],
            )
            .await
            .inspect_err(|e| warn!(error = %e, "create failed"))?;

        if !response.ino.is_valid() {
            return Err(StoreError::other("admin create returned the invalid identifier"));
        }
        debug!(number = %response.ino, "created node");
        Ok(response.ino)
    }

    #[tracing::instrument(skip(self), name = "remote.remove")]
    async fn remove(&self, parent: Ino, name: &str) -> StoreResult<()> {
        validate_name(name)?;
        let _: RemoveResponse = self
            .call(
                method::REMOVE,
                vec![(param::PARENT, parent.to_string()), (param::NAME, escape(name))],
            )
            .await
            .inspect_err(|e| warn!(error = %e, "remove failed"))?;
        debug!("removed node");
        Ok(())
    }

    #[tracing::instrument(skip(self), name = "remote.lookup")]
    async fn lookup(&self, parent: Ino, name: &str) -> StoreResult<Option<Node>> {
        if validate_name(name).is_err() {
            return Ok(None);
        }
        let result: StoreResult<LookupResponse> = self
            .call(
                method::LOOKUP,
                vec![(param::PARENT, parent.to_string()), (param::NAME, escape(name))],
            )
            .await;

        match result {
            Ok(response) => Ok(Some(Node::new(response.ino, parent, name, response.kind))),
            // The service answers "no such entry" with a non-zero status.
            Err(StoreError::Rpc { code, .. }) => {
                debug!(code, "lookup found nothing");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self), name = "remote.list")]
    async fn list(&self, directory: Ino) -> StoreResult<NodeBatch> {
        let response: ListResponse = self
            .call(method::LIST, vec![(param::INODE, directory.to_string())])
            .await
            .inspect_err(|e| warn!(error = %e, "list failed"))?;

        // Each decoded entry becomes its own owned node.
        let nodes: Vec<Node> = response
            .entries
            .into_iter()
            .map(|e| Node::new(e.ino, directory, e.name, e.kind))
            .collect();
        debug!(count = nodes.len(), "listed directory");
        Ok(NodeBatch::new(directory, nodes))
    }

    #[tracing::instrument(skip(self, buf), fields(len = buf.len()), name = "remote.read")]
    async fn read(&self, ino: Ino, offset: u64, buf: &mut [u8]) -> StoreResult<usize> {
        let response = self.fetch(ino).await?;
        let content = ContentBuffer::from_slice(REMOTE_CONTENT_CAPACITY, &response.content);
        Ok(content.read(offset, buf))
    }

    #[tracing::instrument(skip(self, data), fields(len = data.len()), name = "remote.write")]
    async fn write(&self, ino: Ino, offset: u64, data: &[u8]) -> StoreResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let current = self.fetch(ino).await?;
        let mut content = ContentBuffer::from_slice(REMOTE_CONTENT_CAPACITY, &current.content);

        let written = content.write(offset, data);
        if written == 0 {
            debug!("write offset at or past capacity");
            return Ok(0);
        }
        if written < data.len() {
            warn!(requested = data.len(), written, "write truncated at content capacity");
        }

        let _: WriteResponse = self
            .call(
                method::WRITE,
                vec![
                    (param::INODE, ino.to_string()),
                    (param::CONTENT, escape(content.as_bytes())),
                ],
            )
            .await
            .inspect_err(|e| warn!(error = %e, "write failed"))?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{ChannelError, LoopbackAdmin, RpcReply};
    use parking_lot::Mutex;

    /// Channel that records calls and answers with a canned reply.
    struct Scripted {
        reply: RpcReply,
        calls: Mutex<Vec<RpcCall>>,
    }

    impl Scripted {
        fn new(reply: RpcReply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AdminChannel for Scripted {
        async fn call(&self, call: RpcCall) -> Result<RpcReply, ChannelError> {
            self.calls.lock().push(call);
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_create_sends_escaped_params() {
        let channel = Scripted::new(RpcReply::ok(
            CreateResponse { ino: Ino::new(77) }.encode().unwrap(),
        ));
        let store = RemoteStore::new(channel.clone());
        store.initialize("tok-1").await.unwrap();

        let ino = store
            .create(Ino::new(1000), "a b", NodeKind::Directory)
            .await
            .unwrap();
        assert_eq!(ino, Ino::new(77));

        let calls = channel.calls.lock();
        let call = &calls[0];
        assert_eq!(call.token, "tok-1");
        assert_eq!(call.target, "admin");
        assert_eq!(call.method, "create");
        assert_eq!(call.response_len, 4);
        assert_eq!(
            call.params,
            vec![
                ("parent", "1000".to_string()),
                ("name", "%61%20%62".to_string()),
                ("type", "4".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_nonzero_status_is_unknown() {
        let store = RemoteStore::new(Scripted::new(RpcReply::failed(1)));
        let err = store.remove(Ino::new(1000), "x").await.unwrap_err();
        assert!(matches!(err, StoreError::Rpc { method: "remove", code: 1 }));
        assert_eq!(err.status(), crate::store::Status::Unknown);
    }

    #[tokio::test]
    async fn test_lookup_status_means_absent() {
        let store = RemoteStore::new(Scripted::new(RpcReply::failed(1)));
        assert!(store.lookup(Ino::new(1000), "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_error() {
        // A create reply with the wrong width.
        let store = RemoteStore::new(Scripted::new(RpcReply::ok(vec![1, 2])));
        let err = store
            .create(Ino::new(1000), "x", NodeKind::File)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Wire(_)));
    }

    #[tokio::test]
    async fn test_list_yields_owned_nodes() {
        let response = ListResponse {
            entries: vec![
                crate::wire::ListEntry::new("a", Ino::new(5), NodeKind::File),
                crate::wire::ListEntry::new("b", Ino::new(6), NodeKind::Directory),
            ],
        };
        let store = RemoteStore::new(Scripted::new(RpcReply::ok(response.encode().unwrap())));

        let batch = store.list(Ino::new(1000)).await.unwrap();
        assert_eq!(batch.len(), 2);
        let nodes: Vec<Node> = batch.into_iter().collect();
        assert_eq!(nodes[0], Node::new(Ino::new(5), Ino::new(1000), "a", NodeKind::File));
        assert_eq!(nodes[1].parent, Ino::new(1000));
        assert!(nodes[1].is_dir());
    }

    #[tokio::test]
    async fn test_read_truncated_reply_is_short_count() {
        let mut body = ReadResponse::new(vec![b'q'; REMOTE_CONTENT_CAPACITY])
            .encode()
            .unwrap();
        body[0..4].copy_from_slice(&4096u32.to_le_bytes());
        let store = RemoteStore::new(Scripted::new(RpcReply::ok(body)));

        let mut buf = vec![0u8; 8192];
        let n = store.read(Ino::new(1), 0, &mut buf).await.unwrap();
        assert_eq!(n, REMOTE_CONTENT_CAPACITY);
    }

    #[tokio::test]
    async fn test_write_is_read_modify_write() {
        let admin = Arc::new(LoopbackAdmin::default());
        let store = RemoteStore::new(admin.clone());
        let root = store.root_number();
        let ino = store.create(root, "f", NodeKind::File).await.unwrap();

        assert_eq!(store.write(ino, 0, b"hello").await.unwrap(), 5);
        assert_eq!(store.write(ino, 5, b" world").await.unwrap(), 6);
        assert_eq!(admin.store().read_all(ino).await.unwrap(), b"hello world");

        let mut buf = [0u8; 5];
        assert_eq!(store.read(ino, 6, &mut buf).await.unwrap(), 5);
        assert_eq!(&buf, b"world");
    }

    #[tokio::test]
    async fn test_empty_write_makes_no_calls() {
        let channel = Scripted::new(RpcReply::failed(1));
        let store = RemoteStore::new(channel.clone());
        assert_eq!(store.write(Ino::new(1111), 0, b"").await.unwrap(), 0);
        assert!(channel.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_sends_full_content() {
        let admin = Arc::new(LoopbackAdmin::default());
        let store = RemoteStore::new(admin.clone());
        let ino = store
            .create(store.root_number(), "f", NodeKind::File)
            .await
            .unwrap();

        store.write(ino, 0, b"hello world").await.unwrap();
        assert_eq!(store.write(ino, 0, b"J").await.unwrap(), 1);
        assert_eq!(admin.store().read_all(ino).await.unwrap(), b"Jello world");
    }

    #[tokio::test]
    async fn test_write_clamps_to_capacity() {
        let admin = Arc::new(LoopbackAdmin::default());
        let store = RemoteStore::new(admin);
        let ino = store
            .create(store.root_number(), "f", NodeKind::File)
            .await
            .unwrap();

        let data = vec![b'x'; REMOTE_CONTENT_CAPACITY + 10];
        assert_eq!(
            store.write(ino, 0, &data).await.unwrap(),
            REMOTE_CONTENT_CAPACITY
        );
        assert_eq!(
            store.write(ino, REMOTE_CONTENT_CAPACITY as u64, b"y").await.unwrap(),
            0
        );
    }
}
