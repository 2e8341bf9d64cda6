//! Node store operations trait.
//!
//! The capability set every backend satisfies. Operations address nodes by
//! identifier and `(parent, name)`; there are no paths at this layer.

use async_trait::async_trait;

use super::types::{Ino, Node, NodeBatch, NodeKind};
use super::StoreResult;

/// Core node store trait.
///
/// Every call completes before returning. Implementations must tolerate
/// concurrent calls for different (or the same) nodes from many tasks.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Backend name, for logs.
    fn kind(&self) -> &'static str;

    /// One-time process setup.
    ///
    /// `token` is an opaque credential; backends that need none ignore it.
    /// Calling this more than once must not duplicate side effects.
    async fn initialize(&self, token: &str) -> StoreResult<()>;

    /// The reserved root directory identifier.
    fn root_number(&self) -> Ino;

    // ========================================================================
    // Namespace
    // ========================================================================

    /// Create a node named `name` under `parent` and return its identifier.
    async fn create(&self, parent: Ino, name: &str, kind: NodeKind) -> StoreResult<Ino>;

    /// Remove the node named `name` under `parent`.
    async fn remove(&self, parent: Ino, name: &str) -> StoreResult<()>;

    /// Find the node named `name` under `parent`.
    async fn lookup(&self, parent: Ino, name: &str) -> StoreResult<Option<Node>>;

    /// Snapshot the children of `directory`. Order is unspecified.
    async fn list(&self, directory: Ino) -> StoreResult<NodeBatch>;

    // ========================================================================
    // Content
    // ========================================================================

    /// Read up to `buf.len()` bytes at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied; 0 at or past the end.
    async fn read(&self, ino: Ino, offset: u64, buf: &mut [u8]) -> StoreResult<usize>;

    /// Write `data` at `offset`.
    ///
    /// Returns the number of bytes committed; short when the content
    /// capacity is reached, 0 when `offset` is at or past it.
    async fn write(&self, ino: Ino, offset: u64, data: &[u8]) -> StoreResult<usize>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if `name` exists under `parent`.
    async fn exists(&self, parent: Ino, name: &str) -> bool {
        matches!(self.lookup(parent, name).await, Ok(Some(_)))
    }

    /// Read the whole content of a file.
    async fn read_all(&self, ino: Ino) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; 256];
        loop {
            let n = self.read(ino, out.len() as u64, &mut chunk).await?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }
}
