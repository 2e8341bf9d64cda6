//! POSIX-convention adapter.
//!
//! Kernel-style VFS glue expects sentinel results rather than `Result`:
//! identifier 0 for a failed create, a [`Status`] code for removal, an
//! empty batch for a failed listing, and `-1` for failed reads and writes.
//! [`PosixAdapter`] wraps any [`NodeStore`] and translates.

use tracing::debug;

use crate::store::{Ino, Node, NodeBatch, NodeKind, NodeStore, Status};

/// Sentinel-returning view of a node store.
#[derive(Debug)]
pub struct PosixAdapter<S> {
    store: S,
}

impl<S: NodeStore> PosixAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub async fn initialize(&self, token: &str) -> Status {
        Status::from(&self.store.initialize(token).await)
    }

    pub fn root_number(&self) -> Ino {
        self.store.root_number()
    }

    /// Returns [`Ino::INVALID`] on failure.
    pub async fn create(&self, parent: Ino, name: &str, kind: NodeKind) -> Ino {
        match self.store.create(parent, name, kind).await {
            Ok(ino) => ino,
            Err(e) => {
                debug!(%parent, entry = name, error = %e, "create failed");
                Ino::INVALID
            }
        }
    }

    pub async fn remove(&self, parent: Ino, name: &str) -> Status {
        Status::from(&self.store.remove(parent, name).await)
    }

    /// Errors and absence both read as `None`.
    pub async fn lookup(&self, parent: Ino, name: &str) -> Option<Node> {
        self.store.lookup(parent, name).await.ok().flatten()
    }

    /// Returns an empty batch on failure.
    pub async fn list(&self, directory: Ino) -> NodeBatch {
        match self.store.list(directory).await {
            Ok(batch) => batch,
            Err(e) => {
                debug!(%directory, error = %e, "list failed");
                NodeBatch::empty(directory)
            }
        }
    }

    /// Read into `buf` at `*offset`, advancing it by the count.
    ///
    /// Returns the count, or -1 on failure with `*offset` untouched.
    pub async fn read(&self, ino: Ino, buf: &mut [u8], offset: &mut u64) -> isize {
        match self.store.read(ino, *offset, buf).await {
            Ok(n) => Self::advance(offset, n),
            Err(e) => {
                debug!(%ino, error = %e, "read failed");
                -1
            }
        }
    }

    /// Write `data` at `*offset`, advancing it by the count.
    ///
    /// Returns the count, or -1 on failure with `*offset` untouched.
    pub async fn write(&self, ino: Ino, data: &[u8], offset: &mut u64) -> isize {
        match self.store.write(ino, *offset, data).await {
            Ok(n) => Self::advance(offset, n),
            Err(e) => {
                debug!(%ino, error = %e, "write failed");
                -1
            }
        }
    }

    fn advance(offset: &mut u64, n: usize) -> isize {
        *offset += n as u64;
        isize::try_from(n).unwrap_or(isize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocalConfig;
    use crate::store::LocalStore;

    fn adapter() -> PosixAdapter<LocalStore> {
        let config = LocalConfig {
            seed_demo: false,
            ..LocalConfig::default()
        };
        PosixAdapter::new(LocalStore::with_config(&config).unwrap())
    }

    #[tokio::test]
    async fn test_create_sentinel() {
        let fs = adapter();
        let root = fs.root_number();
        assert!(fs.create(root, "a", NodeKind::File).await.is_valid());
        assert_eq!(fs.create(root, "a", NodeKind::File).await, Ino::INVALID);
        assert_eq!(fs.create(Ino::new(7), "b", NodeKind::File).await, Ino::INVALID);
    }

    #[tokio::test]
    async fn test_remove_status() {
        let fs = adapter();
        let root = fs.root_number();
        fs.create(root, "a", NodeKind::File).await;
        assert_eq!(fs.remove(root, "a").await, Status::Ok);
        assert_eq!(fs.remove(root, "a").await, Status::NotFound);
    }

    #[tokio::test]
    async fn test_list_failure_is_empty() {
        let fs = adapter();
        let batch = fs.list(Ino::new(1999)).await;
        assert!(batch.is_empty());
        assert_eq!(batch.directory(), Ino::new(1999));
    }

    #[tokio::test]
    async fn test_read_write_advance_offset() {
        let fs = adapter();
        let ino = fs.create(fs.root_number(), "f", NodeKind::File).await;

        let mut pos = 0u64;
        assert_eq!(fs.write(ino, b"abc", &mut pos).await, 3);
        assert_eq!(fs.write(ino, b"def", &mut pos).await, 3);
        assert_eq!(pos, 6);

        let mut pos = 2u64;
        let mut buf = [0u8; 16];
        assert_eq!(fs.read(ino, &mut buf, &mut pos).await, 4);
        assert_eq!(&buf[..4], b"cdef");
        assert_eq!(pos, 6);
        assert_eq!(fs.read(ino, &mut buf, &mut pos).await, 0);
    }

    #[tokio::test]
    async fn test_read_failure_leaves_offset() {
        let fs = adapter();
        let dir = fs.create(fs.root_number(), "d", NodeKind::Directory).await;
        let mut pos = 5u64;
        let mut buf = [0u8; 4];
        assert_eq!(fs.read(dir, &mut buf, &mut pos).await, -1);
        assert_eq!(fs.write(Ino::new(1234), b"x", &mut pos).await, -1);
        assert_eq!(pos, 5);
    }

    #[tokio::test]
    async fn test_initialize_status() {
        let fs = adapter();
        assert_eq!(fs.initialize("").await, Status::Ok);
        assert!(fs.lookup(fs.root_number(), "test.txt").await.is_none());
    }
}
