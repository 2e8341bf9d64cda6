//! In-process node store.
//!
//! All nodes live in a fixed-size table indexed by identifier. Everything
//! is ephemeral and lost when the store is dropped.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::LocalConfig;
use crate::store::content::ContentBuffer;
use crate::store::error::{StoreError, StoreResult};
use crate::store::ops::NodeStore;
use crate::store::types::{Ino, Node, NodeBatch, NodeKind, validate_name};

/// Entries created under the root by `initialize`.
const DEMO_ENTRIES: [(&str, NodeKind); 3] = [
    ("test.txt", NodeKind::File),
    ("test-dir", NodeKind::Directory),
    ("test.cpp", NodeKind::File),
];

/// A bound table slot.
#[derive(Debug)]
struct Slot {
    node: Node,
    /// Present only for regular files.
    content: Option<ContentBuffer>,
}

/// Identifier arena over `[min, max]`.
///
/// Fresh identifiers come from a cursor; removed ones go on a LIFO free
/// list and are handed out again before the cursor advances.
#[derive(Debug)]
struct Arena {
    min: u32,
    max: u32,
    slots: Vec<Option<Slot>>,
    next: u32,
    free: Vec<Ino>,
    seeded: bool,
}

impl Arena {
    fn new(min: u32, max: u32) -> Self {
        let len = (max - min) as usize + 1;
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);
        Self {
            min,
            max,
            slots,
            next: min,
            free: Vec::new(),
            seeded: false,
        }
    }

    fn index(&self, ino: Ino) -> Option<usize> {
        let raw = ino.get();
        (self.min..=self.max)
            .contains(&raw)
            .then(|| (raw - self.min) as usize)
    }

    fn get(&self, ino: Ino) -> Option<&Slot> {
        self.index(ino).and_then(|i| self.slots[i].as_ref())
    }

    fn get_mut(&mut self, ino: Ino) -> Option<&mut Slot> {
        self.index(ino).and_then(|i| self.slots[i].as_mut())
    }

    fn allocate(&mut self) -> Option<Ino> {
        if let Some(ino) = self.free.pop() {
            return Some(ino);
        }
        if self.next > self.max {
            return None;
        }
        let ino = Ino::new(self.next);
        self.next += 1;
        Some(ino)
    }

    fn release(&mut self, ino: Ino) -> Option<Slot> {
        let index = self.index(ino)?;
        let slot = self.slots[index].take()?;
        self.free.push(ino);
        Some(slot)
    }

    fn live(&self) -> impl Iterator<Item = &Slot> {
        // Slots at or past the cursor have never been bound.
        let end = (self.next - self.min) as usize;
        self.slots[..end].iter().flatten()
    }

    fn find_child(&self, parent: Ino, name: &str) -> Option<&Slot> {
        self.live()
            .find(|s| s.node.parent == parent && s.node.name == name)
    }

    fn has_children(&self, directory: Ino) -> bool {
        self.live().any(|s| s.node.parent == directory)
    }

    fn live_count(&self) -> usize {
        self.live().count()
    }
}

/// In-memory node store.
///
/// Thread-safe via one internal `Mutex`: every operation, including the
/// allocate-populate-advance sequence of `create`, runs as a single
/// critical section.
#[derive(Debug)]
pub struct LocalStore {
    root: Ino,
    capacity: usize,
    seed_demo: bool,
    arena: Mutex<Arena>,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore {
    /// Create a store with the default identifier space.
    pub fn new() -> Self {
        let config = LocalConfig::default();
        Self::build_unchecked(&config)
    }

    /// Create a store from explicit settings.
    pub fn with_config(config: &LocalConfig) -> StoreResult<Self> {
        config
            .validate()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self::build_unchecked(config))
    }

    pub(crate) fn build_unchecked(config: &LocalConfig) -> Self {
        Self {
            root: Ino::new(config.root),
            capacity: config.content_capacity,
            seed_demo: config.seed_demo,
            arena: Mutex::new(Arena::new(config.ino_min, config.ino_max)),
        }
    }

    /// Content capacity of every regular file in this store.
    pub fn content_capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live nodes, root excluded.
    pub fn len(&self) -> usize {
        self.arena.lock().live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the whole content of file `ino` with `data`.
    ///
    /// Unlike `write`, this can shrink the file. Returns the bytes kept.
    pub fn replace_content(&self, ino: Ino, data: &[u8]) -> StoreResult<usize> {
        let mut arena = self.arena.lock();
        let content = Self::content_mut(&mut arena, ino)?;
        let kept = content.replace(data);
        debug!(%ino, requested = data.len(), kept, "replaced content");
        Ok(kept)
    }

    /// Snapshot of the node bound to `ino`, if any.
    pub fn node(&self, ino: Ino) -> Option<Node> {
        self.arena.lock().get(ino).map(|s| s.node.clone())
    }

    /// Check that `ino` names a directory.
    fn ensure_directory(&self, arena: &Arena, ino: Ino) -> StoreResult<()> {
        if ino == self.root {
            return Ok(());
        }
        match arena.get(ino) {
            Some(slot) if slot.node.is_dir() => Ok(()),
            Some(_) => Err(StoreError::not_a_directory(ino.to_string())),
            None => Err(StoreError::not_found(format!("directory {ino}"))),
        }
    }

    fn create_locked(
        &self,
        arena: &mut Arena,
        parent: Ino,
        name: &str,
        kind: NodeKind,
    ) -> StoreResult<Ino> {
        validate_name(name)?;
        self.ensure_directory(arena, parent)?;
        if arena.find_child(parent, name).is_some() {
            return Err(StoreError::already_exists(format!("{name} in {parent}")));
        }

        let number = arena.allocate().ok_or(StoreError::Exhausted)?;
        let content = kind
            .is_file()
            .then(|| ContentBuffer::with_capacity(self.capacity));
        let index = arena
            .index(number)
            .ok_or_else(|| StoreError::other(format!("allocated {number} outside arena")))?;
        arena.slots[index] = Some(Slot {
            node: Node::new(number, parent, name, kind),
            content,
        });
        Ok(number)
    }

    fn content(arena: &Arena, ino: Ino) -> StoreResult<&ContentBuffer> {
        let slot = arena
            .get(ino)
            .ok_or_else(|| StoreError::not_found(format!("inode {ino}")))?;
        slot.content
            .as_ref()
            .ok_or_else(|| StoreError::is_a_directory(ino.to_string()))
    }

    fn content_mut(arena: &mut Arena, ino: Ino) -> StoreResult<&mut ContentBuffer> {
        let slot = arena
            .get_mut(ino)
            .ok_or_else(|| StoreError::not_found(format!("inode {ino}")))?;
        slot.content
            .as_mut()
            .ok_or_else(|| StoreError::is_a_directory(ino.to_string()))
    }
}

#[async_trait]
impl NodeStore for LocalStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn initialize(&self, _token: &str) -> StoreResult<()> {
        let mut arena = self.arena.lock();
        if arena.seeded {
            debug!("local store already initialized");
            return Ok(());
        }
        arena.seeded = true;

        if !self.seed_demo {
            info!("local store initialized (no demo entries)");
            return Ok(());
        }
        for (name, kind) in DEMO_ENTRIES {
            // A name left over from earlier use of the store wins.
            if arena.find_child(self.root, name).is_some() {
                continue;
            }
            self.create_locked(&mut arena, self.root, name, kind)?;
        }
        info!(root = %self.root, "local store initialized with demo entries");
        Ok(())
    }

    fn root_number(&self) -> Ino {
        self.root
    }

    async fn create(&self, parent: Ino, name: &str, kind: NodeKind) -> StoreResult<Ino> {
        let mut arena = self.arena.lock();
        let number = self.create_locked(&mut arena, parent, name, kind)?;
        debug!(%parent, entry = name, %kind, %number, "created node");
        Ok(number)
    }

    async fn remove(&self, parent: Ino, name: &str) -> StoreResult<()> {
        let mut arena = self.arena.lock();

        let (number, is_dir) = arena
            .find_child(parent, name)
            .map(|s| (s.node.number, s.node.is_dir()))
            .ok_or_else(|| StoreError::not_found(format!("{name} in {parent}")))?;

        // The root is never a child, so it can never be resolved here.
        if is_dir && arena.has_children(number) {
            return Err(StoreError::directory_not_empty(name));
        }

        // Dropping the slot frees its content buffer.
        arena.release(number);
        debug!(%parent, entry = name, %number, "removed node");
        Ok(())
    }

    async fn lookup(&self, parent: Ino, name: &str) -> StoreResult<Option<Node>> {
        let arena = self.arena.lock();
        Ok(arena.find_child(parent, name).map(|s| s.node.clone()))
    }

    async fn list(&self, directory: Ino) -> StoreResult<NodeBatch> {
        let arena = self.arena.lock();
        self.ensure_directory(&arena, directory)?;

        let nodes: Vec<Node> = arena
            .live()
            .filter(|s| s.node.parent == directory)
            .map(|s| s.node.clone())
            .collect();
        debug!(%directory, count = nodes.len(), "listed directory");
        Ok(NodeBatch::new(directory, nodes))
    }

    async fn read(&self, ino: Ino, offset: u64, buf: &mut [u8]) -> StoreResult<usize> {
        let arena = self.arena.lock();
        let content = Self::content(&arena, ino)?;
        Ok(content.read(offset, buf))
    }

    async fn write(&self, ino: Ino, offset: u64, data: &[u8]) -> StoreResult<usize> {
        let mut arena = self.arena.lock();
        let content = Self::content_mut(&mut arena, ino)?;
        let written = content.write(offset, data);
        debug!(%ino, offset, requested = data.len(), written, "wrote content");
        Ok(written)
    }
}
