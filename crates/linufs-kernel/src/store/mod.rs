//! Node store abstraction.
//!
//! This module provides the identifier-based store the filesystem front end
//! talks to. Key components:
//!
//! - [`NodeStore`] - Core trait for node operations
//! - [`LocalStore`] - In-process fixed arena of nodes
//! - [`RemoteStore`] - Proxy to the admin service over RPC
//! - [`ContentBuffer`] - Bounded byte store behind every regular file
//!
//! ## Design Decisions
//!
//! - **Identifiers, no paths**: Operations take a parent identifier and a
//!   single name. Path walking belongs to the caller.
//! - **Explicit offset**: Read/write take an offset and a caller buffer, so
//!   no handle state lives in the store.
//! - **Owned snapshots**: Lookup and list hand out owned [`Node`] copies;
//!   nothing returned aliases the store's table.
//! - **One backend per process**: [`open_store`] is called once at startup.

pub mod backends;
mod content;
mod error;
mod ops;
mod types;

pub use backends::{LocalStore, RemoteStore, open_store};
pub use content::ContentBuffer;
pub use error::{Status, StoreError, StoreResult};
pub use ops::NodeStore;
pub use types::{Ino, Node, NodeBatch, NodeKind};
