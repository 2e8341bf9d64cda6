//! # linufs-kernel
//!
//! Node store core for the linufs filesystem.
//!
//! A node store hands a filesystem front end a tree of files and directories
//! addressed by numeric identifiers. Two backends exist:
//!
//! - [`LocalStore`] keeps a fixed arena of nodes in process memory
//! - [`RemoteStore`] forwards each operation to the admin service over RPC,
//!   using the packed records and escaping in [`wire`]
//!
//! Both satisfy [`NodeStore`]; the backend is chosen once from
//! [`StoreConfig`] by [`open_store`]. [`PosixAdapter`] turns results into
//! the sentinel conventions VFS glue expects.

pub mod adapter;
pub mod config;
pub mod constants;
pub mod rpc;
pub mod store;
pub mod wire;

pub use adapter::PosixAdapter;
pub use config::{BackendConfig, ChannelConfig, ConfigError, LocalConfig, RemoteConfig, StoreConfig};
pub use rpc::{AdminChannel, ChannelError, LoopbackAdmin, RpcCall, RpcReply};
pub use store::{
    ContentBuffer, Ino, LocalStore, Node, NodeBatch, NodeKind, NodeStore, RemoteStore, Status,
    StoreError, StoreResult, open_store,
};
pub use wire::WireError;
