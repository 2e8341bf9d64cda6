//! Node store backends.
//!
//! Backends implement [`NodeStore`] for different storage types.

mod local;
mod remote;

use std::sync::Arc;

use tracing::info;

pub use local::LocalStore;
pub use remote::RemoteStore;

use crate::config::{BackendConfig, ChannelConfig, StoreConfig};
use crate::rpc::{AdminChannel, LoopbackAdmin};
use crate::store::{NodeStore, StoreError, StoreResult};

/// Build the backend named by `config`.
///
/// The store is not initialized; callers hand it the token afterwards.
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn NodeStore>> {
    config
        .validate()
        .map_err(|e| StoreError::Config(e.to_string()))?;

    let store: Arc<dyn NodeStore> = match &config.backend {
        BackendConfig::Local(local) => Arc::new(LocalStore::with_config(local)?),
        BackendConfig::Remote(remote) => {
            let channel: Arc<dyn AdminChannel> = match remote.channel {
                ChannelConfig::Loopback => Arc::new(LoopbackAdmin::new(remote.root)?),
            };
            Arc::new(RemoteStore::with_channel(remote, channel)?)
        }
    };
    info!(backend = store.kind(), root = %store.root_number(), "opened node store");
    Ok(store)
}
