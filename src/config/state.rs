// Application state module
// Shared by every connection task

use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::types::Config;
use crate::store::FileStore;

/// Header map of a single request, lower-case names
pub type HeaderSnapshot = BTreeMap<String, String>;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: FileStore,
    /// Headers of the most recent PUT, served back on `/last_put_headers`
    pub last_put_headers: RwLock<HeaderSnapshot>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: FileStore::new(
                config.storage.uploads_dir.clone(),
                config.storage.create_parent_dirs,
            ),
            last_put_headers: RwLock::new(BTreeMap::new()),
        }
    }
}
