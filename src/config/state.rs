// Application state module
// Everything a request handler can reach, built once by the entry point

use std::time::Duration;

use super::types::Config;
use crate::middleware::FlashStore;
use crate::store::SharedStore;
use crate::views::Views;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub views: Views,
    pub flash: FlashStore,
}

impl AppState {
    pub fn new(config: &Config, store: SharedStore, views: Views) -> Self {
        Self {
            config: config.clone(),
            store,
            views,
            flash: FlashStore::new(Duration::from_secs(config.session.flash_ttl_secs)),
        }
    }
}
