//! Application state.

use std::sync::Arc;

use reelcast_media::RenditionEngine;
use reelcast_store::MediaStore;

use crate::config::ApiConfig;

/// Shared application state, constructed once at startup and handed to
/// every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<MediaStore>,
    pub engine: Arc<RenditionEngine>,
}

impl AppState {
    /// Create new application state and prepare the store directories.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let store = MediaStore::new(&config.upload_root);
        store.init().await?;

        let engine = match config.render_timeout_secs {
            Some(secs) => RenditionEngine::with_timeout(secs),
            None => RenditionEngine::new(),
        };

        Ok(Self {
            config,
            store: Arc::new(store),
            engine: Arc::new(engine),
        })
    }
}
