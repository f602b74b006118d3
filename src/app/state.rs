//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::relay::GameRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub games: Arc<GameRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            games: Arc::new(GameRegistry::new()),
        }
    }
}
