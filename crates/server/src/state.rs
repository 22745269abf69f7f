//! Application state shared across handlers.

use betus_core::config::AppConfig;
use betus_files::FilesManager;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Upload file-pair manager.
    pub files: Arc<FilesManager>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: AppConfig, files: Arc<FilesManager>) -> Self {
        Self {
            config: Arc::new(config),
            files,
        }
    }
}
