use std::sync::Arc;

use crate::services::{metadata::MovieMetadata, session_manager::SessionManager};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub metadata: Arc<MovieMetadata>,
}

impl AppState {
    /// Creates the state around a session manager and optional display metadata
    pub fn new(sessions: SessionManager, metadata: MovieMetadata) -> Self {
        Self {
            sessions: Arc::new(sessions),
            metadata: Arc::new(metadata),
        }
    }
}
