use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ItemId;

/// Lifecycle phase of a recommendation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Showing randomly sampled items, no preference signal yet
    ColdStart,
    /// Showing items ranked by similarity to the user vector
    Interactive,
    /// Terminal; the summary is frozen
    Ended,
}

/// Final report handed back when a session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub watchlist: Vec<ItemId>,
    pub final_recommendations: Vec<ItemId>,
    /// True when the catalog ran out of unseen items
    pub catalog_exhausted: bool,
}

/// Read-only view of a session's state
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub current: Option<ItemId>,
    pub display_queue: Vec<ItemId>,
    pub watchlist: Vec<ItemId>,
    pub shown_count: usize,
    pub feedback_count: usize,
    pub created_at: DateTime<Utc>,
}
