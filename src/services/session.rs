//! Session controller
//!
//! A [`Session`] is the aggregate owning one user's preference vector, exclusion set and
//! watchlist. It moves through `ColdStart -> Interactive -> Ended`:
//!
//! - cold start shows randomly sampled items, since the user vector carries no signal yet
//! - each feedback event updates the user vector, then the next item is taken from the
//!   cold-start queue or, once that is drained, from the similarity ranking
//! - ending (explicitly or because the catalog ran out) computes a final batch and freezes
//!   the session

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ExclusionSet, FeedbackEvent, ItemId, SessionPhase, SessionSnapshot, SessionSummary, Watchlist,
};
use crate::services::catalog::{Catalog, UnknownItemError};
use crate::services::preference::{DegenerateVectorError, PreferenceTracker};
use crate::services::selector::{select_batch, select_next, NoCandidatesError};

/// What to do when a feedback update collapses the user vector to zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Discard the update and keep the previous user vector
    #[default]
    KeepPrevious,
    /// Replace the user vector with the vector of a random catalog item
    Reseed,
}

/// Per-session constants
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cold_start_count: usize,
    pub final_batch_size: usize,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cold_start_count: 10,
            final_batch_size: 10,
            degenerate_policy: DegeneratePolicy::KeepPrevious,
        }
    }
}

/// Error types for session operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session has ended")]
    Ended,

    #[error("Item {item_id} is not the item currently displayed")]
    NotDisplayed {
        item_id: ItemId,
        current: Option<ItemId>,
    },

    #[error(transparent)]
    UnknownItem(#[from] UnknownItemError),
}

/// Result of a processed feedback event
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackOutcome {
    /// The next item to display
    Next {
        item: ItemId,
        /// False when the update was degenerate and the recovery policy kicked in
        feedback_applied: bool,
    },
    /// The catalog is exhausted; the session is over
    Ended(SessionSummary),
}

/// One user's recommendation session
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    phase: SessionPhase,
    tracker: PreferenceTracker,
    exclusion: ExclusionSet,
    watchlist: Watchlist,
    queue: VecDeque<ItemId>,
    current: Option<ItemId>,
    shown_count: usize,
    settings: SessionSettings,
    rng: StdRng,
    created_at: DateTime<Utc>,
    summary: Option<SessionSummary>,
}

impl Session {
    /// Starts a session by sampling distinct random items for the cold start
    ///
    /// Sampled items are excluded immediately so the ranking can never return them.
    pub fn start(catalog: &Catalog, settings: SessionSettings, mut rng: StdRng) -> Self {
        let count = settings.cold_start_count.min(catalog.len());
        if count < settings.cold_start_count {
            tracing::warn!(
                requested = settings.cold_start_count,
                available = catalog.len(),
                "Cold start capped at catalog size"
            );
        }

        let mut exclusion = ExclusionSet::new();
        let mut queue = VecDeque::with_capacity(count);
        let mut sampled = HashSet::with_capacity(count);

        while queue.len() < count {
            // Resample on collision
            let position = rng.gen_range(0..catalog.len());
            if !sampled.insert(position) {
                continue;
            }
            if let Some((id, _)) = catalog.entry_at(position) {
                exclusion.insert(id);
                queue.push_back(id);
            }
        }

        let mut session = Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::ColdStart,
            tracker: PreferenceTracker::new(catalog.dimension()),
            exclusion,
            watchlist: Watchlist::new(),
            queue,
            current: None,
            shown_count: 0,
            settings,
            rng,
            created_at: Utc::now(),
            summary: None,
        };

        if session.advance(catalog).is_err() {
            // Only reachable with an empty catalog, which loading rejects
            session.finish(catalog, true);
        }

        tracing::info!(
            session_id = %session.id,
            cold_start = count,
            "Session started"
        );

        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Item awaiting feedback, if the session is still running
    pub fn current(&self) -> Option<ItemId> {
        self.current
    }

    /// Currently displayed item followed by the queued ones
    pub fn display_queue(&self) -> Vec<ItemId> {
        self.current.iter().chain(self.queue.iter()).copied().collect()
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn exclusion(&self) -> &ExclusionSet {
        &self.exclusion
    }

    pub fn tracker(&self) -> &PreferenceTracker {
        &self.tracker
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Consumes the feedback for the displayed item and moves on to the next one
    ///
    /// A catalog running out during the refill ends the session normally.
    pub fn submit_feedback(
        &mut self,
        catalog: &Catalog,
        event: FeedbackEvent,
    ) -> Result<FeedbackOutcome, SessionError> {
        if self.phase == SessionPhase::Ended {
            return Err(SessionError::Ended);
        }
        if self.current != Some(event.item_id) {
            return Err(SessionError::NotDisplayed {
                item_id: event.item_id,
                current: self.current,
            });
        }

        let item_vector = catalog.lookup(event.item_id)?;

        let feedback_applied = match self.tracker.apply_feedback(item_vector, event.liked) {
            Ok(updated) => {
                self.tracker.commit(updated);
                true
            }
            Err(DegenerateVectorError) => {
                self.recover_degenerate(catalog, event.item_id);
                false
            }
        };

        if event.save_to_watchlist {
            self.watchlist.push(event.item_id);
        }

        tracing::debug!(
            session_id = %self.id,
            item_id = %event.item_id,
            liked = event.liked,
            saved = event.save_to_watchlist,
            feedback_applied,
            "Feedback processed"
        );

        match self.advance(catalog) {
            Ok(item) => Ok(FeedbackOutcome::Next {
                item,
                feedback_applied,
            }),
            Err(NoCandidatesError) => Ok(FeedbackOutcome::Ended(self.finish(catalog, true))),
        }
    }

    /// Ends the session and returns its summary. Calling it again returns the same summary.
    pub fn end(&mut self, catalog: &Catalog) -> SessionSummary {
        match &self.summary {
            Some(summary) => summary.clone(),
            None => self.finish(catalog, false),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            phase: self.phase,
            current: self.current,
            display_queue: self.display_queue(),
            watchlist: self.watchlist.items().to_vec(),
            shown_count: self.shown_count,
            feedback_count: self.tracker.feedback_count(),
            created_at: self.created_at,
        }
    }

    /// Displays the next queued item, or ranks the catalog once the queue is empty
    fn advance(&mut self, catalog: &Catalog) -> Result<ItemId, NoCandidatesError> {
        let next = match self.queue.pop_front() {
            Some(id) => id,
            None => {
                let id = select_next(self.tracker.current(), &mut self.exclusion, catalog)?;
                self.phase = SessionPhase::Interactive;
                id
            }
        };

        self.current = Some(next);
        self.shown_count += 1;
        Ok(next)
    }

    fn recover_degenerate(&mut self, catalog: &Catalog, item_id: ItemId) {
        match self.settings.degenerate_policy {
            DegeneratePolicy::KeepPrevious => {
                tracing::warn!(
                    session_id = %self.id,
                    item_id = %item_id,
                    "Degenerate feedback update ignored, keeping previous user vector"
                );
            }
            DegeneratePolicy::Reseed => {
                let position = self.rng.gen_range(0..catalog.len());
                if let Some((seed_id, vector)) = catalog.entry_at(position) {
                    self.tracker.reseed(vector.clone());
                    tracing::warn!(
                        session_id = %self.id,
                        item_id = %item_id,
                        seed_item = %seed_id,
                        "Degenerate feedback update, user vector reseeded"
                    );
                }
            }
        }
    }

    fn finish(&mut self, catalog: &Catalog, exhausted: bool) -> SessionSummary {
        let batch = select_batch(
            self.tracker.current(),
            &mut self.exclusion,
            catalog,
            self.settings.final_batch_size,
        );

        let summary = SessionSummary {
            watchlist: self.watchlist.items().to_vec(),
            final_recommendations: batch.items,
            catalog_exhausted: exhausted || batch.exhausted,
        };

        self.phase = SessionPhase::Ended;
        self.current = None;
        self.queue.clear();
        self.summary = Some(summary.clone());

        tracing::info!(
            session_id = %self.id,
            shown = self.shown_count,
            feedback = self.tracker.feedback_count(),
            watchlist = summary.watchlist.len(),
            recommendations = summary.final_recommendations.len(),
            catalog_exhausted = summary.catalog_exhausted,
            "Session ended"
        );

        summary
    }
}
