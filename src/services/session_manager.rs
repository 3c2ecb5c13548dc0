use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{FeedbackEvent, SessionSnapshot, SessionSummary},
    services::{
        catalog::Catalog,
        session::{FeedbackOutcome, Session, SessionSettings},
        session_store::{SessionHandle, SessionStore},
    },
};

/// Entry point for the session operations exposed to clients
///
/// Shares one immutable catalog across all sessions and keeps every session's state in
/// the configured [`SessionStore`].
pub struct SessionManager {
    catalog: Arc<Catalog>,
    store: Arc<dyn SessionStore>,
    settings: SessionSettings,
    rng_seed: Option<u64>,
    max_sessions: Option<usize>,
    started: AtomicU64,
}

impl SessionManager {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn SessionStore>, settings: SessionSettings) -> Self {
        Self {
            catalog,
            store,
            settings,
            rng_seed: None,
            max_sessions: None,
            started: AtomicU64::new(0),
        }
    }

    /// Makes cold-start sampling reproducible: session n uses `seed + n`
    pub fn with_rng_seed(mut self, seed: Option<u64>) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: Option<usize>) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Starts a session and returns its initial display queue
    pub async fn start(&self) -> AppResult<SessionSnapshot> {
        let session = Session::start(&self.catalog, self.settings.clone(), self.next_rng());
        let snapshot = session.snapshot();

        if let Err(e) = self.store.insert(session, self.max_sessions).await {
            tracing::warn!(max = e.max, "Session limit reached");
            return Err(AppError::Unavailable(e.to_string()));
        }

        Ok(snapshot)
    }

    pub async fn status(&self, id: Uuid) -> AppResult<SessionSnapshot> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    /// Applies one feedback event and returns the next item or the end-of-session summary
    pub async fn submit_feedback(&self, id: Uuid, event: FeedbackEvent) -> AppResult<FeedbackOutcome> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        let outcome = session.submit_feedback(&self.catalog, event)?;
        Ok(outcome)
    }

    /// Ends the session; repeated calls return the same summary
    pub async fn end(&self, id: Uuid) -> AppResult<SessionSummary> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        Ok(session.end(&self.catalog))
    }

    /// Forgets a session entirely
    pub async fn discard(&self, id: Uuid) -> AppResult<()> {
        if self.store.remove(id).await {
            tracing::info!(session_id = %id, "Session discarded");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Session {} not found", id)))
        }
    }

    async fn handle(&self, id: Uuid) -> AppResult<SessionHandle> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    fn next_rng(&self) -> StdRng {
        let ordinal = self.started.fetch_add(1, Ordering::Relaxed);
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(ordinal)),
            None => StdRng::from_entropy(),
        }
    }
}
