use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{FeedbackEvent, ItemId, MovieDetails, SessionPhase, SessionSnapshot, SessionSummary},
    services::{metadata::MovieMetadata, session::FeedbackOutcome},
};

use super::extract::{AppJson, AppPath};
use super::AppState;

// Request/Response types

/// An item id, with display metadata when it is available
#[derive(Debug, Serialize)]
pub struct MovieView {
    pub id: ItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MovieDetails>,
}

impl MovieView {
    fn new(id: ItemId, metadata: &MovieMetadata) -> Self {
        Self {
            id,
            details: metadata.get(id).cloned(),
        }
    }

    fn list(ids: &[ItemId], metadata: &MovieMetadata) -> Vec<Self> {
        ids.iter().map(|id| Self::new(*id, metadata)).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub current: Option<MovieView>,
    pub display_queue: Vec<MovieView>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub watchlist: Vec<MovieView>,
    pub final_recommendations: Vec<MovieView>,
    pub catalog_exhausted: bool,
}

impl SummaryResponse {
    fn new(summary: &SessionSummary, metadata: &MovieMetadata) -> Self {
        Self {
            watchlist: MovieView::list(&summary.watchlist, metadata),
            final_recommendations: MovieView::list(&summary.final_recommendations, metadata),
            catalog_exhausted: summary.catalog_exhausted,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackResponse {
    Next {
        next: MovieView,
        feedback_applied: bool,
    },
    Ended {
        summary: SummaryResponse,
    },
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Start a session and return the cold-start display queue
pub async fn start_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<(StatusCode, Json<StartSessionResponse>)> {
    let snapshot = state.sessions.start().await?;

    tracing::info!(
        request_id = %request_id,
        session_id = %snapshot.session_id,
        queued = snapshot.display_queue.len(),
        "Session created"
    );

    let response = StartSessionResponse {
        session_id: snapshot.session_id,
        phase: snapshot.phase,
        current: snapshot.current.map(|id| MovieView::new(id, &state.metadata)),
        display_queue: MovieView::list(&snapshot.display_queue, &state.metadata),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get the current state of a session
pub async fn get_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<SessionSnapshot>> {
    let snapshot = state.sessions.status(id).await?;
    Ok(Json(snapshot))
}

/// Submit like/dislike feedback for the displayed item
pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath(id): AppPath<Uuid>,
    AppJson(event): AppJson<FeedbackEvent>,
) -> AppResult<Json<FeedbackResponse>> {
    let outcome = state.sessions.submit_feedback(id, event).await?;

    let response = match outcome {
        FeedbackOutcome::Next {
            item,
            feedback_applied,
        } => FeedbackResponse::Next {
            next: MovieView::new(item, &state.metadata),
            feedback_applied,
        },
        FeedbackOutcome::Ended(summary) => {
            tracing::info!(
                request_id = %request_id,
                session_id = %id,
                "Catalog exhausted, session ended"
            );
            FeedbackResponse::Ended {
                summary: SummaryResponse::new(&summary, &state.metadata),
            }
        }
    };

    Ok(Json(response))
}

/// End a session and return the watchlist and final recommendations
pub async fn end_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<SummaryResponse>> {
    let summary = state.sessions.end(id).await?;

    tracing::info!(
        request_id = %request_id,
        session_id = %id,
        recommendations = summary.final_recommendations.len(),
        "Session summary returned"
    );

    Ok(Json(SummaryResponse::new(&summary, &state.metadata)))
}

/// Discard a session
pub async fn discard_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    state.sessions.discard(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get display metadata for a catalog item
pub async fn get_movie(
    State(state): State<AppState>,
    AppPath(id): AppPath<u32>,
) -> AppResult<Json<MovieDetails>> {
    let id = ItemId(id);
    if !state.sessions.catalog().contains(id) {
        return Err(AppError::NotFound(format!("Item {} is not in the catalog", id)));
    }

    state
        .metadata
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No metadata for item {}", id)))
}
