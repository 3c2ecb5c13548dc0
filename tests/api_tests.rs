use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use reelmatch_api::api::{create_router, AppState};
use reelmatch_api::services::{
    Catalog, CatalogOptions, InMemorySessionStore, MovieMetadata, SessionManager, SessionSettings,
};

/// Catalog of `n` one-hot vectors in the offline pipeline's file format
fn catalog_csv(n: usize) -> String {
    let mut csv = String::from("movie_id;normalized_vector\n");
    for i in 0..n {
        let components: Vec<&str> = (0..n).map(|j| if i == j { "1.0" } else { "0.0" }).collect();
        csv.push_str(&format!("{};{}\n", i + 1, components.join(",")));
    }
    csv
}

fn metadata_csv() -> &'static str {
    "ID;Title;Year;IMDb;Duration;Director;Actor;Genre;Keywords\n\
     1;Alien;1979;8.5;117;Ridley Scott;Sigourney Weaver;Horror|Sci-Fi;space|android\n\
     2;Heat;1995;8.3;170;Michael Mann;Al Pacino;Crime;heist\n"
}

fn create_test_server_with(items: usize, max_sessions: Option<usize>) -> TestServer {
    let catalog = Catalog::from_reader(catalog_csv(items).as_bytes(), &CatalogOptions::default())
        .unwrap();
    let metadata = MovieMetadata::from_reader(metadata_csv().as_bytes()).unwrap();
    let sessions = SessionManager::new(
        Arc::new(catalog),
        Arc::new(InMemorySessionStore::new()),
        SessionSettings::default(),
    )
    .with_rng_seed(Some(11))
    .with_max_sessions(max_sessions);

    let app = create_router(AppState::new(sessions, metadata));
    TestServer::new(app).unwrap()
}

fn create_test_server() -> TestServer {
    create_test_server_with(40, None)
}

async fn start(server: &TestServer) -> Value {
    let response = server.post("/api/v1/sessions").await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

fn item_ids(values: &Value) -> Vec<u64> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_start_session_returns_cold_start_queue() {
    let server = create_test_server();
    let session = start(&server).await;

    assert_eq!(session["phase"], "cold_start");
    let queue = item_ids(&session["display_queue"]);
    assert_eq!(queue.len(), 10);
    let distinct: HashSet<u64> = queue.iter().copied().collect();
    assert_eq!(distinct.len(), 10);
    assert!(queue.iter().all(|id| (1..=40).contains(id)));
    assert_eq!(session["current"]["id"].as_u64().unwrap(), queue[0]);
}

#[tokio::test]
async fn test_feedback_for_wrong_item_conflicts() {
    let server = create_test_server();
    let session = start(&server).await;
    let id = session["session_id"].as_str().unwrap();
    let queue = item_ids(&session["display_queue"]);

    let response = server
        .post(&format!("/api/v1/sessions/{}/feedback", id))
        .json(&json!({ "item_id": queue[1], "liked": true }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_session_runs_until_catalog_exhausted() {
    let server = create_test_server_with(12, None);
    let session = start(&server).await;
    let id = session["session_id"].as_str().unwrap().to_string();

    let mut shown = vec![session["current"]["id"].as_u64().unwrap()];
    let summary = loop {
        let current = *shown.last().unwrap();
        let response = server
            .post(&format!("/api/v1/sessions/{}/feedback", id))
            .json(&json!({
                "item_id": current,
                "liked": shown.len() % 3 != 0,
                "save_to_watchlist": current == 1,
            }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();

        match body["status"].as_str().unwrap() {
            "next" => shown.push(body["next"]["id"].as_u64().unwrap()),
            "ended" => break body["summary"].clone(),
            other => panic!("unexpected status {other}"),
        }
    };

    let distinct: HashSet<u64> = shown.iter().copied().collect();
    assert_eq!(shown.len(), 12);
    assert_eq!(distinct.len(), 12);
    assert_eq!(summary["catalog_exhausted"], true);
    assert!(summary["final_recommendations"].as_array().unwrap().is_empty());
    // Item 1 is always shown in a fully exhausted session and is the only one saved
    assert_eq!(item_ids(&summary["watchlist"]), vec![1]);
    assert_eq!(summary["watchlist"][0]["details"]["title"], "Alien");

    let status: Value = server.get(&format!("/api/v1/sessions/{}", id)).await.json();
    assert_eq!(status["phase"], "ended");
}

#[tokio::test]
async fn test_end_session_summary() {
    let server = create_test_server();
    let session = start(&server).await;
    let id = session["session_id"].as_str().unwrap();
    let queue = item_ids(&session["display_queue"]);

    let response = server
        .post(&format!("/api/v1/sessions/{}/feedback", id))
        .json(&json!({ "item_id": queue[0], "liked": true, "save_to_watchlist": true }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "next");
    assert_eq!(body["feedback_applied"], true);
    assert_eq!(body["next"]["id"].as_u64().unwrap(), queue[1]);

    let response = server.post(&format!("/api/v1/sessions/{}/end", id)).await;
    response.assert_status_ok();
    let summary: Value = response.json();
    assert_eq!(item_ids(&summary["watchlist"]), vec![queue[0]]);

    let recommendations = item_ids(&summary["final_recommendations"]);
    assert_eq!(recommendations.len(), 10);
    assert!(recommendations.iter().all(|id| !queue.contains(id)));
    assert_eq!(summary["catalog_exhausted"], false);

    // Ending again returns the same report
    let again: Value = server.post(&format!("/api/v1/sessions/{}/end", id)).await.json();
    assert_eq!(again, summary);

    // No more feedback once ended
    let response = server
        .post(&format!("/api/v1/sessions/{}/feedback", id))
        .json(&json!({ "item_id": queue[1], "liked": true }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_session_snapshot() {
    let server = create_test_server();
    let session = start(&server).await;
    let id = session["session_id"].as_str().unwrap();

    let response = server.get(&format!("/api/v1/sessions/{}", id)).await;
    response.assert_status_ok();
    let snapshot: Value = response.json();
    assert_eq!(snapshot["session_id"], id);
    assert_eq!(snapshot["shown_count"], 1);
    assert_eq!(snapshot["feedback_count"], 0);
    assert!(snapshot["watchlist"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_session() {
    let server = create_test_server();
    let missing = uuid::Uuid::new_v4();

    server
        .get(&format!("/api/v1/sessions/{}", missing))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post(&format!("/api/v1/sessions/{}/end", missing))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/sessions/not-a-uuid")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_discard_session() {
    let server = create_test_server();
    let session = start(&server).await;
    let id = session["session_id"].as_str().unwrap();

    server
        .delete(&format!("/api/v1/sessions/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/v1/sessions/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit() {
    let server = create_test_server_with(20, Some(1));
    start(&server).await;

    server
        .post("/api/v1/sessions")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ended_session_frees_its_slot() {
    let server = create_test_server_with(20, Some(1));
    let first = start(&server).await;
    let id = first["session_id"].as_str().unwrap();

    server
        .post(&format!("/api/v1/sessions/{}/end", id))
        .await
        .assert_status_ok();

    let second = start(&server).await;
    assert_ne!(second["session_id"], first["session_id"]);
}

#[tokio::test]
async fn test_invalid_input_returns_json_error() {
    let server = create_test_server();
    let session = start(&server).await;
    let id = session["session_id"].as_str().unwrap();

    let response = server.get("/api/v1/sessions/not-a-uuid").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some());

    // Missing the required `liked` field
    let response = server
        .post(&format!("/api/v1/sessions/{}/feedback", id))
        .json(&json!({ "item_id": 1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_movie_metadata() {
    let server = create_test_server();

    let response = server.get("/api/v1/movies/2").await;
    response.assert_status_ok();
    let movie: Value = response.json();
    assert_eq!(movie["title"], "Heat");
    assert_eq!(movie["year"], 1995);

    // In the catalog but without metadata
    server
        .get("/api/v1/movies/3")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    // Not in the catalog at all
    server
        .get("/api/v1/movies/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let request_id = uuid::Uuid::new_v4().to_string();

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_str(&request_id).unwrap(),
        )
        .await;
    assert_eq!(response.header("x-request-id"), request_id.as_str());
}
