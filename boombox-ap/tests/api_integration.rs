//! Integration tests for the Boombox Audio Player API
//!
//! Tests the complete API surface including:
//! - Health checks
//! - Superseding play and enqueue by track/album/artist
//! - Playback control commands
//! - Catalog lookups
//! - The SSE push channel
//!
//! The router runs against an in-memory catalog and a recording engine that
//! confirms every play immediately.

mod helpers;

use axum::http::StatusCode;
use boombox_ap::api::{create_router, AppContext};
use boombox_ap::playback::{engine, session, Controller, Emitter};
use boombox_common::db::{self, Album, Artist, Track};
use boombox_common::events::{EventBus, PushMessage};
use helpers::{resolved, track, EngineCall, RecordingEngine, MEDIA_ROOT};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

struct TestServer {
    app: axum::Router,
    engine: RecordingEngine,
    bus: EventBus,
    session_task: JoinHandle<()>,
}

/// Catalog: one artist with two albums (2 + 1 tracks)
async fn seed_catalog(pool: &sqlx::SqlitePool) -> Vec<Track> {
    db::insert_artist(pool, &Artist { id: "ar1".into(), name: "Miles Davis".into() })
        .await
        .unwrap();
    for (id, title, count) in [("al1", "Kind of Blue", 2), ("al2", "Bitches Brew", 1)] {
        db::insert_album(
            pool,
            &Album {
                id: id.into(),
                artist_id: "ar1".into(),
                title: title.into(),
                date: None,
                track_count: count,
            },
        )
        .await
        .unwrap();
    }

    let mut tracks = vec![track("t2", "al1", 2), track("t1", "al1", 1), track("t3", "al2", 1)];
    for t in &mut tracks {
        t.artist_id = "ar1".to_string();
    }
    db::insert_tracks(pool, &tracks).await.unwrap();
    tracks
}

/// Test helper to create a test server
async fn setup_test_server() -> TestServer {
    let pool = db::init_memory_database().await.unwrap();
    seed_catalog(&pool).await;

    let bus = EventBus::new(32);
    let (event_tx, event_rx) = engine::event_channel();
    let engine = RecordingEngine::responsive(event_tx);
    let controller = Controller::new(
        MEDIA_ROOT,
        Box::new(engine.clone()),
        Box::new(Emitter::new(bus.clone())),
        Duration::from_secs(10),
    );
    let (session, session_task) = session::spawn(controller, event_rx);

    let ctx = AppContext {
        session,
        db_pool: pool,
        bus: bus.clone(),
        port: 8080,
    };

    TestServer {
        app: create_router(ctx),
        engine,
        bus,
        session_task,
    }
}

/// Helper function to make HTTP requests to the test server
async fn make_request(app: &axum::Router, method: &str, path: &str) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};
    use tower::ServiceExt;

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "DELETE" => Method::DELETE,
        _ => panic!("Unsupported method"),
    };

    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json_body = if !body.is_empty() {
        Some(serde_json::from_slice(&body).unwrap())
    } else {
        None
    };

    (status, json_body)
}

async fn next_playevent(rx: &mut broadcast::Receiver<PushMessage>) -> Value {
    let message = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for playevent")
        .unwrap();
    serde_json::to_value(message).unwrap()
}

fn assert_ack(status: StatusCode, body: Option<Value>) {
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.expect("Expected response body"), serde_json::json!({"error": false}));
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = setup_test_server().await;

    for path in ["/health", "/api/v1/health"] {
        let (status, body) = make_request(&server.app, "GET", path).await;
        assert_eq!(status, StatusCode::OK);
        let body = body.expect("Expected response body");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["module"], "boombox-ap");
        assert_eq!(body["port"], 8080);
        assert!(body["version"].is_string());
        assert!(body["git_hash"].is_string());
    }
}

#[tokio::test]
async fn test_stream_album_plays_in_track_order() {
    let server = setup_test_server().await;
    let mut rx = server.bus.subscribe();

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/album/al1").await;
    assert_ack(status, body);

    let event = next_playevent(&mut rx).await;
    assert_eq!(event["type"], "playevent");
    assert_eq!(event["playstate"]["playing"], true);
    assert_eq!(event["playstate"]["track"]["_id"], "t1");
    assert_eq!(event["playstate"]["next"]["_id"], "t2");
    assert_eq!(event["playstate"]["prev"], false);

    let played = server.engine.last_play().1;
    assert_eq!(played, resolved(&track("t1", "al1", 1)));
}

#[tokio::test]
async fn test_stream_artist_and_track() {
    let server = setup_test_server().await;
    let mut rx = server.bus.subscribe();

    let (status, body) = make_request(&server.app, "POST", "/api/v1/stream/artist/ar1").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["track"]["_id"], "t1");

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/track/t3").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["track"]["_id"], "t3");
    assert_eq!(event["playstate"]["next"], false);

    // The superseding play stopped the artist run first
    assert!(server.engine.calls().contains(&EngineCall::Stop));
}

#[tokio::test]
async fn test_lookup_misses_return_404() {
    let server = setup_test_server().await;

    for (path, msg) in [
        ("/api/v1/stream/track/nope", "Track not found."),
        ("/api/v1/stream/album/nope", "Album not found."),
        ("/api/v1/stream/artist/nope", "Artist not found."),
        ("/api/v1/queue/track/nope", "Track not found."),
        ("/api/v1/track/nope", "Track not found."),
    ] {
        let (status, body) = make_request(&server.app, "GET", path).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        let body = body.unwrap();
        assert_eq!(body["error"], true);
        assert_eq!(body["playing"], false);
        assert_eq!(body["msg"], msg);
    }
    assert!(server.engine.calls().is_empty());
}

#[tokio::test]
async fn test_playback_control_commands() {
    let server = setup_test_server().await;
    let mut rx = server.bus.subscribe();

    make_request(&server.app, "GET", "/api/v1/stream/album/al1").await;
    next_playevent(&mut rx).await;

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/next").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["track"]["_id"], "t2");
    assert_eq!(event["playstate"]["prev"]["_id"], "t1");

    let (status, body) = make_request(&server.app, "POST", "/api/v1/stream/pause").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["playing"], false);
    assert_eq!(event["playstate"]["track"]["_id"], "t2");

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/resume").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["playing"], true);

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/prev").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["track"]["_id"], "t1");

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/stop").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["playing"], false);

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/state").await;
    assert_eq!(status, StatusCode::OK);
    let state = body.unwrap();
    assert_eq!(state["playing"], false);
    assert_eq!(state["track"]["_id"], "t1");

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/play").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["playing"], true);
    assert_eq!(event["playstate"]["track"]["_id"], "t1");

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/clear").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(
        event["playstate"],
        serde_json::json!({"playing": false, "prev": false, "next": false, "track": false})
    );
}

#[tokio::test]
async fn test_queue_and_remove() {
    let server = setup_test_server().await;
    let mut rx = server.bus.subscribe();

    // Idle: enqueue starts playback
    let (status, body) = make_request(&server.app, "GET", "/api/v1/queue/track/t3").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["track"]["_id"], "t3");

    // Playing: enqueue only appends
    let (status, body) = make_request(&server.app, "POST", "/api/v1/queue/album/al1").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["track"]["_id"], "t3");
    assert_eq!(event["playstate"]["next"]["_id"], "t1");
    assert_eq!(server.engine.plays().len(), 1);

    let (status, body) = make_request(&server.app, "DELETE", "/api/v1/queue/t1").await;
    assert_ack(status, body);
    let event = next_playevent(&mut rx).await;
    assert_eq!(event["playstate"]["next"]["_id"], "t2");
}

#[tokio::test]
async fn test_catalog_lookups() {
    let server = setup_test_server().await;

    let (status, body) = make_request(&server.app, "GET", "/api/v1/album").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<String> = body
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Bitches Brew", "Kind of Blue"]);

    let (status, body) = make_request(&server.app, "GET", "/api/v1/artist/ar1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["name"], "Miles Davis");

    let (status, body) = make_request(&server.app, "GET", "/api/v1/track/t2").await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["albumid"], "al1");
    assert_eq!(body["number"], 2);

    let (status, body) = make_request(&server.app, "GET", "/api/v1/track").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap().as_array().unwrap().len(), 3);

    let (status, _) = make_request(&server.app, "GET", "/api/v1/artist/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_stream_is_sse() {
    use axum::body::Body;
    use http::Request;
    use tower::ServiceExt;

    let server = setup_test_server().await;
    let request = Request::builder()
        .uri("/api/v1/events")
        .body(Body::empty())
        .unwrap();

    let response = server.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
    assert_eq!(server.bus.subscriber_count(), 1);
}

#[tokio::test]
async fn test_session_gone_returns_503() {
    let server = setup_test_server().await;
    server.session_task.abort();
    let _ = server.session_task.await;

    let (status, body) = make_request(&server.app, "GET", "/api/v1/stream/pause").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.unwrap()["error"], true);
}
