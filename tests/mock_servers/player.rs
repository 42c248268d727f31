#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Mock Spotify webhelper for testing
//!
//! One axum server plays both roles: the public token endpoint (`/token`)
//! and the local API (`/simplecsrf/token.json`, `/remote/*.json`,
//! `/service/version.json`), served over plain HTTP on a random port.
//! Requests are recorded so tests can assert on parameters and headers.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use nowplaying_bridge::client::{Location, Resource, StatusSnapshot, Track};

/// Mock webhelper state
pub struct MockPlayerState {
    pub oauth_token: String,
    pub csrf_token: String,
    pub snapshot: StatusSnapshot,
    /// When set, `/remote/status.json` answers 500.
    pub status_failing: bool,
    /// When set, `/token` answers with an empty token value.
    pub empty_oauth: bool,
    /// Query parameters of the most recent call, per path.
    pub status_params: Vec<(String, String)>,
    pub play_params: Vec<(String, String)>,
    pub pause_params: Vec<(String, String)>,
    /// Origin header seen on the most recent CSRF fetch.
    pub csrf_origin: Option<String>,
}

impl Default for MockPlayerState {
    fn default() -> Self {
        Self {
            oauth_token: "oauth-token-value".to_string(),
            csrf_token: "csrf-token-value".to_string(),
            snapshot: StatusSnapshot::default(),
            status_failing: false,
            empty_oauth: false,
            status_params: Vec::new(),
            play_params: Vec::new(),
            pause_params: Vec::new(),
            csrf_origin: None,
        }
    }
}

type SharedMock = Arc<RwLock<MockPlayerState>>;

/// Mock webhelper server
pub struct MockPlayerServer {
    addr: SocketAddr,
    state: SharedMock,
    handle: JoinHandle<()>,
}

impl MockPlayerServer {
    /// Start a mock webhelper on a random port
    pub async fn start() -> Self {
        let state: SharedMock = Arc::new(RwLock::new(MockPlayerState::default()));

        let app = Router::new()
            .route("/token", get(handle_oauth_token))
            .route("/simplecsrf/token.json", get(handle_csrf_token))
            .route("/remote/status.json", get(handle_status))
            .route("/remote/play.json", get(handle_play))
            .route("/remote/pause.json", get(handle_pause))
            .route("/service/version.json", get(handle_version))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the mock local API
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of the mock public token endpoint
    pub fn oauth_url(&self) -> String {
        format!("{}/token", self.base_url())
    }

    /// Replace the snapshot served by `/remote/status.json`
    pub async fn set_snapshot(&self, snapshot: StatusSnapshot) {
        self.state.write().await.snapshot = snapshot;
    }

    /// Make `/remote/status.json` fail (or recover)
    pub async fn set_status_failing(&self, failing: bool) {
        self.state.write().await.status_failing = failing;
    }

    /// Make `/token` answer with an empty token value
    pub async fn set_empty_oauth(&self, empty: bool) {
        self.state.write().await.empty_oauth = empty;
    }

    pub async fn status_params(&self) -> Vec<(String, String)> {
        self.state.read().await.status_params.clone()
    }

    pub async fn play_params(&self) -> Vec<(String, String)> {
        self.state.read().await.play_params.clone()
    }

    pub async fn pause_params(&self) -> Vec<(String, String)> {
        self.state.read().await.pause_params.clone()
    }

    pub async fn csrf_origin(&self) -> Option<String> {
        self.state.read().await.csrf_origin.clone()
    }

    /// Stop the mock server
    pub async fn stop(self) {
        self.handle.abort();
    }
}

/// A playing snapshot with the given track fields
pub fn playing_snapshot(
    artist: &str,
    track: &str,
    album: &str,
    url: &str,
    length: u32,
    position: f64,
) -> StatusSnapshot {
    StatusSnapshot {
        running: true,
        playing: true,
        playing_position: position,
        track: Track {
            length,
            track_resource: Resource {
                name: track.to_string(),
                location: Location {
                    og: url.to_string(),
                },
                ..Resource::default()
            },
            artist_resource: Resource {
                name: artist.to_string(),
                ..Resource::default()
            },
            album_resource: Resource {
                name: album.to_string(),
                ..Resource::default()
            },
            ..Track::default()
        },
        ..StatusSnapshot::default()
    }
}

async fn handle_oauth_token(State(state): State<SharedMock>) -> Json<serde_json::Value> {
    let state = state.read().await;
    let token = if state.empty_oauth {
        ""
    } else {
        state.oauth_token.as_str()
    };
    Json(json!({ "t": token }))
}

async fn handle_csrf_token(
    State(state): State<SharedMock>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let mut state = state.write().await;
    state.csrf_origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({ "token": state.csrf_token }))
}

async fn handle_status(
    State(state): State<SharedMock>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let mut state = state.write().await;
    state.status_params = params;
    if state.status_failing {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(state.snapshot.clone()).into_response()
}

async fn handle_play(
    State(state): State<SharedMock>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<StatusSnapshot> {
    let mut state = state.write().await;
    state.play_params = params;
    state.snapshot.playing = true;
    Json(state.snapshot.clone())
}

async fn handle_pause(
    State(state): State<SharedMock>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<StatusSnapshot> {
    let mut state = state.write().await;
    let paused = params
        .iter()
        .any(|(key, value)| key == "pause" && value == "true");
    state.pause_params = params;
    state.snapshot.playing = !paused;
    Json(state.snapshot.clone())
}

async fn handle_version() -> Json<serde_json::Value> {
    Json(json!({ "version": 9, "client_version": "1.0.42.297" }))
}
