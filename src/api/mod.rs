//! HTTP delivery handlers
//!
//! Pull: `GET /` renders whatever the poller last wrote, as text or HTML
//! depending on the `Accept` header. Push: `GET /ws` upgrades to a
//! WebSocket and streams one rendered fragment per second while the player
//! is running. Neither endpoint ever triggers a fetch of its own.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::SinkExt;
use std::time::Duration;
use tokio::time::interval;
use tracing::debug;

use crate::render;
use crate::store::SharedStore;

/// Cadence of push-fragment sends.
const PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/ws", get(push_handler))
        .with_state(state)
}

/// First comma-separated token of the Accept header, if any.
fn accept_type(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::ACCEPT)?.to_str().ok()?;
    value.split(',').next().map(str::trim)
}

/// GET / - current snapshot, rendered per the request's Accept header.
///
/// An empty rendering (no snapshot, or player not running) is served as a
/// 200 with an empty body and the chosen content type.
pub async fn status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let snapshot = state.store.get().await;
    let snapshot = snapshot.as_deref();

    match accept_type(&headers) {
        Some("text/html") => (
            [(header::CONTENT_TYPE, "text/html")],
            render::render_html(snapshot),
        ),
        _ => (
            [(header::CONTENT_TYPE, "text/plain")],
            render::render_text(snapshot),
        ),
    }
}

/// GET /ws - push one rendered fragment per second.
pub async fn push_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| push_loop(socket, state))
}

async fn push_loop(mut socket: WebSocket, state: AppState) {
    debug!("push client connected");
    let mut ticker = interval(PUSH_INTERVAL);

    loop {
        ticker.tick().await;

        let snapshot = state.store.get().await;
        // Checked at every tick, not only at connect time.
        if !snapshot.as_ref().is_some_and(|s| s.running) {
            debug!("player gone, closing push channel");
            break;
        }

        let fragment = render::render_fragment(snapshot.as_deref());
        if socket.send(Message::Text(fragment.into())).await.is_err() {
            // Local to this consumer; the poller and other consumers carry on.
            debug!("push client disconnected");
            return;
        }
    }

    let _ = socket.close().await;
}
