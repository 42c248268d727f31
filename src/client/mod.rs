//! Spotify local API client
//!
//! Issues authenticated GETs against the webhelper using a
//! [`SessionDescriptor`]. The status endpoint is a long-poll: the webhelper
//! holds the request open for up to `returnafter` seconds, returning early
//! when one of the `returnon` events fires, and returns the full status
//! snapshot either way. Polling it on a 1 s cadence therefore yields
//! near-real-time updates at a steady ~1 request/s.
//!
//! The upstream schema is treated as append-only: unknown fields are
//! ignored and missing fields decode to their zero values.

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::session::{insecure_local_client, SessionDescriptor};

const STATUS_PATH: &str = "/remote/status.json";
const PLAY_PATH: &str = "/remote/play.json";
const PAUSE_PATH: &str = "/remote/pause.json";
const VERSION_PATH: &str = "/service/version.json";

/// Long-poll horizon in seconds.
const RETURN_AFTER: &str = "1";
/// Events that make the long-poll return early.
const RETURN_ON: &str = "login,logout,play,pause,error,ap";

/// Steady-state call failure. Recoverable: the poller logs it and keeps the
/// previous snapshot; only a process restart re-runs the handshake.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Request {
        path: &'static str,
        source: reqwest::Error,
    },

    #[error("undecodable response from {path}: {source}")]
    Decode {
        path: &'static str,
        source: serde_json::Error,
    },
}

/// One immutable, complete capture of playback state, mirroring the
/// upstream `/remote/status.json` shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub client_version: String,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub playing: bool,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub play_enabled: bool,
    #[serde(default)]
    pub prev_enabled: bool,
    #[serde(default)]
    pub next_enabled: bool,
    /// Seconds into the current track, fractional.
    #[serde(default)]
    pub playing_position: f64,
    #[serde(default)]
    pub server_time: i64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub online: bool,
    /// No defined schema in any observed response; preserved, never interpreted.
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub open_graph_state: OpenGraphState,
    #[serde(default)]
    pub track: Track,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenGraphState {
    #[serde(default)]
    pub private_session: bool,
    #[serde(default)]
    pub posting_disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Track length in whole seconds.
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub track_type: String,
    #[serde(default)]
    pub track_resource: Resource,
    #[serde(default)]
    pub artist_resource: Resource,
    #[serde(default)]
    pub album_resource: Resource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub location: Location,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    /// Canonical (Open Graph) URL of the resource.
    #[serde(default)]
    pub og: String,
}

/// Result of the version probe; independent of the polling loop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub client_version: String,
}

/// Authenticated client for the local API.
pub struct WebClient {
    http: Client,
    session: SessionDescriptor,
}

impl WebClient {
    /// Wrap a session descriptor, calling through the insecure local transport.
    pub fn new(session: SessionDescriptor) -> Result<Self, TransportError> {
        Ok(Self {
            http: insecure_local_client()?,
            session,
        })
    }

    pub fn session(&self) -> &SessionDescriptor {
        &self.session
    }

    /// Current playback state via the long-poll status endpoint.
    pub async fn status(&self) -> Result<StatusSnapshot, TransportError> {
        self.call(
            STATUS_PATH,
            &[("returnafter", RETURN_AFTER), ("returnon", RETURN_ON)],
        )
        .await
    }

    /// Start playing a spotify-style URI.
    pub async fn play(&self, uri: &str) -> Result<StatusSnapshot, TransportError> {
        self.call(PLAY_PATH, &[("uri", uri), ("context", uri)]).await
    }

    pub async fn pause(&self) -> Result<StatusSnapshot, TransportError> {
        self.call(PAUSE_PATH, &[("pause", "true")]).await
    }

    pub async fn resume(&self) -> Result<StatusSnapshot, TransportError> {
        self.call(PAUSE_PATH, &[("pause", "false")]).await
    }

    pub async fn version(&self) -> Result<VersionInfo, TransportError> {
        self.call(VERSION_PATH, &[("service", "remote")]).await
    }

    /// Issue one authenticated GET. Call-specific parameters are appended
    /// after the session baseline; both sets are sent and the webhelper
    /// honors the call-specific ones.
    async fn call<T: DeserializeOwned>(
        &self,
        path: &'static str,
        extra_params: &[(&str, &str)],
    ) -> Result<T, TransportError> {
        let url = format!("{}{}", self.session.base_url(), path);
        let body = self
            .http
            .get(&url)
            .query(self.session.params())
            .query(extra_params)
            .header(header::ORIGIN, self.session.origin())
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| TransportError::Request { path, source })?
            .text()
            .await
            .map_err(|source| TransportError::Request { path, source })?;

        serde_json::from_str(&body).map_err(|source| TransportError::Decode { path, source })
    }
}
