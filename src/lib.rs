//! Now Playing Bridge
//!
//! Republishes the Spotify desktop client's playback state so that other
//! tools and pages can show "now playing" information without implementing
//! the client's proprietary local-API handshake.
//!
//! This library provides:
//! - Two-step token handshake against the local webhelper API
//! - Long-poll status client and a 1 Hz background poller
//! - Concurrency-safe single-snapshot store
//! - Text / HTML / push-fragment renderings of the current snapshot
//! - HTTP pull endpoint and WebSocket push endpoint

pub mod api;
pub mod client;
pub mod config;
pub mod poller;
pub mod render;
pub mod session;
pub mod store;
