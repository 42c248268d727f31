//! Mock servers for integration testing
//!
//! Simulates the Spotify webhelper local API and the public token endpoint,
//! allowing full handshake/poll/delivery testing without a running client.

pub mod player;

pub use player::MockPlayerServer;
