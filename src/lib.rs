#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

//! # Sunny Says Server
//!
//! Real-time matchmaking and the synchronized two-player "Sunny Says"
//! minigame over WebSocket.
//!
//! Everything is held in memory for the lifetime of a match: no database, no
//! persistence. Connections authenticate with a bearer token, are paired into
//! two-seat rooms, and play rounds of "match the symbol Sunny shows" until
//! both players are out.

/// Bearer credential verification
pub mod auth;

/// Server configuration and environment variables
pub mod config;

/// Rooms, players, matchmaking and round orchestration
pub mod game;

/// Structured logging configuration
pub mod logging;

/// WebSocket message protocol definitions
pub mod protocol;

/// Session handling: join, message routing, disconnects, cleanup
pub mod server;

/// WebSocket connection handling
pub mod websocket;
