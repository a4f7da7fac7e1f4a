//! In-memory match engine: player and room state, matchmaking, and the
//! round orchestrator.

pub mod dice;
pub mod player;
pub mod registry;
pub mod room;
pub mod round;
pub mod timing;

pub use dice::{RoundDice, ScriptedDice, ThreadRngDice};
pub use player::{Player, SendError};
pub use registry::RoomRegistry;
pub use room::{Admission, Room, RoomState};
pub use round::{run_game_loop, run_round};

#[cfg(test)]
mod round_tests;
