use serde::{Deserialize, Serialize};

use super::types::{PlayerId, RoomId, Symbol, WaitChoice};

/// `error.message` sent when the bearer credential is missing or rejected.
pub const ERROR_UNAUTHORIZED: &str = "unauthorized";
/// `error.message` telling the client to fall back to solo play.
pub const ERROR_SINGLEPLAYER_MODE: &str = "singleplayer_mode";
/// `error.message` sent to a waiting player whose partner left before the match began.
pub const ERROR_OPPONENT_DISCONNECTED: &str = "opponent_disconnected";
/// `waiting.message` attached to the re-prompt fired by the waiting timer.
pub const WAITING_TIMEOUT: &str = "timeout";

/// Message types sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Accepted for compatibility; opening the connection already joins a room
    #[serde(alias = "join_room")]
    Join,
    /// The symbol the player is currently holding up
    PlayerInput {
        #[serde(default)]
        frame: Symbol,
    },
    /// Answer to the waiting-timeout prompt
    WaitChoice { choice: WaitChoice },
    /// Player is ready for the next round
    Ready,
}

/// Message types sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection was seated in a room
    RoomJoined {
        room_id: RoomId,
        player_id: PlayerId,
    },
    /// The selected room had no free seat
    RoomFull,
    /// Still looking for an opponent
    Waiting {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Room is full; carries the other player's id
    GameStart { opponent_id: PlayerId },
    /// A new round began
    RoundStart { round: u32 },
    /// Sunny is showing `frame`. `display_duration_ms == 0` marks the final,
    /// non-expiring symbol of the round.
    SunnyFrame {
        frame: Symbol,
        display_duration_ms: u64,
    },
    /// The opponent's current input
    OpponentFrame { frame: Symbol },
    /// Matched the target; carries the new score
    RoundResult { score: u32, frame: Symbol },
    /// This player is out (or the match is over)
    GameOver { score: u32 },
    /// The opponent is out or left
    OpponentGameOver,
    /// Error or control sentinel
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn waiting() -> Self {
        Self::Waiting { message: None }
    }

    pub fn waiting_timeout() -> Self {
        Self::Waiting {
            message: Some(WAITING_TIMEOUT.to_string()),
        }
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomJoined { .. } => "room_joined",
            Self::RoomFull => "room_full",
            Self::Waiting { .. } => "waiting",
            Self::GameStart { .. } => "game_start",
            Self::RoundStart { .. } => "round_start",
            Self::SunnyFrame { .. } => "sunny_frame",
            Self::OpponentFrame { .. } => "opponent_frame",
            Self::RoundResult { .. } => "round_result",
            Self::GameOver { .. } => "game_over",
            Self::OpponentGameOver => "opponent_game_over",
            Self::Error { .. } => "error",
        }
    }
}
