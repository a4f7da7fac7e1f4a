use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::protocol::{PlayerId, ServerMessage, Symbol};

/// Failure to hand a message to a player's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("outbound queue is full")]
    QueueFull,
    #[error("connection writer has gone away")]
    Disconnected,
}

#[derive(Debug, Default)]
struct PlayerState {
    frame: Symbol,
    score: u32,
    ready: bool,
    game_over: bool,
}

/// A connected participant seated in a room.
///
/// Mutable fields sit behind one lock. Outbound messages go through the
/// connection's queue, which a single writer task drains, so writes to one
/// socket never interleave.
#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: String,
    state: Mutex<PlayerState>,
    outbound: mpsc::Sender<Arc<ServerMessage>>,
}

impl Player {
    pub fn new(user_id: impl Into<String>, outbound: mpsc::Sender<Arc<ServerMessage>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            state: Mutex::new(PlayerState::default()),
            outbound,
        }
    }

    pub async fn frame(&self) -> Symbol {
        self.state.lock().await.frame
    }

    pub async fn set_frame(&self, frame: Symbol) {
        self.state.lock().await.frame = frame;
    }

    pub async fn score(&self) -> u32 {
        self.state.lock().await.score
    }

    /// Add one point and return the new total.
    pub async fn award_point(&self) -> u32 {
        let mut state = self.state.lock().await;
        state.score += 1;
        state.score
    }

    pub async fn is_ready(&self) -> bool {
        self.state.lock().await.ready
    }

    pub async fn set_ready(&self, ready: bool) {
        self.state.lock().await.ready = ready;
    }

    pub async fn is_game_over(&self) -> bool {
        self.state.lock().await.game_over
    }

    pub async fn mark_game_over(&self) {
        self.state.lock().await.game_over = true;
    }

    /// Queue a message for this player's connection.
    pub fn send(&self, message: ServerMessage) -> Result<(), SendError> {
        self.outbound
            .try_send(Arc::new(message))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => SendError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => SendError::Disconnected,
            })
    }

    /// Best-effort delivery; failures are logged and otherwise ignored.
    pub fn notify(&self, message: ServerMessage) {
        let kind = message.kind();
        if let Err(err) = self.send(message) {
            tracing::warn!(player_id = %self.id, message = kind, error = %err, "Dropped outbound message");
        }
    }
}
