use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Duration;

use super::{JoinError, SunnySaysServer};
use crate::game::{run_game_loop, Admission, Player, Room, RoomState};
use crate::protocol::{PlayerId, RoomId, ServerMessage};

/// Whether the connection should keep reading after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Close,
}

/// One seated connection: its room, its player, and its waiting timer.
#[derive(Debug)]
pub struct PlayerSession {
    pub room: Arc<Room>,
    pub player: Arc<Player>,
    waiting_timer: WaitingTimer,
}

impl PlayerSession {
    fn new(room: Arc<Room>, player: Arc<Player>) -> Self {
        Self {
            room,
            player,
            waiting_timer: WaitingTimer::default(),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player.id
    }

    pub fn room_id(&self) -> RoomId {
        self.room.id
    }

    /// (Re)start the one-shot waiting timer, replacing any pending one.
    pub(crate) fn arm_waiting_timer(&mut self, after: Duration) {
        self.waiting_timer
            .arm(Arc::clone(&self.room), Arc::clone(&self.player), after);
    }

    pub(crate) fn cancel_waiting_timer(&mut self) {
        self.waiting_timer.cancel();
    }
}

/// Replaceable one-shot timer. The fire handler re-checks the room instead
/// of trusting that nothing happened in the meantime.
#[derive(Debug, Default)]
struct WaitingTimer(Option<AbortHandle>);

impl WaitingTimer {
    fn arm(&mut self, room: Arc<Room>, player: Arc<Player>, after: Duration) {
        self.cancel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if room.state().await == RoomState::Playing || !room.contains(&player.id).await {
                return;
            }
            tracing::debug!(room_id = %room.id, player_id = %player.id, "Waiting timeout");
            player.notify(ServerMessage::waiting_timeout());
        });
        self.0 = Some(handle.abort_handle());
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

impl Drop for WaitingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl SunnySaysServer {
    /// Seat a freshly authenticated connection.
    ///
    /// Sends `room_joined`, then either `game_start` to both players (and
    /// launches the match loop) or `waiting` with the waiting timer armed.
    pub async fn join(
        &self,
        user_id: String,
        outbound: mpsc::Sender<Arc<ServerMessage>>,
    ) -> Result<PlayerSession, JoinError> {
        let player = Arc::new(Player::new(user_id, outbound));
        let (room, admission) = self.registry.join_available_room(Arc::clone(&player)).await;

        if admission == Admission::Full {
            tracing::warn!(room_id = %room.id, player_id = %player.id, "Room full");
            player.notify(ServerMessage::RoomFull);
            return Err(JoinError::RoomFull { room_id: room.id });
        }

        let mut session = PlayerSession::new(room, player);
        if let Err(err) = session.player.send(ServerMessage::RoomJoined {
            room_id: session.room.id,
            player_id: session.player.id,
        }) {
            tracing::warn!(player_id = %session.player.id, error = %err, "Failed to acknowledge join");
            self.leave_room(&mut session).await;
            return Err(err.into());
        }

        tracing::info!(
            room_id = %session.room.id,
            player_id = %session.player.id,
            user_id = %session.player.user_id,
            "Player joined"
        );

        match admission {
            Admission::Completed => self.start_match(&session.room).await,
            _ => {
                session.player.notify(ServerMessage::waiting());
                session.arm_waiting_timer(self.config.waiting_timeout);
            }
        }

        Ok(session)
    }

    async fn start_match(&self, room: &Arc<Room>) {
        let players = room.players().await;
        for player in &players {
            if let Some(opponent) = players.iter().find(|p| p.id != player.id) {
                player.notify(ServerMessage::GameStart {
                    opponent_id: opponent.id,
                });
            }
        }

        if room.claim_game_loop() {
            tracing::info!(room_id = %room.id, "Match started");
            tokio::spawn(run_game_loop(Arc::clone(room), Arc::clone(&self.registry)));
        }
    }
}
