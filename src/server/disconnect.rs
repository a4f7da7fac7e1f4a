use super::{PlayerSession, SunnySaysServer};
use crate::game::RoomState;
use crate::protocol::{ServerMessage, ERROR_OPPONENT_DISCONNECTED};

impl SunnySaysServer {
    /// Connection teardown.
    pub async fn handle_disconnect(&self, mut session: PlayerSession) {
        tracing::info!(room_id = %session.room_id(), player_id = %session.player_id(), "Player disconnected");
        self.leave_room(&mut session).await;
    }

    /// Take the player out of its room and tell whoever is left.
    ///
    /// Safe to call more than once. Notifications to the remaining player are
    /// best-effort and never affect that player's connection.
    pub(crate) async fn leave_room(&self, session: &mut PlayerSession) {
        session.cancel_waiting_timer();
        let room = &session.room;
        let player_id = session.player.id;

        // The opponent must be looked up while we are still seated.
        let state = room.state().await;
        let opponent = room.get_opponent(&player_id).await;

        let opponent_alive = match &opponent {
            Some(opponent) => !opponent.is_game_over().await,
            None => false,
        };

        if room.remove_player(&player_id).await.is_some() {
            match (state, opponent) {
                (RoomState::Playing, Some(opponent)) if opponent_alive => {
                    opponent.notify(ServerMessage::OpponentGameOver);
                    if room.is_round_active().await && room.player_count().await == 1 {
                        room.set_round_active(false).await;
                        room.reset_ready().await;
                        tracing::debug!(room_id = %room.id, "Cancelled round after disconnect");
                    }
                }
                (RoomState::Waiting, Some(opponent)) => {
                    opponent.notify(ServerMessage::error(ERROR_OPPONENT_DISCONNECTED));
                }
                _ => {}
            }
        }

        if room.player_count().await == 0 {
            self.registry.remove_room(&room.id).await;
        }
    }
}
