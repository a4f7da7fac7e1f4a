use std::sync::Arc;

use super::{PlayerSession, SessionFlow, SunnySaysServer};
use crate::game::{run_round, RoomState};
use crate::protocol::{
    parse_client_message, ClientMessage, ServerMessage, Symbol, WaitChoice,
    ERROR_SINGLEPLAYER_MODE,
};

impl SunnySaysServer {
    /// Parse and route one text frame. Malformed frames are logged and
    /// dropped; they never close the connection.
    pub async fn handle_text_message(&self, session: &mut PlayerSession, text: &str) -> SessionFlow {
        match parse_client_message(text) {
            Ok(message) => self.handle_client_message(session, message).await,
            Err(err) => {
                tracing::warn!(player_id = %session.player_id(), error = %err, "Ignoring client message");
                SessionFlow::Continue
            }
        }
    }

    pub async fn handle_client_message(
        &self,
        session: &mut PlayerSession,
        message: ClientMessage,
    ) -> SessionFlow {
        match message {
            ClientMessage::PlayerInput { frame } => {
                self.handle_player_input(session, frame).await;
                SessionFlow::Continue
            }
            ClientMessage::WaitChoice {
                choice: WaitChoice::Wait,
            } => {
                session.player.notify(ServerMessage::waiting());
                session.arm_waiting_timer(self.config.waiting_timeout);
                SessionFlow::Continue
            }
            ClientMessage::WaitChoice {
                choice: WaitChoice::Singleplayer,
            } => {
                self.leave_room(session).await;
                session
                    .player
                    .notify(ServerMessage::error(ERROR_SINGLEPLAYER_MODE));
                tracing::info!(player_id = %session.player_id(), "Player chose singleplayer");
                SessionFlow::Close
            }
            ClientMessage::Ready => {
                self.handle_ready(session).await;
                SessionFlow::Continue
            }
            // Connecting already joined a room.
            ClientMessage::Join => SessionFlow::Continue,
        }
    }

    async fn handle_player_input(&self, session: &PlayerSession, frame: Symbol) {
        session.player.set_frame(frame).await;
        if let Some(opponent) = session.room.get_opponent(&session.player.id).await {
            if !opponent.is_game_over().await {
                opponent.notify(ServerMessage::OpponentFrame { frame });
            }
        }
    }

    async fn handle_ready(&self, session: &PlayerSession) {
        let room = &session.room;
        if room.state().await == RoomState::Ended {
            return;
        }
        session.player.set_ready(true).await;

        // try_begin_round re-checks atomically; this is only the fast path.
        if room.all_players_ready().await && !room.is_round_active().await {
            room.reset_ready().await;
            tokio::spawn(run_round(Arc::clone(room)));
        }
    }
}
