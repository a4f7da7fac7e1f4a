use crate::auth::AuthError;
use crate::protocol::{ServerMessage, ERROR_UNAUTHORIZED};
use crate::server::{SessionFlow, SunnySaysServer};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::sending::{send_server_message, WsSender};

pub(super) async fn handle_socket(
    socket: WebSocket,
    server: Arc<SunnySaysServer>,
    auth: Result<String, AuthError>,
) {
    let (mut sender, mut receiver) = socket.split();

    let user_id = match auth {
        Ok(user_id) => user_id,
        Err(err) => {
            tracing::warn!(error = %err, "Rejecting unauthenticated connection");
            if let Err(err) =
                send_server_message(&mut sender, &ServerMessage::error(ERROR_UNAUTHORIZED)).await
            {
                tracing::debug!(error = %err, "Failed to send unauthorized frame");
            }
            let _ = sender.close().await;
            return;
        }
    };

    // Every writer (read loop, round orchestrator, waiting timer) goes through
    // this queue; only the writer task touches the socket sink.
    let (tx, rx) = mpsc::channel::<Arc<ServerMessage>>(server.config().outbound_queue_capacity.max(1));
    let shutdown = CancellationToken::new();
    let writer = tokio::spawn(write_loop(sender, rx, shutdown.clone()));

    let mut session = match server.join(user_id, tx).await {
        Ok(session) => session,
        Err(err) => {
            tracing::info!(error = %err, "Join failed, closing connection");
            shutdown.cancel();
            let _ = writer.await;
            return;
        }
    };
    let player_id = session.player_id();
    let max_size = server.config().max_message_size;

    while let Some(frame) = receiver.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(%player_id, error = %err, "WebSocket read failed");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let size = text.as_str().len();
                if size > max_size {
                    tracing::warn!(%player_id, size, max_size, "Dropping oversized message");
                    continue;
                }
                if server.handle_text_message(&mut session, text.as_str()).await
                    == SessionFlow::Close
                {
                    break;
                }
            }
            Message::Binary(_) => {
                tracing::debug!(%player_id, "Ignoring binary frame");
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    server.handle_disconnect(session).await;
    shutdown.cancel();
    let _ = writer.await;
}

/// Drain the outbound queue onto the socket. On shutdown, flush whatever is
/// already queued, then close.
async fn write_loop(
    mut sender: WsSender,
    mut rx: mpsc::Receiver<Arc<ServerMessage>>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            message = rx.recv() => {
                let Some(message) = message else { break };
                if let Err(err) = send_server_message(&mut sender, &message).await {
                    tracing::debug!(error = %err, "Write failed, connection closed");
                    return;
                }
            }
            () = shutdown.cancelled() => {
                while let Ok(message) = rx.try_recv() {
                    if send_server_message(&mut sender, &message).await.is_err() {
                        return;
                    }
                }
                break;
            }
        }
    }

    let _ = sender.close().await;
}
