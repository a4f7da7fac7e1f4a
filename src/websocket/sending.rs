use crate::protocol::ServerMessage;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;

pub(super) type WsSender = SplitSink<WebSocket, Message>;

/// Serialize and write one message as a JSON text frame.
pub(super) async fn send_server_message(
    sender: &mut WsSender,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, message = message.kind(), "Failed to serialize server message");
            return Ok(());
        }
    };

    sender.send(Message::Text(payload.into())).await
}
