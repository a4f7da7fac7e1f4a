use crate::server::SunnySaysServer;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use std::sync::Arc;

use super::connection::handle_socket;

/// Query string of the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// WebSocket handler for the game protocol.
///
/// The bearer credential is checked before the upgrade completes; a rejected
/// connection is still upgraded so the client receives an `unauthorized`
/// error frame rather than a bare HTTP status.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<ConnectQuery>,
    State(server): State<Arc<SunnySaysServer>>,
) -> Response {
    let auth = server.authenticate(query.token.as_deref()).await;
    ws.on_upgrade(move |socket| handle_socket(socket, server, auth))
}
