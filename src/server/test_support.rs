use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use super::{PlayerSession, ServerConfig, SunnySaysServer};
use crate::auth::{AuthError, CredentialVerifier};
use crate::game::ScriptedDice;
use crate::protocol::{ServerMessage, Symbol};

pub(super) type Inbox = mpsc::Receiver<Arc<ServerMessage>>;

/// Treats the token itself as the user id.
pub(super) struct AcceptAll;

#[async_trait]
impl CredentialVerifier for AcceptAll {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        Ok(token.to_string())
    }
}

pub(super) fn server_with(symbols: Vec<Symbol>) -> Arc<SunnySaysServer> {
    SunnySaysServer::with_dice(
        ServerConfig::default(),
        Arc::new(AcceptAll),
        Arc::new(ScriptedDice::new(symbols)),
    )
}

pub(super) fn test_server() -> Arc<SunnySaysServer> {
    server_with(vec![Symbol::Heart])
}

pub(super) async fn connect(server: &SunnySaysServer, user: &str) -> (PlayerSession, Inbox) {
    let (tx, rx) = mpsc::channel(64);
    let session = server
        .join(user.to_string(), tx)
        .await
        .expect("join should succeed");
    (session, rx)
}

pub(super) async fn recv(inbox: &mut Inbox) -> ServerMessage {
    let message = timeout(Duration::from_secs(30), inbox.recv())
        .await
        .expect("timed out waiting for message")
        .expect("channel closed");
    (*message).clone()
}

pub(super) fn drain(inbox: &mut Inbox) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        out.push((*message).clone());
    }
    out
}

/// Connect two players and discard their join/match-start messages.
pub(super) async fn matched_pair(
    server: &SunnySaysServer,
) -> ((PlayerSession, Inbox), (PlayerSession, Inbox)) {
    let mut a = connect(server, "alice").await;
    let mut b = connect(server, "bob").await;
    drain(&mut a.1);
    drain(&mut b.1);
    (a, b)
}
