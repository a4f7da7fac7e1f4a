use crate::auth::{AuthError, CredentialVerifier};
use crate::game::{RoomRegistry, RoundDice, SendError, ThreadRngDice};
use crate::protocol::RoomId;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Duration;

mod disconnect;
mod maintenance;
mod message_router;
mod session;
#[cfg(test)]
mod test_support;

pub use session::{PlayerSession, SessionFlow};

/// Matchmaking front door: authenticates connections, seats them in rooms
/// and routes their messages into the game engine.
pub struct SunnySaysServer {
    config: ServerConfig,
    registry: Arc<RoomRegistry>,
    verifier: Arc<dyn CredentialVerifier>,
}

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("Room {room_id} is full")]
    RoomFull { room_id: RoomId },
    #[error("Failed to acknowledge join: {0}")]
    Ack(#[from] SendError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// One-shot timer before a lone player is asked to keep waiting or go solo
    pub waiting_timeout: Duration,
    pub room_cleanup_interval: Duration,
    /// Age after which a room still waiting for an opponent is reclaimed
    pub stale_room_after: Duration,
    pub max_message_size: usize,
    pub outbound_queue_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            waiting_timeout: Duration::from_secs(10),
            room_cleanup_interval: Duration::from_secs(30),
            stale_room_after: Duration::from_secs(300),
            max_message_size: 16 * 1024,
            outbound_queue_capacity: 64,
        }
    }
}

impl From<&crate::config::Config> for ServerConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            waiting_timeout: config.matchmaking.waiting_timeout(),
            room_cleanup_interval: config.matchmaking.cleanup_interval(),
            stale_room_after: config.matchmaking.stale_room_after(),
            max_message_size: config.security.max_message_size,
            outbound_queue_capacity: config.security.outbound_queue_capacity,
        }
    }
}

impl SunnySaysServer {
    pub fn new(config: ServerConfig, verifier: Arc<dyn CredentialVerifier>) -> Arc<Self> {
        Self::with_dice(config, verifier, Arc::new(ThreadRngDice))
    }

    /// Rooms created by this server draw their randomness from `dice`.
    pub fn with_dice(
        config: ServerConfig,
        verifier: Arc<dyn CredentialVerifier>,
        dice: Arc<dyn RoundDice>,
    ) -> Arc<Self> {
        let registry = Arc::new(RoomRegistry::with_dice(config.stale_room_after, dice));
        Arc::new(Self {
            config,
            registry,
            verifier,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Resolve the bearer credential from the upgrade request to a user id.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<String, AuthError> {
        match token {
            Some(token) if !token.trim().is_empty() => self.verifier.verify(token).await,
            _ => Err(AuthError::MissingToken),
        }
    }
}
