//! Credential and transport limits.

use super::defaults::{
    default_jwt_secret, default_max_message_size, default_outbound_queue_capacity,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// HS256 secret shared with the token issuer
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Largest accepted WebSocket frame in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Messages buffered per connection before sends start failing
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            max_message_size: default_max_message_size(),
            outbound_queue_capacity: default_outbound_queue_capacity(),
        }
    }
}

// The secret stays out of Debug output and therefore out of logs.
impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("max_message_size", &self.max_message_size)
            .field("outbound_queue_capacity", &self.outbound_queue_capacity)
            .finish()
    }
}
