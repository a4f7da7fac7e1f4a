//! Matchmaking and room reclamation settings.
//!
//! Round pacing is fixed by the client contract and deliberately absent here.

use super::defaults::{
    default_cleanup_interval_secs, default_stale_room_secs, default_waiting_timeout_secs,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MatchmakingConfig {
    /// Seconds a lone player waits before being asked to keep waiting or go solo
    #[serde(default = "default_waiting_timeout_secs")]
    pub waiting_timeout_secs: u64,
    /// Interval of the reclamation sweep (seconds)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// Age after which a room still waiting for an opponent is reclaimed (seconds)
    #[serde(default = "default_stale_room_secs")]
    pub stale_room_secs: u64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            waiting_timeout_secs: default_waiting_timeout_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            stale_room_secs: default_stale_room_secs(),
        }
    }
}

impl MatchmakingConfig {
    pub const fn waiting_timeout(&self) -> Duration {
        Duration::from_secs(self.waiting_timeout_secs)
    }

    pub const fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub const fn stale_room_after(&self) -> Duration {
        Duration::from_secs(self.stale_room_secs)
    }
}
