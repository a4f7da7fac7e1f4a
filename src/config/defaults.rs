//! Default value functions for configuration fields.
//!
//! Used by serde's `#[serde(default = ...)]` attributes and the `Default`
//! impls of each section.

use super::logging::LogFormat;

/// Shared secret accepted only outside production.
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub const fn default_port() -> u16 {
    8080
}

pub fn default_cors_origins() -> String {
    "*".to_string()
}

// =============================================================================
// Matchmaking Defaults
// =============================================================================

pub const fn default_waiting_timeout_secs() -> u64 {
    10
}

pub const fn default_cleanup_interval_secs() -> u64 {
    30
}

pub const fn default_stale_room_secs() -> u64 {
    300 // 5 minutes
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

pub const fn default_max_message_size() -> usize {
    16 * 1024
}

pub const fn default_outbound_queue_capacity() -> usize {
    64
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "sunny-says.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
