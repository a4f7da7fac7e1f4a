//! Configuration module for Sunny Says.
//!
//! Layered JSON configuration with environment overrides:
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`server`]: Listener address and CORS
//! - [`matchmaking`]: Waiting timer and room reclamation
//! - [`security`]: JWT secret and transport limits
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod matchmaking;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;

pub use defaults::DEV_JWT_SECRET;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use matchmaking::MatchmakingConfig;

pub use security::SecurityConfig;

pub use server::ServerConfig;

pub use types::Config;

pub use validation::{is_production_mode, validate_config};
